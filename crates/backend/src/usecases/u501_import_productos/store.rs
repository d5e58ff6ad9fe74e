use async_trait::async_trait;
use contracts::domain::a001_productos_vender::{ProductoVender, StoredProducto};
use sea_orm::{DatabaseConnection, DbErr};

use crate::domain::a001_productos_vender::repository;

/// Хранилище каталога, которое полностью перезаписывается импортом.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Удаляет все записи, возвращает их количество
    async fn delete_all(&self) -> Result<u64, DbErr>;

    /// Вставляет записи, возвращает количество вставленных
    async fn bulk_insert(&self, records: &[ProductoVender]) -> Result<usize, DbErr>;

    async fn list_all(&self) -> Result<Vec<StoredProducto>, DbErr>;
}

/// Хранилище на SQLite (таблица productos_vender)
#[derive(Clone)]
pub struct SeaOrmCatalogStore {
    db: DatabaseConnection,
}

impl SeaOrmCatalogStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CatalogStore for SeaOrmCatalogStore {
    async fn delete_all(&self) -> Result<u64, DbErr> {
        repository::delete_all(&self.db).await
    }

    async fn bulk_insert(&self, records: &[ProductoVender]) -> Result<usize, DbErr> {
        repository::insert_all(&self.db, records).await
    }

    async fn list_all(&self) -> Result<Vec<StoredProducto>, DbErr> {
        repository::list_all(&self.db).await
    }
}
