use chrono::{DateTime, Utc};
use contracts::domain::a001_productos_vender::{ProductoVender, StoredProducto};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::NotSet, EntityTrait, PaginatorTrait, QueryOrder, Set, TransactionTrait};
use serde::{Deserialize, Serialize};

/// SQLite ограничивает число параметров в одном запросе; 13 колонок * 64 строки
/// укладываются в лимит даже у старых сборок.
const INSERT_CHUNK: usize = 64;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "productos_vender")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item_number: i32,
    pub codigo: String,
    pub municipio: String,
    pub categoria: String,
    pub producto: String,
    pub presentacion: String,
    pub costo_pcc: f64,
    pub porcentaje_logistica: f64,
    pub porcentaje_transporte: f64,
    pub precio_sugerido: f64,
    pub precio_venta: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|d| d.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl From<Model> for StoredProducto {
    fn from(m: Model) -> Self {
        StoredProducto {
            id: m.id,
            created_at: parse_timestamp(&m.created_at),
            updated_at: parse_timestamp(&m.updated_at),
            producto: ProductoVender {
                item_number: m.item_number,
                codigo: m.codigo,
                municipio: m.municipio,
                categoria: m.categoria,
                producto: m.producto,
                presentacion: m.presentacion,
                costo_pcc: m.costo_pcc,
                porcentaje_logistica: m.porcentaje_logistica,
                porcentaje_transporte: m.porcentaje_transporte,
                precio_sugerido: m.precio_sugerido,
                precio_venta: m.precio_venta,
            },
        }
    }
}

fn to_active(p: &ProductoVender, now: &str) -> ActiveModel {
    ActiveModel {
        id: NotSet,
        item_number: Set(p.item_number),
        codigo: Set(p.codigo.clone()),
        municipio: Set(p.municipio.clone()),
        categoria: Set(p.categoria.clone()),
        producto: Set(p.producto.clone()),
        presentacion: Set(p.presentacion.clone()),
        costo_pcc: Set(p.costo_pcc),
        porcentaje_logistica: Set(p.porcentaje_logistica),
        porcentaje_transporte: Set(p.porcentaje_transporte),
        precio_sugerido: Set(p.precio_sugerido),
        precio_venta: Set(p.precio_venta),
        created_at: Set(now.to_string()),
        updated_at: Set(now.to_string()),
    }
}

/// Удаляет все записи каталога, возвращает число удалённых строк
pub async fn delete_all(db: &DatabaseConnection) -> Result<u64, DbErr> {
    let result = Entity::delete_many().exec(db).await?;
    Ok(result.rows_affected)
}

/// Вставляет записи пачками в одной транзакции: либо все, либо ни одной.
/// id назначает база.
pub async fn insert_all(db: &DatabaseConnection, items: &[ProductoVender]) -> Result<usize, DbErr> {
    let now = Utc::now().to_rfc3339();
    let txn = db.begin().await?;
    for chunk in items.chunks(INSERT_CHUNK) {
        let models = chunk.iter().map(|p| to_active(p, &now));
        Entity::insert_many(models).exec(&txn).await?;
    }
    txn.commit().await?;
    Ok(items.len())
}

pub async fn list_all(db: &DatabaseConnection) -> Result<Vec<StoredProducto>, DbErr> {
    let items = Entity::find()
        .order_by_asc(Column::ItemNumber)
        .order_by_asc(Column::Codigo)
        .all(db)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(items)
}

pub async fn count(db: &DatabaseConnection) -> Result<u64, DbErr> {
    Entity::find().count(db).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_converts_to_stored_row() {
        let m = Model {
            id: 4,
            item_number: 2,
            codigo: "A1".into(),
            municipio: "Tunja".into(),
            categoria: String::new(),
            producto: "Papa".into(),
            presentacion: "Bulto".into(),
            costo_pcc: 1.5,
            porcentaje_logistica: 0.1,
            porcentaje_transporte: 0.2,
            precio_sugerido: 6000.0,
            precio_venta: 5000.0,
            created_at: "2024-05-01T10:00:00+00:00".into(),
            updated_at: "not a date".into(),
        };

        let stored: StoredProducto = m.into();
        assert_eq!(stored.id, 4);
        assert_eq!(stored.producto.codigo, "A1");
        assert_eq!(stored.producto.precio_venta, 5000.0);
        assert_eq!(stored.created_at.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }
}
