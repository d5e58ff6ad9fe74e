use std::path::Path;
use std::sync::Arc;

use super::errors::ImportError;
use super::store::CatalogStore;
use super::{excel_reader, normalizer};

/// Executor для UseCase импорта каталога из Excel
pub struct ImportExecutor {
    store: Arc<dyn CatalogStore>,
}

impl ImportExecutor {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    /// Читает книгу, нормализует строки и полностью заменяет каталог.
    ///
    /// Хранилище не трогается, если файл не найден, число не разобралось или
    /// не осталось ни одной строки с кодом (тогда возвращается 0).
    /// Если удаление прошло, а вставка нет - `PartialReplacement`, каталог пуст.
    pub async fn run(&self, source: &Path, quiet: bool) -> Result<usize, ImportError> {
        let path = source.to_path_buf();
        let rows = tokio::task::spawn_blocking(move || excel_reader::read_rows(&path)).await??;

        let records = normalizer::normalize_all(&rows)?;

        if records.is_empty() {
            if !quiet {
                tracing::warn!(
                    "No valid rows found in {} ({} rows read), catalog left unchanged",
                    source.display(),
                    rows.len()
                );
            }
            return Ok(0);
        }

        if !quiet {
            tracing::info!(
                "Importing {} products from {}...",
                records.len(),
                source.display()
            );
        }

        let deleted = self.store.delete_all().await.map_err(ImportError::Store)?;
        let inserted = self
            .store
            .bulk_insert(&records)
            .await
            .map_err(|source| ImportError::PartialReplacement { deleted, source })?;

        if !quiet {
            tracing::info!(
                "Catalog replaced: {} products imported, {} removed",
                inserted,
                deleted
            );
        }

        Ok(inserted)
    }
}
