use sea_orm::DbErr;
use std::path::PathBuf;
use thiserror::Error;

/// Ошибки импорта каталога.
/// Пустой набор строк ошибкой не является: run() возвращает Ok(0).
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Catalog file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Failed to read workbook: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("Workbook reader task failed: {0}")]
    ReaderTask(#[from] tokio::task::JoinError),

    #[error("Cannot convert \"{value}\" to a number (column \"{column}\", row {row})")]
    MalformedNumber {
        column: &'static str,
        /// Номер строки в листе, начиная с 1 (без заголовка)
        row: usize,
        value: String,
    },

    #[error("Catalog store error: {0}")]
    Store(#[source] DbErr),

    /// Удаление прошло, вставка упала: каталог остался пустым
    #[error("Catalog cleared ({deleted} rows) but insert failed: {source}")]
    PartialReplacement {
        deleted: u64,
        #[source]
        source: DbErr,
    },
}

impl ImportError {
    /// Каталог в хранилище мог измениться
    pub fn store_mutated(&self) -> bool {
        matches!(self, ImportError::PartialReplacement { .. })
    }
}
