use async_trait::async_trait;
use contracts::usecases::u501_import_productos::TriggerReason;
use std::path::PathBuf;
use std::sync::Arc;

use crate::system::tasks::manager::TaskManager;
use crate::usecases::u501_import_productos::{ImportError, ImportExecutor};

/// Менеджер для задачи импорта каталога из Excel (u501)
pub struct U501ImportProductosManager {
    executor: Arc<ImportExecutor>,
    source: PathBuf,
    quiet: bool,
}

impl U501ImportProductosManager {
    pub fn new(executor: Arc<ImportExecutor>, source: PathBuf, quiet: bool) -> Self {
        Self {
            executor,
            source,
            quiet,
        }
    }
}

#[async_trait]
impl TaskManager for U501ImportProductosManager {
    fn task_type(&self) -> &'static str {
        "u501_import_productos"
    }

    async fn run(&self, session_id: &str, reason: TriggerReason) -> Result<usize, ImportError> {
        tracing::debug!(
            "Session {}: importing {} ({})",
            session_id,
            self.source.display(),
            reason
        );
        self.executor.run(&self.source, self.quiet).await
    }
}
