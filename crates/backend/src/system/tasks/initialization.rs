use sea_orm::DatabaseConnection;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::usecases::u501_import_productos::{ImportExecutor, SeaOrmCatalogStore};

use super::{
    coalescer::TriggerCoalescer, manager::TaskManager, managers::U501ImportProductosManager,
    watcher::FileWatchWorker, worker::ScheduledTaskWorker,
};

/// Собирает менеджер импорта каталога поверх SQLite-хранилища.
pub fn build_import_manager(
    db: DatabaseConnection,
    source: PathBuf,
    quiet: bool,
) -> Arc<dyn TaskManager> {
    let store = Arc::new(SeaOrmCatalogStore::new(db));
    let executor = Arc::new(ImportExecutor::new(store));
    Arc::new(U501ImportProductosManager::new(executor, source, quiet))
}

/// Воркер по расписанию: без debounce, логирует каждый импорт.
pub fn initialize_scheduled_refresh(
    db: DatabaseConnection,
    source: PathBuf,
    expression: &str,
) -> anyhow::Result<(ScheduledTaskWorker, TriggerCoalescer)> {
    let coalescer = TriggerCoalescer::new(build_import_manager(db, source, false));
    let worker = ScheduledTaskWorker::new(coalescer.clone(), expression)?;
    Ok((worker, coalescer))
}

/// Watcher файла: импорт в тихом режиме, итог пишет TriggerCoalescer.
pub fn initialize_file_watch(
    db: DatabaseConnection,
    source: PathBuf,
    debounce: Duration,
) -> (FileWatchWorker, TriggerCoalescer) {
    let manager = build_import_manager(db, source.clone(), true);
    let coalescer = TriggerCoalescer::with_debounce(manager, debounce);
    let worker = FileWatchWorker::new(coalescer.clone(), source);
    (worker, coalescer)
}
