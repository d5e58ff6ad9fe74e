use anyhow::{Context, Result};
use contracts::usecases::u501_import_productos::TriggerReason;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::coalescer::TriggerCoalescer;

/// Следит за Excel-файлом каталога и запускает импорт при его изменении.
/// Окно debounce задаётся в самом TriggerCoalescer.
pub struct FileWatchWorker {
    coalescer: TriggerCoalescer,
    file: PathBuf,
}

impl FileWatchWorker {
    pub fn new(coalescer: TriggerCoalescer, file: PathBuf) -> Self {
        Self { coalescer, file }
    }

    /// Работает, пока future не будет отброшен; при этом освобождается watcher.
    pub async fn run_loop(&self) -> Result<()> {
        let (tx, mut rx) = mpsc::unbounded_channel::<TriggerReason>();
        let _watcher = self.start_watcher(tx)?;

        info!("Watching for changes in {}", self.file.display());
        if !self.file.exists() {
            warn!("{} does not exist yet, waiting for it to appear", self.file.display());
        }
        self.coalescer.trigger(TriggerReason::Startup);

        while let Some(reason) = rx.recv().await {
            self.coalescer.trigger(reason);
        }
        Ok(())
    }

    /// Подписка на директорию файла: файл может отсутствовать или заменяться переименованием.
    fn start_watcher(&self, tx: mpsc::UnboundedSender<TriggerReason>) -> Result<RecommendedWatcher> {
        let dir = self
            .file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let file = self.file.clone();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Some(reason) = classify(&event, &file) {
                    let _ = tx.send(reason);
                }
            }
            Err(e) => warn!("File watcher error: {}", e),
        })
        .context("Failed to create file watcher")?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch directory {}", dir.display()))?;

        Ok(watcher)
    }
}

/// Событие относится к файлу каталога и означает его появление или изменение
fn classify(event: &Event, file: &Path) -> Option<TriggerReason> {
    let target = file.file_name()?;
    if !event.paths.iter().any(|p| p.file_name() == Some(target)) {
        return None;
    }
    match event.kind {
        EventKind::Create(_) => Some(TriggerReason::FileAdded),
        EventKind::Modify(_) => Some(TriggerReason::FileChanged),
        _ => None,
    }
}
