use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Причина запуска обновления каталога
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerReason {
    /// Первый запуск при старте процесса / готовности watcher'а
    Startup,
    /// Срабатывание расписания
    Cron,
    /// Файл изменён
    FileChanged,
    /// Файл появился
    FileAdded,
}

impl TriggerReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerReason::Startup => "startup",
            TriggerReason::Cron => "cron",
            TriggerReason::FileChanged => "file changed",
            TriggerReason::FileAdded => "file added",
        }
    }
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Состояние конвейера импорта
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PipelineState {
    Idle,
    Running,
    RunningPendingRerun,
}

/// Отчёт о завершённом запуске импорта
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRun {
    pub session_id: String,
    pub reason: TriggerReason,
    /// true, если запуск был повтором после отложенного триггера
    pub rerun: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Количество импортированных товаров (None при ошибке)
    pub imported: Option<usize>,
    pub error: Option<String>,
}

impl RefreshRun {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
