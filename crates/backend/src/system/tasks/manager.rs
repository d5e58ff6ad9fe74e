use async_trait::async_trait;
use contracts::usecases::u501_import_productos::TriggerReason;

use crate::usecases::u501_import_productos::ImportError;

/// Трейт для менеджеров фоновых задач обновления.
/// Менеджер выполняет один запуск; сериализацией запусков занимается TriggerCoalescer.
#[async_trait]
pub trait TaskManager: Send + Sync {
    /// Возвращает тип задачи, который обрабатывает этот менеджер.
    fn task_type(&self) -> &'static str;

    /// Выполняет задачу один раз.
    /// `session_id`: Уникальный идентификатор текущего запуска.
    /// `reason`: Что вызвало запуск (для логов).
    /// Возвращает количество обработанных записей.
    async fn run(&self, session_id: &str, reason: TriggerReason) -> Result<usize, ImportError>;
}
