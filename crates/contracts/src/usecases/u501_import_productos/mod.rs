//! u501: импорт каталога productos_vender из Excel и его обновление
//! по расписанию или по изменению файла.

pub mod progress;

pub use progress::{PipelineState, RefreshRun, TriggerReason};
