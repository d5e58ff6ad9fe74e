pub mod coalescer;
pub mod initialization;
pub mod manager;
pub mod managers;
pub mod watcher;
pub mod worker;

pub use coalescer::{TriggerCoalescer, TriggerOutcome};
pub use watcher::FileWatchWorker;
pub use worker::ScheduledTaskWorker;
