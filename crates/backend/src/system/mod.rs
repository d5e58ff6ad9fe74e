pub mod tasks;
pub mod tracing;
