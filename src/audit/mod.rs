pub mod logger;

pub use logger::{ExecutionLog, ExecutionLogEntry};
