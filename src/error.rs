use std::io;
use thiserror::Error;

use crate::config::settings::ConfigError;
use crate::daemon::DaemonError;
use crate::llm::client::LLMError;
use crate::mediator::GenerationError;
use crate::scan::ScanError;
use crate::search::SearchError;
use crate::shell::ExecError;

/// Top-level application error that wraps all module-specific errors
///
/// Module errors convert into `AppError` via `From`, so application-level code
/// can use `?` across module boundaries without losing the specific cause.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LLMError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Execution error: {0}")]
    Exec(#[from] ExecError),

    #[error("Daemon error: {0}")]
    Daemon(#[from] DaemonError),

    #[error("Scan error: {0}")]
    Scan(#[from] ScanError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
