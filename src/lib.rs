pub mod audit;
pub mod config;
pub mod daemon;
pub mod error;
pub mod error_translation;
pub mod llm;
pub mod mediator;
pub mod scan;
pub mod search;
pub mod security;
pub mod shell;
pub mod ui;

// Re-export commonly used types for convenience
pub use audit::ExecutionLog;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use llm::{GenerationRequest, LLMError, TextGenerator};
pub use mediator::{ClassifiedIntent, CycleOutcome, Mediator, classify};
pub use security::{Denylist, MatchMode, is_dangerous};
pub use shell::{CommandRunner, ExecError, ExecutionResult, ShellRunner};
