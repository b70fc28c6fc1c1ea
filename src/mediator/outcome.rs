use crate::llm::LLMError;
use crate::shell::ExecError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The model could not produce something usable
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Text generation failed: {0}")]
    Api(#[from] LLMError),

    #[error("Text generation returned no usable text")]
    Empty,
}

/// Where a candidate command came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOrigin {
    Synthesized,
    Direct,
}

/// A shell command that still has to pass the denylist and the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateCommand {
    pub command: String,
    pub origin: CommandOrigin,
}

impl CandidateCommand {
    pub fn synthesized(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            origin: CommandOrigin::Synthesized,
        }
    }

    pub fn direct(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            origin: CommandOrigin::Direct,
        }
    }
}

/// Where one input cycle ended. Every variant returns the session to the prompt
/// except [`CycleOutcome::Exit`].
#[derive(Debug)]
pub enum CycleOutcome {
    /// Empty input
    Idle,
    /// `exit` or `quit`
    Exit,
    Executed { command: String, exit_code: i32 },
    /// Denylisted; the operator was never asked
    Rejected {
        command: String,
        fragment: &'static str,
    },
    /// Operator answered anything but `y`
    Cancelled { command: String },
    GenerationFailed(GenerationError),
    ExecutionFailed { command: String, error: ExecError },
    FileWritten { path: PathBuf },
    FileNotFound { path: PathBuf },
    FileError { path: PathBuf, error: io::Error },
    Explained,
    /// Operator gave nothing to work with (no filename, no code)
    Skipped,
}

impl CycleOutcome {
    /// True when a command actually ran
    pub fn executed(&self) -> bool {
        matches!(self, CycleOutcome::Executed { .. })
    }
}
