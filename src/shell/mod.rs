pub mod executor;

pub use executor::{CapturedOutput, CommandRunner, ExecError, ExecutionResult, ShellRunner};
