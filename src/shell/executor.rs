use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Output, Stdio};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Command exited with code {code}{}", stderr_suffix(.stderr))]
    NonZeroExit { code: i32, stderr: String },
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

impl ExecError {
    /// Exit code of the failed process, if it got that far
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ExecError::NonZeroExit { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// Output streams, present only when the runner captures them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Result of a process that exited with code 0
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub output: Option<CapturedOutput>,
}

impl ExecutionResult {
    pub fn success() -> Self {
        Self {
            exit_code: 0,
            output: None,
        }
    }
}

/// Everything that leaves the process goes through here
pub trait CommandRunner: Send + Sync {
    /// Run a shell command line through the (possibly elevated) shell
    fn run(&self, command: &str) -> Result<ExecutionResult, ExecError>;

    /// Start a program directly as the current user, no shell involved
    fn launch(&self, program: &str, args: &[&str]) -> Result<ExecutionResult, ExecError>;
}

/// Runs commands through `[sudo] <shell> -c`
#[derive(Debug, Clone)]
pub struct ShellRunner {
    shell: String,
    elevate: bool,
    capture_output: bool,
    working_dir: PathBuf,
}

impl ShellRunner {
    pub fn new<P: AsRef<Path>>(working_dir: P) -> Self {
        Self {
            shell: "bash".to_string(),
            elevate: true,
            capture_output: false,
            working_dir: working_dir.as_ref().to_path_buf(),
        }
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn elevated(mut self, elevate: bool) -> Self {
        self.elevate = elevate;
        self
    }

    pub fn capturing(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn shell_command(&self, command: &str) -> Command {
        let mut cmd = if self.elevate {
            let mut cmd = Command::new("sudo");
            cmd.arg(&self.shell);
            cmd
        } else {
            Command::new(&self.shell)
        };
        cmd.arg("-c").arg(command).current_dir(&self.working_dir);
        cmd
    }

    fn program_name(&self) -> &str {
        if self.elevate { "sudo" } else { &self.shell }
    }

    fn check_status(status: ExitStatus, stderr: String) -> Result<i32, ExecError> {
        let code = status.code().unwrap_or(-1);
        if status.success() {
            Ok(code)
        } else {
            Err(ExecError::NonZeroExit { code, stderr })
        }
    }

    fn process_output(output: Output) -> Result<ExecutionResult, ExecError> {
        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        let exit_code = Self::check_status(output.status, stderr.clone())?;

        Ok(ExecutionResult {
            exit_code,
            output: Some(CapturedOutput { stdout, stderr }),
        })
    }
}

impl CommandRunner for ShellRunner {
    fn run(&self, command: &str) -> Result<ExecutionResult, ExecError> {
        let command = command.trim();
        if command.is_empty() {
            return Err(ExecError::EmptyCommand);
        }

        debug!(elevate = self.elevate, shell = %self.shell, %command, "running shell command");

        let mut cmd = self.shell_command(command);
        let spawn_err = |source| ExecError::Spawn {
            program: self.program_name().to_string(),
            source,
        };

        if self.capture_output {
            // stdin stays attached so sudo can still ask for a password
            let output = cmd
                .stdin(Stdio::inherit())
                .output()
                .map_err(spawn_err)?;
            Self::process_output(output)
        } else {
            let status = cmd.status().map_err(spawn_err)?;
            let exit_code = Self::check_status(status, String::new())?;
            Ok(ExecutionResult {
                exit_code,
                output: None,
            })
        }
    }

    fn launch(&self, program: &str, args: &[&str]) -> Result<ExecutionResult, ExecError> {
        if program.trim().is_empty() {
            return Err(ExecError::EmptyCommand);
        }

        debug!(%program, ?args, "launching program");

        let status = Command::new(program)
            .args(args)
            .current_dir(&self.working_dir)
            .status()
            .map_err(|source| ExecError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let exit_code = Self::check_status(status, String::new())?;
        Ok(ExecutionResult {
            exit_code,
            output: None,
        })
    }
}
