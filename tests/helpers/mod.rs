#![allow(dead_code)]

use async_trait::async_trait;
use rayi::audit::ExecutionLog;
use rayi::llm::{GenerationRequest, LLMError, TextGenerator};
use rayi::mediator::Mediator;
use rayi::shell::{CapturedOutput, CommandRunner, ExecError, ExecutionResult};
use rayi::ui::{Console, Tone};
use std::collections::VecDeque;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Text generator that replays scripted responses and records every request
#[derive(Default)]
pub struct MockGenerator {
    responses: Mutex<VecDeque<Result<String, LLMError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockGenerator {
    pub fn replying(responses: &[&str]) -> Self {
        let generator = Self::default();
        for response in responses {
            generator.push(Ok(response.to_string()));
        }
        generator
    }

    pub fn failing(error: LLMError) -> Self {
        let generator = Self::default();
        generator.push(Err(error));
        generator
    }

    pub fn push(&self, response: Result<String, LLMError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, LLMError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LLMError::InvalidResponse("no scripted response".to_string())))
    }
}

/// Runner that never touches the OS
#[derive(Default)]
pub struct FakeRunner {
    runs: Mutex<Vec<String>>,
    launches: Mutex<Vec<(String, Vec<String>)>>,
    exit_code: Mutex<i32>,
    stderr: Mutex<String>,
}

impl FakeRunner {
    pub fn failing_with(code: i32, stderr: &str) -> Self {
        let runner = Self::default();
        *runner.exit_code.lock().unwrap() = code;
        *runner.stderr.lock().unwrap() = stderr.to_string();
        runner
    }

    pub fn runs(&self) -> Vec<String> {
        self.runs.lock().unwrap().clone()
    }

    pub fn launches(&self) -> Vec<(String, Vec<String>)> {
        self.launches.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeRunner {
    fn run(&self, command: &str) -> Result<ExecutionResult, ExecError> {
        self.runs.lock().unwrap().push(command.to_string());

        let code = *self.exit_code.lock().unwrap();
        if code != 0 {
            return Err(ExecError::NonZeroExit {
                code,
                stderr: self.stderr.lock().unwrap().clone(),
            });
        }

        Ok(ExecutionResult {
            exit_code: 0,
            output: Some(CapturedOutput {
                stdout: format!("ran {}", command),
                stderr: String::new(),
            }),
        })
    }

    fn launch(&self, program: &str, args: &[&str]) -> Result<ExecutionResult, ExecError> {
        self.launches.lock().unwrap().push((
            program.to_string(),
            args.iter().map(|arg| arg.to_string()).collect(),
        ));
        Ok(ExecutionResult::success())
    }
}

/// Console fed from a script; `None` entries simulate end of input
#[derive(Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<Option<String>>,
    pub prompts: Vec<String>,
    pub output: Vec<(Tone, String)>,
}

impl ScriptedConsole {
    pub fn new(inputs: &[&str]) -> Self {
        Self {
            inputs: inputs.iter().map(|line| Some(line.to_string())).collect(),
            ..Default::default()
        }
    }

    pub fn printed(&self, needle: &str) -> bool {
        self.output.iter().any(|(_, line)| line.contains(needle))
    }

    pub fn asked(&self, needle: &str) -> bool {
        self.prompts.iter().any(|prompt| prompt.contains(needle))
    }
}

impl Console for ScriptedConsole {
    fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self.inputs.pop_front().flatten())
    }

    fn show(&mut self, tone: Tone, message: &str) {
        self.output.push((tone, message.to_string()));
    }
}

/// Mediator over fakes, rooted in a fresh temp dir
pub struct Harness {
    pub dir: TempDir,
    pub generator: Arc<MockGenerator>,
    pub runner: Arc<FakeRunner>,
    pub mediator: Mediator,
}

impl Harness {
    pub fn new(generator: MockGenerator) -> Self {
        Self::with_runner(generator, FakeRunner::default())
    }

    pub fn with_runner(generator: MockGenerator, runner: FakeRunner) -> Self {
        let dir = TempDir::new().unwrap();
        let generator = Arc::new(generator);
        let runner = Arc::new(runner);
        let log = ExecutionLog::with_path(dir.path().join("rayi.log")).unwrap();
        let mediator = Mediator::new(generator.clone(), runner.clone(), log, dir.path());

        Self {
            dir,
            generator,
            runner,
            mediator,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn log_path(&self) -> PathBuf {
        self.dir.path().join("rayi.log")
    }

    pub fn log_lines(&self) -> Vec<String> {
        std::fs::read_to_string(self.log_path())
            .map(|content| content.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }
}
