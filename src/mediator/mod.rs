//! The command mediator: one line of operator intent in, one decision out.
//!
//! A cycle moves through
//! `AwaitingInput -> Classified -> {Synthesized | DirectCommand} -> SafetyChecked
//! -> {AwaitingConfirmation -> Executed | Rejected} -> AwaitingInput`.
//! Generation and execution failures are reported and end the cycle; none of
//! them end the session.

pub mod codegen;
pub mod intent;
pub mod outcome;

pub use intent::{ClassifiedIntent, ShellRequest, classify};
pub use outcome::{CandidateCommand, CommandOrigin, CycleOutcome, GenerationError};

use crate::audit::ExecutionLog;
use crate::error_translation::{ErrorTranslator, UserFriendlyError};
use crate::llm::{GenerationRequest, TextGenerator, clean_command, prompts, strip_code_fences};
use crate::security::{DenyMatch, Denylist};
use crate::shell::{CommandRunner, ExecError, ExecutionResult};
use crate::ui::{Console, Tone, read_until_blank};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The only answer that lets a command run
pub const AFFIRMATIVE: &str = "y";

const INPUT_PROMPT: &str = "➤ ";
const CONTINUATION_PROMPT: &str = "... ";

pub struct Mediator {
    generator: Arc<dyn TextGenerator>,
    runner: Arc<dyn CommandRunner>,
    log: ExecutionLog,
    denylist: Denylist,
    cwd: PathBuf,
    explain_failures: bool,
}

impl Mediator {
    pub fn new(
        generator: Arc<dyn TextGenerator>,
        runner: Arc<dyn CommandRunner>,
        log: ExecutionLog,
        cwd: impl Into<PathBuf>,
    ) -> Self {
        Self {
            generator,
            runner,
            log,
            denylist: Denylist::new(),
            cwd: cwd.into(),
            explain_failures: false,
        }
    }

    pub fn with_denylist(mut self, denylist: Denylist) -> Self {
        self.denylist = denylist;
        self
    }

    /// Ask the model to diagnose failed commands (needs captured output)
    pub fn explain_failures(mut self, enabled: bool) -> Self {
        self.explain_failures = enabled;
        self
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Prompt loop until `exit`, `quit` or end of input
    pub async fn run(&self, console: &mut dyn Console) -> io::Result<()> {
        loop {
            let Some(line) = console.read_line(INPUT_PROMPT)? else {
                break;
            };

            if let CycleOutcome::Exit = self.handle(console, &line).await {
                break;
            }
        }

        console.say("Shutting down.");
        Ok(())
    }

    /// Run one full cycle for one line of input and report how it ended
    pub async fn handle(&self, console: &mut dyn Console, utterance: &str) -> CycleOutcome {
        let text = utterance.trim();
        if text.is_empty() {
            return CycleOutcome::Idle;
        }
        if text.eq_ignore_ascii_case("exit") || text.eq_ignore_ascii_case("quit") {
            return CycleOutcome::Exit;
        }

        let intent = classify(text);
        debug!(?intent, "classified input");

        let outcome = match intent {
            ClassifiedIntent::ShellCommand(request) => self.handle_shell(console, request).await,
            ClassifiedIntent::CodeGenerationRequest {
                description,
                filename,
            } => self.generate_code(console, &description, filename).await,
            ClassifiedIntent::RefactorRequest { filename, task } => {
                self.refactor_file(console, &filename, &task).await
            }
            ClassifiedIntent::PastedCodeBlock { code } => {
                console.say("Code detected. Paste more lines, or press Enter to analyze.");
                let mut lines = vec![code];
                match read_until_blank(console, CONTINUATION_PROMPT) {
                    Ok(more) => lines.extend(more),
                    Err(err) => warn!(error = %err, "could not read pasted code"),
                }
                self.explain_code(console, None, &lines.join("\n")).await
            }
            ClassifiedIntent::ExplainRequest { request } => {
                console.say("Paste the code you want explained (end with an empty line):");
                let lines = read_until_blank(console, CONTINUATION_PROMPT).unwrap_or_default();
                if lines.is_empty() {
                    CycleOutcome::Skipped
                } else {
                    self.explain_code(console, Some(&request), &lines.join("\n")).await
                }
            }
        };

        report(console, &outcome);
        outcome
    }

    async fn handle_shell(&self, console: &mut dyn Console, request: ShellRequest) -> CycleOutcome {
        let candidate = match request {
            ShellRequest::Direct(command) => CandidateCommand::direct(command),
            ShellRequest::Describe(description) => {
                console.say("Ray-i is thinking...");
                match self.synthesize_command(&description, &self.cwd).await {
                    Ok(candidate) => candidate,
                    Err(err) => return CycleOutcome::GenerationFailed(err),
                }
            }
        };

        self.confirm_and_execute(console, &candidate).await
    }

    /// Turn a plain-English description into one shell command
    pub async fn synthesize_command(
        &self,
        description: &str,
        cwd: &Path,
    ) -> Result<CandidateCommand, GenerationError> {
        let response = self
            .generator
            .generate(&prompts::shell_command(description, cwd))
            .await?;

        let command = clean_command(&response);
        if command.is_empty() {
            return Err(GenerationError::Empty);
        }

        debug!(%description, %command, "synthesized command");
        Ok(CandidateCommand::synthesized(command))
    }

    /// Which denylist rule, if any, the command trips
    pub fn screen(&self, command: &str) -> Option<DenyMatch> {
        self.denylist.check(command)
    }

    /// Screen, show, ask, and only on an explicit `y` run and log the command
    pub async fn confirm_and_execute(
        &self,
        console: &mut dyn Console,
        candidate: &CandidateCommand,
    ) -> CycleOutcome {
        let command = candidate.command.trim().to_string();
        if command.is_empty() {
            return CycleOutcome::Skipped;
        }

        if let Some(hit) = self.screen(&command) {
            warn!(%command, fragment = hit.fragment, "denylisted command refused");
            return CycleOutcome::Rejected {
                command,
                fragment: hit.fragment,
            };
        }

        console.show(Tone::Command, &format!("Ray-i suggests: {}", command));

        let answer = match console.read_line("Do you want me to run this command? (y/n): ") {
            Ok(answer) => answer.unwrap_or_default(),
            Err(err) => {
                warn!(error = %err, "could not read confirmation");
                String::new()
            }
        };

        if answer.trim().to_lowercase() != AFFIRMATIVE {
            return CycleOutcome::Cancelled { command };
        }

        info!(%command, origin = ?candidate.origin, "executing confirmed command");

        match self.runner.run(&command) {
            Ok(result) => {
                print_captured(console, &result);
                if let Err(err) = self.log.append(&command) {
                    warn!(error = %err, path = %self.log.log_path().display(), "failed to write execution log");
                    console.show(Tone::Warning, &format!("Could not write execution log: {}", err));
                }
                CycleOutcome::Executed {
                    command,
                    exit_code: result.exit_code,
                }
            }
            Err(error) => {
                if self.explain_failures
                    && let ExecError::NonZeroExit { ref stderr, .. } = error
                    && !stderr.trim().is_empty()
                {
                    self.explain_failure(console, &command, stderr).await;
                }
                CycleOutcome::ExecutionFailed { command, error }
            }
        }
    }

    async fn explain_failure(&self, console: &mut dyn Console, command: &str, output: &str) {
        console.say(output.trim_end());
        console.say("Ray-i is analyzing the error...");
        match self.ask(&prompts::explain_failure(command, output)).await {
            Ok(text) => console.say(&format!("Ray-i suggests:\n{}", text)),
            Err(err) => console.show(Tone::Error, &format!("Failed to analyze the error: {}", err)),
        }
    }

    async fn generate_code(
        &self,
        console: &mut dyn Console,
        description: &str,
        filename: Option<String>,
    ) -> CycleOutcome {
        let filename = match filename.filter(|name| !name.is_empty()) {
            Some(name) => name,
            None => {
                let answer = console
                    .read_line("What filename should I save the code in (e.g. main.py)? ")
                    .ok()
                    .flatten()
                    .unwrap_or_default();
                match codegen::normalize_filename(&answer) {
                    Some(name) => {
                        if !answer.contains('.') {
                            console.say(&format!("No file extension given, assuming '{}'", name));
                        }
                        name
                    }
                    None => return CycleOutcome::Skipped,
                }
            }
        };

        let language = codegen::detect_language(&filename);
        console.say(&format!("Generating code for {}...", filename));

        let code = match self
            .ask(&prompts::generate_code(description, &filename, language))
            .await
        {
            Ok(text) => text,
            Err(err) => return CycleOutcome::GenerationFailed(err),
        };

        let path = self.cwd.join(&filename);
        if let Err(error) = fs::write(&path, code) {
            return CycleOutcome::FileError { path, error };
        }
        console.show(Tone::Success, &format!("Code written to '{}'.", filename));

        self.offer_follow_ups(console, &filename);

        CycleOutcome::FileWritten { path }
    }

    /// Optional run and editor launch after a file has been generated
    fn offer_follow_ups(&self, console: &mut dyn Console, filename: &str) {
        if let Some((program, args)) = codegen::run_command_for(filename)
            && ask_yes(console, &format!("Do you want to run '{}' now? (y/n): ", filename))
        {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            if let Err(err) = self.runner.launch(program, &args) {
                console.show(Tone::Error, &format!("Run failed: {}", err));
            }
        }

        let choice = console
            .read_line(&format!("Open '{}' in VS Code or nano? (v/n/skip): ", filename))
            .ok()
            .flatten()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        let editor = match choice.as_str() {
            "v" => "code",
            "n" => "nano",
            _ => return,
        };

        if let Err(err) = self.runner.launch(editor, &[filename]) {
            console.show(Tone::Error, &format!("Could not open editor: {}", err));
        }
    }

    async fn refactor_file(&self, console: &mut dyn Console, filename: &str, task: &str) -> CycleOutcome {
        let path = self.cwd.join(filename);
        if !path.is_file() {
            return CycleOutcome::FileNotFound { path };
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(error) => return CycleOutcome::FileError { path, error },
        };

        console.say(&format!("Refactoring '{}' based on: {}...", filename, task));

        let new_code = match self.ask(&prompts::refactor(task, &content)).await {
            Ok(text) => text,
            Err(err) => return CycleOutcome::GenerationFailed(err),
        };

        if let Err(error) = fs::write(&path, new_code) {
            return CycleOutcome::FileError { path, error };
        }
        console.show(Tone::Success, &format!("File '{}' updated successfully.", filename));

        CycleOutcome::FileWritten { path }
    }

    async fn explain_code(
        &self,
        console: &mut dyn Console,
        request: Option<&str>,
        code: &str,
    ) -> CycleOutcome {
        match self.ask(&prompts::explain_code(request, code)).await {
            Ok(explanation) => {
                console.say(&format!("Ray-i explains:\n\n{}", explanation));
                CycleOutcome::Explained
            }
            Err(err) => CycleOutcome::GenerationFailed(err),
        }
    }

    /// Generate, strip fences, and treat blank output as a failure
    async fn ask(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let response = self.generator.generate(request).await?;
        let text = strip_code_fences(&response);
        if text.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(text.to_string())
    }
}

fn ask_yes(console: &mut dyn Console, prompt: &str) -> bool {
    matches!(console.read_line(prompt), Ok(Some(answer)) if answer.trim().to_lowercase() == AFFIRMATIVE)
}

fn print_captured(console: &mut dyn Console, result: &ExecutionResult) {
    if let Some(ref output) = result.output {
        if !output.stdout.trim().is_empty() {
            console.say(output.stdout.trim_end());
        }
        if !output.stderr.trim().is_empty() {
            console.show(Tone::Warning, output.stderr.trim_end());
        }
    }
}

/// Tell the operator how a cycle ended
fn report(console: &mut dyn Console, outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Idle
        | CycleOutcome::Exit
        | CycleOutcome::Explained
        | CycleOutcome::FileWritten { .. } => {}
        CycleOutcome::Executed { .. } => console.show(Tone::Success, "Done."),
        CycleOutcome::Rejected { command, fragment } => console.show(
            Tone::Error,
            &format!(
                "Refusing to run '{}': it matches the blocked fragment '{}'.",
                command, fragment
            ),
        ),
        CycleOutcome::Cancelled { .. } => console.show(Tone::Warning, "Canceled."),
        CycleOutcome::GenerationFailed(err) => {
            show_friendly(console, ErrorTranslator::translate_generation(err))
        }
        CycleOutcome::ExecutionFailed { error, .. } => {
            let message = match error.exit_code() {
                Some(code) => format!("Execution failed (exit code {}).", code),
                None => format!("Execution failed: {}", error),
            };
            console.show(Tone::Error, &message);
        }
        CycleOutcome::FileNotFound { path } => {
            console.show(Tone::Error, &format!("File '{}' not found.", path.display()))
        }
        CycleOutcome::FileError { path, error } => console.show(
            Tone::Error,
            &format!("Could not access '{}': {}", path.display(), error),
        ),
        CycleOutcome::Skipped => console.show(Tone::Warning, "Nothing to do."),
    }
}

fn show_friendly(console: &mut dyn Console, friendly: UserFriendlyError) {
    console.show(Tone::Error, &friendly.simple_message);
    if let Some(ref suggestion) = friendly.suggestion {
        console.say(&format!("Hint: {}", suggestion));
    }
    console.say(&format!("Details: {}", friendly.raw_error));
}
