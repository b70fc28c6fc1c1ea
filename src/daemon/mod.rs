//! File-trigger daemon: tasks written into a file are handed to a fresh
//! `rayi once <task>` process.

pub mod trigger;

pub use trigger::TriggerWatcher;

use crate::config::DaemonConfig;
use crate::shell::CommandRunner;
use crate::ui::Console;
use chrono::Local;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("Failed to read trigger file {path}: {source}")]
    Trigger {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not locate the rayi executable: {0}")]
    CurrentExe(#[source] io::Error),

    #[error("Launch task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

pub struct Daemon {
    watcher: TriggerWatcher,
    runner: Arc<dyn CommandRunner>,
    program: String,
    args: Vec<String>,
    interval: Duration,
}

impl Daemon {
    pub fn new(
        trigger_file: impl Into<PathBuf>,
        runner: Arc<dyn CommandRunner>,
        program: impl Into<String>,
        args: Vec<String>,
    ) -> Self {
        Self {
            watcher: TriggerWatcher::new(trigger_file),
            runner,
            program: program.into(),
            args,
            interval: Duration::from_millis(1000),
        }
    }

    /// Trigger file relative to `cwd`; the launch program defaults to this executable
    pub fn from_config(
        config: &DaemonConfig,
        cwd: &Path,
        runner: Arc<dyn CommandRunner>,
    ) -> Result<Self, DaemonError> {
        let program = match config.launch_program {
            Some(ref program) => program.clone(),
            None => std::env::current_exe()
                .map_err(DaemonError::CurrentExe)?
                .to_string_lossy()
                .into_owned(),
        };

        Ok(Self::new(
            cwd.join(&config.trigger_file),
            runner,
            program,
            config.launch_args.clone(),
        )
        .with_interval(Duration::from_millis(config.poll_interval_ms)))
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn trigger_path(&self) -> &Path {
        self.watcher.path()
    }

    /// Check the trigger file once and launch a task if one is waiting
    pub async fn tick(&mut self, console: &mut dyn Console) -> Result<Option<String>, DaemonError> {
        let path = self.watcher.path().to_path_buf();
        let Some(task) = self
            .watcher
            .poll_once()
            .map_err(|source| DaemonError::Trigger { path, source })?
        else {
            return Ok(None);
        };

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        console.say(&format!("[{}] Ray-i picked up: {}", timestamp, task));
        info!(%task, "trigger file task received");

        let runner = Arc::clone(&self.runner);
        let program = self.program.clone();
        let mut args = self.args.clone();
        args.push(task.clone());

        let result = tokio::task::spawn_blocking(move || {
            let args: Vec<&str> = args.iter().map(String::as_str).collect();
            runner.launch(&program, &args)
        })
        .await?;

        match result {
            Ok(result) => debug!(exit_code = result.exit_code, "task finished"),
            Err(err) => warn!(error = %err, %task, "task launch failed"),
        }

        Ok(Some(task))
    }

    /// Poll until `shutdown` resolves
    pub async fn run_until<F>(mut self, console: &mut dyn Console, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        console.say(&format!(
            "Ray-i daemon started. Listening for tasks in {}",
            self.watcher.path().display()
        ));
        tokio::pin!(shutdown);

        loop {
            if let Err(err) = self.tick(console).await {
                warn!(error = %err, "trigger poll failed");
            }

            tokio::select! {
                _ = &mut shutdown => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("daemon stopped");
    }
}
