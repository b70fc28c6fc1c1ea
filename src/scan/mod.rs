use crate::shell::{CommandRunner, ExecError, ExecutionResult};
use crate::ui::Console;
use clap::ValueEnum;
use std::fmt;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("No port scanning tools (nmap, rustscan, masscan) found. Install at least one.")]
    NoToolsInstalled,

    #[error("{0} is not installed")]
    ToolNotInstalled(ScanMethod),

    #[error("Invalid scan target: '{0}'")]
    InvalidTarget(String),

    #[error("Scan failed: {0}")]
    Exec(#[from] ExecError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScanMethod {
    Nmap,
    Rustscan,
    Masscan,
}

impl ScanMethod {
    pub const ALL: [ScanMethod; 3] = [ScanMethod::Nmap, ScanMethod::Rustscan, ScanMethod::Masscan];

    pub fn binary(self) -> &'static str {
        match self {
            ScanMethod::Nmap => "nmap",
            ScanMethod::Rustscan => "rustscan",
            ScanMethod::Masscan => "masscan",
        }
    }
}

impl fmt::Display for ScanMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary())
    }
}

/// Scanners found on PATH
pub fn detect_installed_tools() -> Vec<ScanMethod> {
    ScanMethod::ALL
        .into_iter()
        .filter(|method| which::which(method.binary()).is_ok())
        .collect()
}

/// Pick the requested scanner, or rustscan before nmap when none was asked for
pub fn choose_method(
    requested: Option<ScanMethod>,
    installed: &[ScanMethod],
) -> Result<ScanMethod, ScanError> {
    if installed.is_empty() {
        return Err(ScanError::NoToolsInstalled);
    }

    let method = requested.unwrap_or(if installed.contains(&ScanMethod::Rustscan) {
        ScanMethod::Rustscan
    } else {
        ScanMethod::Nmap
    });

    if !installed.contains(&method) {
        return Err(ScanError::ToolNotInstalled(method));
    }

    Ok(method)
}

/// Program and argument vector for a scan; no shell is involved
pub fn scan_args(method: ScanMethod, target: &str) -> (&'static str, Vec<String>) {
    let target = target.to_string();
    match method {
        ScanMethod::Nmap => (
            "nmap",
            vec!["-sS".into(), "-T3".into(), "-p-".into(), target],
        ),
        ScanMethod::Rustscan => (
            "rustscan",
            vec!["-a".into(), target, "--".into(), "-sS".into()],
        ),
        ScanMethod::Masscan => (
            "sudo",
            vec![
                "masscan".into(),
                target,
                "-p1-65535".into(),
                "--rate=1000".into(),
            ],
        ),
    }
}

fn validate_target(target: &str) -> Result<&str, ScanError> {
    let target = target.trim();
    if target.is_empty() || target.starts_with('-') || target.contains(char::is_whitespace) {
        return Err(ScanError::InvalidTarget(target.to_string()));
    }
    Ok(target)
}

/// Run one scan against `target` with whatever `installed` allows
pub fn run_port_scan(
    console: &mut dyn Console,
    runner: &dyn CommandRunner,
    target: &str,
    requested: Option<ScanMethod>,
    installed: &[ScanMethod],
) -> Result<ExecutionResult, ScanError> {
    let target = validate_target(target)?;
    let method = choose_method(requested, installed)?;
    let (program, args) = scan_args(method, target);

    info!(%method, %target, "starting port scan");
    console.say(&format!("Target: {}", target));
    console.say(&format!("Using: {}", method));
    console.say(&format!("Running: {} {}\n", program, args.join(" ")));

    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    Ok(runner.launch(program, &args)?)
}
