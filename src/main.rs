use clap::{ArgAction, Parser, Subcommand};
use rayi::config::Config;
use rayi::daemon::Daemon;
use rayi::error::{AppError, AppResult};
use rayi::error_translation::ErrorTranslator;
use rayi::llm::build_generator;
use rayi::scan::{self, ScanMethod};
use rayi::search::{self, SearchClient};
use rayi::security::Denylist;
use rayi::shell::{CommandRunner, ShellRunner};
use rayi::ui::{BANNER, Console, StdConsole};
use rayi::{ExecutionLog, Mediator};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rayi", version, about = "Plain-English shell assistant")]
struct Cli {
    /// Config file (default ~/.config/rayi/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive session (default)
    Shell,
    /// Run one request and exit
    Once {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        utterance: Vec<String>,
    },
    /// Watch the trigger file and run each task written into it
    Daemon,
    /// Port-scan a host with nmap, rustscan or masscan
    Scan {
        target: String,
        #[arg(long, value_enum)]
        method: Option<ScanMethod>,
    },
    /// Search the web and summarize the top results
    Search {
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,
    },
    /// Find a video or live stream and play it
    Stream {
        #[arg(required = true, trailing_var_arg = true)]
        query: Vec<String>,
    },
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,rayi={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> AppResult<Config> {
    let config = match path {
        Some(path) => Config::load_or_default(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

fn shell_runner(config: &Config, cwd: &Path) -> ShellRunner {
    ShellRunner::new(cwd)
        .with_shell(config.shell.program.clone())
        .elevated(config.shell.elevate)
        .capturing(config.shell.capture_output || config.shell.explain_failures)
}

fn build_mediator(config: &Config, cwd: &Path) -> AppResult<Mediator> {
    let generator = build_generator(config)?;
    let runner: Arc<dyn CommandRunner> = Arc::new(shell_runner(config, cwd));
    let log = ExecutionLog::with_path(cwd.join(&config.shell.log_path))?;

    Ok(Mediator::new(generator, runner, log, cwd)
        .with_denylist(Denylist::with_mode(config.shell.denylist_mode))
        .explain_failures(config.shell.explain_failures))
}

/// Ctrl-C ends the process cleanly outside the daemon
fn exit_on_interrupt() {
    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            println!("\nExiting Ray-i.");
            std::process::exit(0);
        }
    });
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = load_config(cli.config.as_deref())?;
    let cwd = std::env::current_dir()?;
    debug!(cwd = %cwd.display(), provider = ?config.llm.provider, "starting");

    let mut console = StdConsole::new();

    match cli.command.unwrap_or(Command::Shell) {
        Command::Shell => {
            exit_on_interrupt();
            let mediator = build_mediator(&config, &cwd)?;
            console.say(BANNER);
            mediator.run(&mut console).await?;
        }
        Command::Once { utterance } => {
            exit_on_interrupt();
            let mediator = build_mediator(&config, &cwd)?;
            mediator.handle(&mut console, &utterance.join(" ")).await;
        }
        Command::Daemon => {
            let mut daemon_config = config.daemon.clone();
            // children should read the same config file
            if daemon_config.launch_program.is_none()
                && let Some(ref path) = cli.config
            {
                let mut args = vec!["--config".to_string(), path.to_string_lossy().into_owned()];
                args.append(&mut daemon_config.launch_args);
                daemon_config.launch_args = args;
            }

            let runner: Arc<dyn CommandRunner> = Arc::new(ShellRunner::new(&cwd).elevated(false));
            let daemon = Daemon::from_config(&daemon_config, &cwd, runner)?;
            daemon
                .run_until(&mut console, async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await;
            console.say("Ray-i daemon stopped.");
        }
        Command::Scan { target, method } => {
            let runner = ShellRunner::new(&cwd).elevated(false);
            let installed = scan::detect_installed_tools();
            scan::run_port_scan(&mut console, &runner, &target, method, &installed)?;
        }
        Command::Search { query } => {
            exit_on_interrupt();
            let generator = build_generator(&config)?;
            let client = SearchClient::new(&config.search)?;
            search::handle_search(&mut console, &client, generator.as_ref(), &query.join(" "))
                .await?;
        }
        Command::Stream { query } => {
            exit_on_interrupt();
            let client = SearchClient::new(&config.search)?;
            let runner = ShellRunner::new(&cwd).elevated(false);
            let players = search::detect_players();
            search::handle_stream(&mut console, &client, &runner, &players, &query.join(" "))
                .await?;
        }
    }

    Ok(())
}

fn report(error: &AppError) {
    let friendly = ErrorTranslator::translate_app_error(error);
    eprintln!("Error: {}", friendly.simple_message);
    if let Some(suggestion) = friendly.suggestion {
        eprintln!("Hint: {}", suggestion);
    }
    eprintln!("Details: {}", friendly.raw_error);
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            report(&error);
            ExitCode::FAILURE
        }
    }
}
