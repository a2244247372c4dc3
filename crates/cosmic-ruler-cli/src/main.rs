// crates/cosmic-ruler-cli/src/main.rs
// ============================================================================
// Module: Cosmic Ruler CLI Entry Point
// Description: Command dispatcher for serving and operating Cosmic Ruler.
// Purpose: Start the HTTP server and run offline config and store chores.
// Dependencies: clap, cosmic-ruler-{config,core,server,store-sqlite}, tokio,
//               tracing-subscriber
// ============================================================================

//! ## Overview
//! `cosmic-ruler serve` boots the HTTP API from `cosmic-ruler.toml`.
//! `config validate` and `config example` check and print configuration;
//! `sessions prune` deletes expired admin sessions. Logs go to stderr so
//! stdout carries only command output.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Args;
use clap::Parser;
use clap::Subcommand;
use cosmic_ruler_config::LogLevel;
use cosmic_ruler_config::RulerConfig;
use cosmic_ruler_config::config_toml_example;
use cosmic_ruler_core::AdminStore;
use cosmic_ruler_server::RulerServer;
use cosmic_ruler_server::system_now;
use cosmic_ruler_store_sqlite::SqliteRulerStore;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable holding an explicit log filter.
const LOG_FILTER_ENV: &str = "RUST_LOG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "cosmic-ruler", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP API server.
    Serve(ConfigArgs),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Admin session maintenance.
    Sessions {
        /// Selected sessions subcommand.
        #[command(subcommand)]
        command: SessionsCommand,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load and validate a config file.
    Validate(ConfigArgs),
    /// Print a complete example config.
    Example,
}

/// Sessions subcommands.
#[derive(Subcommand, Debug)]
enum SessionsCommand {
    /// Delete every expired admin session.
    Prune(ConfigArgs),
}

/// Config file selection shared by commands that load config.
#[derive(Args, Debug)]
struct ConfigArgs {
    /// Optional config file path (defaults to cosmic-ruler.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error carrying a printable message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => command_serve(args).await,
        Commands::Config {
            command,
        } => command_config(command),
        Commands::Sessions {
            command: SessionsCommand::Prune(args),
        } => command_sessions_prune(&args),
    }
}

// ============================================================================
// SECTION: Serve Command
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(args: ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(&args)?;
    init_logging(config.logging.level)?;
    let server = tokio::task::spawn_blocking(move || RulerServer::from_config(&config))
        .await
        .map_err(|err| CliError::new(format!("server init failed: init join failed: {err}")))?
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|err| CliError::new(format!("server failed: {err}")))?;
    tracing::info!("cosmic ruler stopped");
    Ok(ExitCode::SUCCESS)
}

/// Resolves when the process receives Ctrl-C.
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "ctrl-c handler unavailable; serving until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(args) => {
            load_config(&args)?;
            write_stdout_line("config ok")?;
        }
        ConfigCommand::Example => write_stdout_line(config_toml_example().trim_end())?,
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Sessions Commands
// ============================================================================

/// Executes `sessions prune`.
fn command_sessions_prune(args: &ConfigArgs) -> CliResult<ExitCode> {
    let config = load_config(args)?;
    init_logging(config.logging.level)?;
    let store = SqliteRulerStore::new(&config.store.sqlite_config())
        .map_err(|err| CliError::new(format!("store open failed: {err}")))?;
    let pruned = store
        .prune_sessions(system_now())
        .map_err(|err| CliError::new(format!("session prune failed: {err}")))?;
    tracing::info!(pruned, "expired sessions pruned");
    write_stdout_line(&format!("pruned {pruned} expired session(s)"))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads config from the selected path.
fn load_config(args: &ConfigArgs) -> CliResult<RulerConfig> {
    RulerConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(format!("config load failed: {err}")))
}

/// Chooses the log filter: a non-empty `RUST_LOG` wins over the config level.
fn filter_directive(env_value: Option<&str>, level: LogLevel) -> String {
    env_value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(|| level.as_str().to_string(), ToString::to_string)
}

/// Installs the global stderr log subscriber.
fn init_logging(level: LogLevel) -> CliResult<()> {
    let env_value = std::env::var(LOG_FILTER_ENV).ok();
    let directive = filter_directive(env_value.as_deref(), level);
    let filter = EnvFilter::try_new(&directive)
        .map_err(|err| CliError::new(format!("invalid log filter '{directive}': {err}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CliError::new(format!("logging init failed: {err}")))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
