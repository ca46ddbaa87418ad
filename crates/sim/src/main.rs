//! Headless aura simulator.
//!
//! Loads spell content, drives scripted scenarios through the runtime, and
//! inspects the aura logs it leaves behind.
//! Run with: `aura-sim <command>`

mod commands;
mod scenario;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use commands::{ReadLog, RunScenario, Spells};

/// Headless aura simulator
#[derive(Parser)]
#[command(name = "aura-sim")]
#[command(about = "Drive the aura engine from the command line", long_about = None)]
#[command(version)]
struct Cli {
    /// Also write logs to `<DIR>/aura-sim.log`
    #[arg(long, global = true, value_name = "DIR", env = "AURA_SIM_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Run a scenario through the runtime and print what happened
    Run(RunScenario),

    /// List the spell catalog and the scripts bound to it
    Spells(Spells),

    /// Read and filter an aura log written by `run --aura-log`
    ReadLog(ReadLog),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = setup_logging(cli.log_dir.as_deref(), cli.verbose)?;

    match cli.command {
        Command::Run(cmd) => cmd.execute().await,
        Command::Spells(cmd) => cmd.execute(),
        Command::ReadLog(cmd) => cmd.execute(),
    }
}

/// Logs to stderr, plus a non-blocking file layer when a directory is given.
///
/// The returned guard must stay alive until exit so buffered lines reach the file.
fn setup_logging(log_dir: Option<&Path>, verbose: u8) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            let file_appender = tracing_appender::rolling::never(dir, "aura-sim.log");
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking_file)
                .with_ansi(false)
                .boxed();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    if let Some(dir) = log_dir {
        tracing::info!("Log file: {}/aura-sim.log", dir.display());
    }

    Ok(guard)
}
