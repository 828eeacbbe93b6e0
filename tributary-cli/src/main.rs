//! Tributary CLI - Command-line interface
//!
//! Runs wrapper queries from the shell and prints the collected results.

mod commands;

use std::path::PathBuf;

use clap::Parser;
use tributary_core::tracing_setup::{CliLogLevel, init_tracing};

#[derive(Parser)]
#[command(name = "tributary")]
#[command(about = "Query stream sources and print normalized results")]
struct Cli {
    /// Console log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    log_level: CliLogLevel,
    /// Also write a full trace log into this directory
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: commands::Commands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.log_level.into(), cli.logs_dir.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {e}"))?;

    commands::handle_command(cli.command).await
}
