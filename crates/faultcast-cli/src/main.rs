//! Faultcast CLI - Inspect and exercise the error-reporting setup
//!
//! Provides commands for:
//! - Checking reporter preconditions (endpoint URI, storage directory)
//! - Showing the attributes attached to every report
//! - Sending a test report through the process-wide reporter
//! - Managing reports stored while the endpoint was unreachable

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use faultcast_core::Settings;
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    attributes::AttributesCommand,
    reports::ReportsCommand,
    send::SendCommand,
    validate::{ValidateCommand, ValidateEndpointCommand, ValidateStorageCommand},
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "faultcast", version, about = "Remote error reporting for desktop apps")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate settings file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check every reporter precondition in the settings file
    Validate(ValidateCommand),
    /// Check that a value is a well-formed endpoint URI
    ValidateEndpoint(ValidateEndpointCommand),
    /// Check that a directory exists and is empty
    ValidateStorage(ValidateStorageCommand),
    /// Show the attributes attached to every report
    Attributes(AttributesCommand),
    /// Send a test report to the configured endpoint
    Send(SendCommand),
    /// Manage reports stored for later delivery
    #[command(subcommand)]
    Reports(ReportsCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so `--json` output on stdout stays parseable.
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    faultcast_reporter::install_panic_reporter();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let config_path = cli.config.unwrap_or_else(Settings::default_path);

    match cli.command {
        Commands::Validate(cmd) => cmd.execute(format, &config_path).await,
        Commands::ValidateEndpoint(cmd) => cmd.execute(format).await,
        Commands::ValidateStorage(cmd) => cmd.execute(format).await,
        Commands::Attributes(cmd) => cmd.execute(format, &config_path).await,
        Commands::Send(cmd) => cmd.execute(format, &config_path).await,
        Commands::Reports(cmd) => cmd.execute(format, &config_path).await,
    }
}
