//! gsheet - read Google Sheets ranges from the command line.
//!
//! Every subcommand authenticates first: a cached token from the config
//! directory is reused, otherwise a browser-based OAuth2 flow runs against a
//! loopback callback. `get` prints each range's value matrix as one JSON line.

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod signals;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Get { spreadsheet_id, ranges } = &cli.command {
        commands::validate_get(spreadsheet_id, ranges)?;
    }

    let cancel = signals::cancel_on_signal();
    let client = commands::authenticate(&cli, &cancel).await?;

    match cli.command {
        Commands::Auth => commands::handle_auth(&client),
        Commands::Get { spreadsheet_id, ranges } => {
            tokio::select! {
                result = commands::handle_get(client, &spreadsheet_id, &ranges) => result,
                () = cancel.cancelled() => anyhow::bail!("interrupted"),
            }
        }
    }
}
