use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;

use gsheet_core::modules::config as core_config;
use gsheet_core::utils::{http, paths};
use gsheet_core::{
    AuthenticatedClient, Authenticator, CancellationToken, FlowSettings, SheetsClient,
};

use crate::cli::Cli;

/// Resolve configuration and produce an authenticated client; runs before every subcommand.
pub async fn authenticate(cli: &Cli, cancel: &CancellationToken) -> Result<AuthenticatedClient> {
    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => paths::default_config_dir().context("error resolving config directory")?,
    };
    paths::ensure_config_dir(&config_dir).context("error creating config directory")?;

    let credentials_file: PathBuf = cli
        .credentials_file
        .clone()
        .unwrap_or_else(|| paths::credentials_path(&config_dir));
    let oauth = core_config::load_oauth_config(&credentials_file)
        .context("error parsing client secret file to config")?;

    let http = http::create_client(http::DEFAULT_TIMEOUT_SECS).context("error building HTTP client")?;
    let authenticator = Authenticator::new(&config_dir, oauth, http).with_settings(FlowSettings {
        callback_port: cli.callback_port,
        timeout: Duration::from_secs(cli.auth_timeout),
        ..FlowSettings::default()
    });

    if cli.reauthenticate {
        authenticator.forget_cached().context("error removing cached token")?;
    }

    authenticator.get_client(cancel).await.context("error retrieving HTTP client")
}

pub fn handle_auth(client: &AuthenticatedClient) -> Result<()> {
    eprintln!(
        "{} Authenticated (token cached at {})",
        "✓".green(),
        client.token_path().display()
    );
    Ok(())
}

pub async fn handle_get(
    client: AuthenticatedClient,
    spreadsheet_id: &str,
    ranges: &[String],
) -> Result<()> {
    let sheets = SheetsClient::new(client).context("error retrieving Sheets client")?;
    let mut out = std::io::stdout();
    let written = sheets
        .fetch_ranges(spreadsheet_id, ranges, &mut out)
        .await
        .context("error retrieving data from sheet")?;
    tracing::debug!(spreadsheet_id, written, "Fetched ranges");
    Ok(())
}

/// Reject input the argument parser cannot express.
pub fn validate_get(spreadsheet_id: &str, ranges: &[String]) -> Result<()> {
    if spreadsheet_id.trim().is_empty() {
        anyhow::bail!("spreadsheet ID is required");
    }
    if ranges.is_empty() || ranges.iter().any(|r| r.trim().is_empty()) {
        anyhow::bail!("range is required");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_get() {
        assert!(validate_get("X", &["A1:B2".to_string()]).is_ok());
        assert_eq!(
            validate_get("  ", &["A1".to_string()]).unwrap_err().to_string(),
            "spreadsheet ID is required"
        );
        assert_eq!(validate_get("X", &[]).unwrap_err().to_string(), "range is required");
        assert_eq!(validate_get("X", &[String::new()]).unwrap_err().to_string(), "range is required");
    }
}
