use std::fs;
use std::io;
use std::path::Path;

use gsheet_types::{ClientSecretFile, ConfigError};

use crate::modules::oauth::{OAuthConfig, SPREADSHEETS_READONLY_SCOPE};

/// Load the OAuth client registration from a `credentials.json` file.
pub fn load_oauth_config(credentials_file: &Path) -> Result<OAuthConfig, ConfigError> {
    let bytes = fs::read(credentials_file).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => {
            ConfigError::NotFound { path: credentials_file.display().to_string() }
        }
        _ => ConfigError::ParseError {
            message: format!("error reading client secret file {}: {}", credentials_file.display(), e),
        },
    })?;

    let secret = ClientSecretFile::from_json(&bytes)?;
    tracing::debug!(client_id = %secret.client_id, "Loaded OAuth client registration");
    Ok(OAuthConfig::from_client_secret(secret, &[SPREADSHEETS_READONLY_SCOPE]))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_installed_credentials() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(
            &path,
            r#"{"installed":{"client_id":"cid","client_secret":"sec","auth_uri":"https://accounts.google.com/o/oauth2/auth","token_uri":"https://oauth2.googleapis.com/token"}}"#,
        )
        .unwrap();

        let config = load_oauth_config(&path).unwrap();
        assert_eq!(config.client_id, "cid");
        assert_eq!(config.client_secret, "sec");
        assert_eq!(config.scopes, vec![SPREADSHEETS_READONLY_SCOPE.to_string()]);
    }

    #[test]
    fn test_missing_credentials_file() {
        let dir = TempDir::new().unwrap();
        let err = load_oauth_config(&dir.path().join("credentials.json")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn test_invalid_credentials_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("credentials.json");
        fs::write(&path, r#"{"other":{}}"#).unwrap();

        let err = load_oauth_config(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }
}
