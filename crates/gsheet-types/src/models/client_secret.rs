//! Google OAuth client secret file (`credentials.json`).

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level document downloaded from the cloud console.
///
/// Desktop clients nest their fields under `installed`, web clients under `web`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientSecretFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed: Option<ClientSecret>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web: Option<ClientSecret>,
}

/// OAuth client registration details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientSecret {
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub redirect_uris: Vec<String>,
}

fn default_auth_uri() -> String {
    "https://accounts.google.com/o/oauth2/auth".to_string()
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ClientSecretFile {
    /// Parse and validate a client secret document.
    pub fn from_json(bytes: &[u8]) -> Result<ClientSecret, ConfigError> {
        let file: ClientSecretFile =
            serde_json::from_slice(bytes).map_err(|e| ConfigError::from_json_error(&e))?;
        file.into_secret()
    }

    /// Pick the `installed` registration, falling back to `web`.
    pub fn into_secret(self) -> Result<ClientSecret, ConfigError> {
        let secret = self.installed.or(self.web).ok_or_else(|| {
            ConfigError::invalid("installed", "credentials file has neither `installed` nor `web`")
        })?;

        if secret.client_id.trim().is_empty() {
            return Err(ConfigError::invalid("client_id", "must not be empty"));
        }
        if secret.token_uri.trim().is_empty() {
            return Err(ConfigError::invalid("token_uri", "must not be empty"));
        }
        Ok(secret)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_installed_client() {
        let json = br#"{"installed":{"client_id":"id.apps.googleusercontent.com","client_secret":"s","redirect_uris":["http://localhost"]}}"#;
        let secret = ClientSecretFile::from_json(json).unwrap();

        assert_eq!(secret.client_id, "id.apps.googleusercontent.com");
        assert_eq!(secret.token_uri, "https://oauth2.googleapis.com/token");
        assert_eq!(secret.redirect_uris, vec!["http://localhost".to_string()]);
    }

    #[test]
    fn test_web_client_fallback() {
        let json = br#"{"web":{"client_id":"w","client_secret":"s","auth_uri":"https://a","token_uri":"https://t"}}"#;
        let secret = ClientSecretFile::from_json(json).unwrap();

        assert_eq!(secret.client_id, "w");
        assert_eq!(secret.auth_uri, "https://a");
    }

    #[test]
    fn test_missing_registration() {
        let err = ClientSecretFile::from_json(b"{}").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { ref field, .. } if field == "installed"));
    }

    #[test]
    fn test_malformed_json() {
        let err = ClientSecretFile::from_json(b"not json").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
