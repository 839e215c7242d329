//! Produces an authenticated client, from cache or via the browser flow.
//!
//! ```text
//! token.json ──hit─────────────────────────────────────────► client
//!     │miss
//!     ▼
//! bind callback ─► print URL ─┬─► wait(code|error|cancel|timeout)
//!                             └─► open browser (background)   │code
//!                                                             ▼
//!                                             exchange ─► save ─► client
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use gsheet_types::AuthError;
use tokio_util::sync::CancellationToken;

use crate::error::AppResult;
use crate::modules::auth_client::AuthenticatedClient;
use crate::modules::browser::{BrowserOpener, SystemBrowser};
use crate::modules::callback_server::{CallbackServer, DEFAULT_CALLBACK_PORT, SHUTDOWN_GRACE};
use crate::modules::oauth::{generate_state, GoogleOAuthClient, OAuthConfig, TokenExchanger};
use crate::modules::token_store::TokenStore;
use crate::utils::paths;

/// Default wait for the user to finish consenting in the browser.
pub const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSettings {
    /// Loopback port; the redirect URI is `http://localhost:<port>/`.
    pub callback_port: u16,
    pub timeout: Duration,
    pub grace: Duration,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self { callback_port: DEFAULT_CALLBACK_PORT, timeout: DEFAULT_AUTH_TIMEOUT, grace: SHUTDOWN_GRACE }
    }
}

pub struct Authenticator {
    config_dir: PathBuf,
    oauth: OAuthConfig,
    http: reqwest::Client,
    store: TokenStore,
    exchanger: Arc<dyn TokenExchanger>,
    browser: Arc<dyn BrowserOpener>,
    settings: FlowSettings,
}

impl Authenticator {
    /// Authenticator using the provider's token endpoint and the system browser.
    pub fn new(config_dir: &Path, oauth: OAuthConfig, http: reqwest::Client) -> Self {
        let exchanger = Arc::new(GoogleOAuthClient::new(oauth.clone(), http.clone()));
        Self {
            config_dir: config_dir.to_path_buf(),
            store: TokenStore::new(paths::token_path(config_dir)),
            oauth,
            http,
            exchanger,
            browser: Arc::new(SystemBrowser),
            settings: FlowSettings::default(),
        }
    }

    pub fn with_exchanger(mut self, exchanger: Arc<dyn TokenExchanger>) -> Self {
        self.exchanger = exchanger;
        self
    }

    pub fn with_browser(mut self, browser: Arc<dyn BrowserOpener>) -> Self {
        self.browser = browser;
        self
    }

    pub fn with_settings(mut self, settings: FlowSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Drop the cached credential so the next `get_client` runs the browser flow.
    pub fn forget_cached(&self) -> AppResult<()> {
        self.store.delete()
    }

    /// Return a client for the cached credential, or run the interactive flow.
    ///
    /// The cached credential is not validated here; refresh happens on first use.
    pub async fn get_client(&self, cancel: &CancellationToken) -> AppResult<AuthenticatedClient> {
        paths::ensure_config_dir(&self.config_dir)?;

        if let Some(credential) = self.store.load() {
            tracing::debug!(path = %self.store.path().display(), "Using cached token");
            return Ok(self.client_for(credential));
        }

        let credential = self.authorize_interactively(cancel).await?;
        self.store.save(&credential)?;
        tracing::info!(path = %self.store.path().display(), "Saved new token");
        Ok(self.client_for(credential))
    }

    async fn authorize_interactively(&self, cancel: &CancellationToken) -> AppResult<gsheet_types::Credential> {
        let state = generate_state();

        // Listen before the browser can redirect.
        let server = CallbackServer::bind(self.settings.callback_port, &state)
            .await?
            .with_grace_period(self.settings.grace);
        let redirect_uri = format!("http://localhost:{}/", server.local_addr().port());
        let auth_url = self.oauth.auth_code_url(&redirect_uri, &state)?;

        // Printed regardless of log level: it is the manual fallback when no browser opens.
        print_authorization_url(&mut std::io::stderr(), auth_url.as_str());

        // The opener runs alongside the wait so a slow or stuck opener
        // cannot delay the callback or an interrupt.
        let browser = Arc::clone(&self.browser);
        let url = auth_url.to_string();
        let opener = tokio::spawn(async move {
            if let Err(e) = browser.open(&url).await {
                tracing::warn!("{}; open the URL above manually to continue", e);
            }
        });

        let waited = server.wait(cancel, self.settings.timeout).await;
        opener.abort();

        let code = waited.inspect_err(|e| {
            if e.as_auth().is_some_and(AuthError::is_callback_failure) {
                tracing::warn!("Browser authorization did not complete; rerun the command to try again");
            }
        })?;
        self.exchanger.exchange_code(&code, &redirect_uri).await
    }

    fn client_for(&self, credential: gsheet_types::Credential) -> AuthenticatedClient {
        AuthenticatedClient::new(self.http.clone(), credential, self.exchanger.clone(), self.store.clone())
    }
}

fn print_authorization_url<W: Write>(out: &mut W, url: &str) {
    if let Err(e) = writeln!(out, "Trying to open your browser pointed to {}", url) {
        tracing::warn!("could not print authorization URL: {}", e);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_url_is_printed_verbatim() {
        let url = "https://accounts.google.com/o/oauth2/auth?client_id=c&state=S";
        let mut out = Vec::new();
        print_authorization_url(&mut out, url);

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(printed, format!("Trying to open your browser pointed to {}\n", url));
    }

    #[test]
    fn test_default_settings() {
        let settings = FlowSettings::default();
        assert_eq!(settings.callback_port, DEFAULT_CALLBACK_PORT);
        assert_eq!(settings.timeout, DEFAULT_AUTH_TIMEOUT);
        assert_eq!(settings.grace, SHUTDOWN_GRACE);
    }
}
