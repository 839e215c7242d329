//! HTTP client carrying a bearer credential with silent refresh.

use std::sync::Arc;

use gsheet_types::Credential;
use tokio::sync::Mutex;
use url::Url;

use crate::error::AppResult;
use crate::modules::oauth::TokenExchanger;
use crate::modules::token_store::TokenStore;
use crate::utils::http::mask_token;

/// Tokens this close to expiry are refreshed before use.
const EXPIRY_DELTA_SECS: i64 = 10;

pub struct AuthenticatedClient {
    http: reqwest::Client,
    credential: Mutex<Credential>,
    exchanger: Arc<dyn TokenExchanger>,
    store: TokenStore,
}

impl AuthenticatedClient {
    /// Wrap a credential. No network I/O happens here.
    pub fn new(
        http: reqwest::Client,
        credential: Credential,
        exchanger: Arc<dyn TokenExchanger>,
        store: TokenStore,
    ) -> Self {
        Self { http, credential: Mutex::new(credential), exchanger, store }
    }

    pub fn token_path(&self) -> &std::path::Path {
        self.store.path()
    }

    /// Snapshot of the credential currently in use.
    pub async fn credential(&self) -> Credential {
        self.credential.lock().await.clone()
    }

    /// `Authorization` header value, refreshing first when the token is about to expire.
    pub async fn authorization_header(&self) -> AppResult<String> {
        let mut current = self.credential.lock().await;
        if !current.expires_within(EXPIRY_DELTA_SECS) {
            return Ok(current.authorization_header());
        }

        if !current.can_refresh() {
            tracing::debug!("Access token expired and no refresh token is stored");
            return Ok(current.authorization_header());
        }

        let refresh_token = current.refresh_token.clone().unwrap_or_default();
        let refreshed = self.exchanger.refresh(&refresh_token).await?;
        let merged = current.clone().merged_with(refreshed);
        self.store.save(&merged)?;
        tracing::info!(token = %mask_token(&merged.access_token), "Refreshed access token");

        *current = merged;
        Ok(current.authorization_header())
    }

    /// Authenticated GET.
    pub async fn get(&self, url: Url) -> AppResult<reqwest::Response> {
        let header = self.authorization_header().await?;
        let response = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, header)
            .send()
            .await?;
        Ok(response)
    }
}
