//! OAuth2 client for the Google authorization-code flow.
//!
//! Protocol details (URL building, token requests, response parsing) are
//! delegated to the `oauth2` crate; the interactive part lives in
//! `authenticator`.

use async_trait::async_trait;
use gsheet_types::{AuthError, ClientSecret, ConfigError, Credential};
use oauth2::basic::{BasicClient, BasicErrorResponse, BasicTokenResponse, BasicTokenType};
use oauth2::{
    AuthType, AuthUrl, AuthorizationCode, ClientId, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, RefreshToken, RequestTokenError, Scope, TokenResponse, TokenUrl,
};
use url::Url;

use crate::error::AppResult;

/// Read-only access to spreadsheets.
pub const SPREADSHEETS_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/spreadsheets.readonly";

/// Client with only the token endpoint configured.
type TokenClient = BasicClient<EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub auth_uri: String,
    pub token_uri: String,
    pub scopes: Vec<String>,
}

impl OAuthConfig {
    pub fn from_client_secret(secret: ClientSecret, scopes: &[&str]) -> Self {
        Self {
            client_id: secret.client_id,
            client_secret: secret.client_secret,
            auth_uri: secret.auth_uri,
            token_uri: secret.token_uri,
            scopes: scopes.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Consent page URL for this client, carrying `state`.
    ///
    /// Offline access with forced consent so the provider issues a refresh token.
    pub fn auth_code_url(&self, redirect_uri: &str, state: &str) -> AppResult<Url> {
        let auth_url = AuthUrl::new(self.auth_uri.clone())
            .map_err(|e| ConfigError::invalid("auth_uri", format!("{}: {}", self.auth_uri, e)))?;
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_auth_uri(auth_url)
            .set_redirect_uri(redirect_url(redirect_uri)?);

        let (url, _) = client
            .authorize_url(|| CsrfToken::new(state.to_string()))
            .add_scopes(self.scopes.iter().cloned().map(Scope::new))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .url();
        Ok(url)
    }

    fn token_client(&self) -> AppResult<TokenClient> {
        let token_url = TokenUrl::new(self.token_uri.clone())
            .map_err(|e| ConfigError::invalid("token_uri", format!("{}: {}", self.token_uri, e)))?;
        Ok(BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(oauth2::ClientSecret::new(self.client_secret.clone()))
            .set_auth_type(AuthType::RequestBody)
            .set_token_uri(token_url))
    }
}

fn redirect_url(redirect_uri: &str) -> Result<RedirectUrl, ConfigError> {
    RedirectUrl::new(redirect_uri.to_string())
        .map_err(|e| ConfigError::invalid("redirect_uri", format!("{}: {}", redirect_uri, e)))
}

/// Fresh single-use correlation token for one authorization request.
pub fn generate_state() -> String {
    CsrfToken::new_random().secret().clone()
}

/// Token endpoint operations.
#[async_trait]
pub trait TokenExchanger: Send + Sync {
    /// Trade an authorization code for a credential.
    ///
    /// `redirect_uri` must be the one embedded in the authorization URL.
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> AppResult<Credential>;

    /// Obtain a new access token from a refresh token.
    async fn refresh(&self, refresh_token: &str) -> AppResult<Credential>;
}

/// `TokenExchanger` backed by the provider's token endpoint.
#[derive(Debug, Clone)]
pub struct GoogleOAuthClient {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl GoogleOAuthClient {
    pub fn new(config: OAuthConfig, http: reqwest::Client) -> Self {
        Self { config, http }
    }
}

#[async_trait]
impl TokenExchanger for GoogleOAuthClient {
    async fn exchange_code(&self, code: &str, redirect_uri: &str) -> AppResult<Credential> {
        tracing::debug!(token_uri = %self.config.token_uri, "Exchanging authorization code");
        let client = self.config.token_client()?.set_redirect_uri(redirect_url(redirect_uri)?);
        let token = client
            .exchange_code(AuthorizationCode::new(code.trim().to_string()))
            .request_async(&self.http)
            .await
            .map_err(describe_token_error)?;
        Ok(into_credential(&token))
    }

    async fn refresh(&self, refresh_token: &str) -> AppResult<Credential> {
        tracing::debug!(token_uri = %self.config.token_uri, "Refreshing access token");
        let token = self
            .config
            .token_client()?
            .exchange_refresh_token(&RefreshToken::new(refresh_token.trim().to_string()))
            .request_async(&self.http)
            .await
            .map_err(describe_token_error)?;
        Ok(into_credential(&token))
    }
}

fn into_credential(token: &BasicTokenResponse) -> Credential {
    let token_type = match token.token_type() {
        BasicTokenType::Bearer => "Bearer".to_string(),
        other => other.as_ref().to_string(),
    };
    Credential::from_expires_in(
        token.access_token().secret().clone(),
        Some(token_type),
        token.refresh_token().map(|t| t.secret().clone()),
        token.expires_in().and_then(|d| i64::try_from(d.as_secs()).ok()),
    )
}

fn describe_token_error<RE: std::error::Error>(
    err: RequestTokenError<RE, BasicErrorResponse>,
) -> AuthError {
    let message = match err {
        RequestTokenError::ServerResponse(resp) => match resp.error_description() {
            Some(desc) => format!("{}: {}", resp.error().as_ref(), desc),
            None => resp.error().as_ref().to_string(),
        },
        RequestTokenError::Request(e) => format!("request failed: {}", e),
        RequestTokenError::Parse(e, body) => {
            let body: String = String::from_utf8_lossy(&body).chars().take(200).collect();
            format!("unexpected response ({}): {}", e, body)
        }
        RequestTokenError::Other(msg) => msg,
    };
    AuthError::TokenExchange { message }
}
