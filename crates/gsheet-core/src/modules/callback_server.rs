//! One-shot loopback listener for the OAuth redirect.
//!
//! Lifecycle: `bind` starts listening in background tasks, `wait` blocks until
//! the first callback, cancellation or timeout, then stops the listener within
//! the grace period. Every callback on `/` that reaches the handler is
//! terminal; only the first one is delivered.

use std::future::IntoFuture;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Router,
};
use gsheet_types::AuthError;
use serde::Deserialize;
use subtle::ConstantTimeEq;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};

/// Port whitelisted in the OAuth client registration.
pub const DEFAULT_CALLBACK_PORT: u16 = 8097;

/// Upper bound for draining in-flight responses once a terminal state is reached.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// Result of the single honored redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    Code(String),
    Denied(String),
    StateMismatch,
    MissingCode,
}

impl CallbackOutcome {
    pub fn into_code(self) -> Result<String, AuthError> {
        match self {
            CallbackOutcome::Code(code) => Ok(code),
            CallbackOutcome::Denied(reason) => Err(AuthError::AuthorizationDenied { reason }),
            CallbackOutcome::StateMismatch => Err(AuthError::StateMismatch),
            CallbackOutcome::MissingCode => Err(AuthError::MissingCode),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            CallbackOutcome::Code(_) => "code",
            CallbackOutcome::Denied(_) => "denied",
            CallbackOutcome::StateMismatch => "state_mismatch",
            CallbackOutcome::MissingCode => "missing_code",
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Map a redirect's query to its outcome. State is checked before anything else.
pub fn classify(query: &CallbackQuery, expected_state: &str) -> CallbackOutcome {
    let state_ok = query
        .state
        .as_deref()
        .is_some_and(|s| bool::from(s.as_bytes().ct_eq(expected_state.as_bytes())));
    if !state_ok {
        return CallbackOutcome::StateMismatch;
    }

    if let Some(error) = query.error.as_deref().filter(|e| !e.is_empty()) {
        let reason = match query.error_description.as_deref() {
            Some(desc) if !desc.is_empty() => format!("{}: {}", error, desc),
            _ => error.to_string(),
        };
        return CallbackOutcome::Denied(reason);
    }

    match query.code.as_deref() {
        Some(code) if !code.is_empty() => CallbackOutcome::Code(code.to_string()),
        _ => CallbackOutcome::MissingCode,
    }
}

#[derive(Clone)]
struct CallbackState {
    expected_state: Arc<str>,
    outcome_tx: mpsc::Sender<CallbackOutcome>,
}

pub struct CallbackServer {
    local_addr: SocketAddr,
    outcome_rx: mpsc::Receiver<CallbackOutcome>,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<std::io::Result<()>>>,
    grace: Duration,
}

impl CallbackServer {
    /// Bind `127.0.0.1:<port>` (required) and `[::1]:<port>` (best effort) and start serving.
    ///
    /// Port 0 picks an ephemeral port; `local_addr` reports the real one.
    pub async fn bind(port: u16, expected_state: &str) -> AppResult<Self> {
        let v4_addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
        let v4 = TcpListener::bind(v4_addr)
            .await
            .map_err(|source| AppError::CallbackBind { addr: v4_addr, source })?;
        let local_addr = v4.local_addr()?;

        let v6_addr = SocketAddr::from((Ipv6Addr::LOCALHOST, local_addr.port()));
        let v6 = match TcpListener::bind(v6_addr).await {
            Ok(listener) => Some(listener),
            Err(e) => {
                tracing::debug!(addr = %v6_addr, "IPv6 loopback unavailable: {}", e);
                None
            }
        };

        // Capacity one: the first terminal callback is buffered, later ones are refused.
        let (outcome_tx, outcome_rx) = mpsc::channel(1);
        let state = CallbackState { expected_state: Arc::from(expected_state), outcome_tx };
        let app = Router::new().route("/", get(handle_callback)).with_state(state);
        let shutdown = CancellationToken::new();

        let tasks = std::iter::once(v4)
            .chain(v6)
            .map(|listener| {
                let serve = axum::serve(listener, app.clone())
                    .with_graceful_shutdown(shutdown.clone().cancelled_owned());
                tokio::spawn(serve.into_future())
            })
            .collect();

        tracing::info!("Waiting for the OAuth callback on http://localhost:{}/", local_addr.port());

        Ok(Self { local_addr, outcome_rx, shutdown, tasks, grace: SHUTDOWN_GRACE })
    }

    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace = grace;
        self
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Block until a terminal state, then stop the listener.
    ///
    /// Returns the authorization code, or the reason the flow ended without one.
    pub async fn wait(mut self, cancel: &CancellationToken, timeout: Duration) -> AppResult<String> {
        let result: AppResult<String> = tokio::select! {
            received = self.outcome_rx.recv() => match received {
                Some(outcome) => {
                    tracing::debug!(outcome = outcome.label(), "OAuth callback received");
                    outcome.into_code().map_err(AppError::from)
                }
                None => Err(AuthError::Cancelled.into()),
            },
            () = cancel.cancelled() => {
                tracing::info!("Authorization interrupted, stopping callback server");
                Err(AuthError::Cancelled.into())
            }
            () = tokio::time::sleep(timeout) => Err(AuthError::Timeout { secs: timeout.as_secs() }.into()),
        };

        self.stop().await;
        result
    }

    async fn stop(&mut self) {
        self.outcome_rx.close();
        self.shutdown.cancel();

        let tasks = std::mem::take(&mut self.tasks);
        let aborts: Vec<_> = tasks.iter().map(JoinHandle::abort_handle).collect();

        match tokio::time::timeout(self.grace, futures::future::join_all(tasks)).await {
            Ok(results) => {
                for result in results {
                    match result {
                        Ok(Ok(())) => {}
                        Ok(Err(e)) => tracing::warn!("Callback server exited with error: {}", e),
                        Err(e) => tracing::debug!("Callback server task ended abnormally: {}", e),
                    }
                }
            }
            Err(_) => {
                tracing::warn!("Callback server did not drain within {:?}, aborting", self.grace);
                for abort in aborts {
                    abort.abort();
                }
            }
        }
        tracing::debug!(addr = %self.local_addr, "Callback server stopped");
    }
}

impl Drop for CallbackServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_callback(
    State(state): State<CallbackState>,
    Query(query): Query<CallbackQuery>,
) -> (StatusCode, Html<String>) {
    let outcome = classify(&query, &state.expected_state);
    let (status, page) = render(&outcome);

    if state.outcome_tx.try_send(outcome).is_err() {
        return (
            StatusCode::CONFLICT,
            Html(page_html(
                "Already Handled",
                "This authorization request has already been completed. You can close this window.",
            )),
        );
    }
    (status, Html(page))
}

fn render(outcome: &CallbackOutcome) -> (StatusCode, String) {
    match outcome {
        CallbackOutcome::Code(_) => (
            StatusCode::OK,
            page_html("Authorization Successful", "You can close this window now."),
        ),
        CallbackOutcome::StateMismatch => (
            StatusCode::BAD_REQUEST,
            page_html("Invalid State", "invalid state, please retry"),
        ),
        CallbackOutcome::Denied(reason) => (
            StatusCode::BAD_REQUEST,
            page_html(
                "Authorization Failed",
                &format!("Error: {}. Please close this window and retry.", escape_html(reason)),
            ),
        ),
        CallbackOutcome::MissingCode => (
            StatusCode::BAD_REQUEST,
            page_html("Missing Authorization Code", "No authorization code received, please retry."),
        ),
    }
}

fn page_html(title: &str, message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>{title}</title></head>
<body style="font-family: sans-serif; text-align: center; padding: 50px;">
    <h1>{title}</h1>
    <p>{message}</p>
</body>
</html>"#
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
