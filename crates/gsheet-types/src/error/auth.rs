//! Interactive authorization flow errors.

use thiserror::Error;

/// Terminal failures of a single authorization attempt.
///
/// None of these are retried; the user re-runs the command.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Callback `state` did not match the token generated for this flow
    #[error("invalid state in authorization callback")]
    StateMismatch,

    /// Provider redirected back with an `error` parameter
    #[error("authorization denied: {reason}")]
    AuthorizationDenied {
        /// Value of the `error` query parameter
        reason: String,
    },

    /// Callback carried a matching state but no code
    #[error("authorization callback did not include a code")]
    MissingCode,

    /// Flow interrupted before a callback arrived
    #[error("authorization cancelled")]
    Cancelled,

    /// No callback arrived within the listening window
    #[error("timed out after {secs}s waiting for the authorization callback")]
    Timeout {
        /// Length of the listening window in seconds
        secs: u64,
    },

    /// Token endpoint rejected the exchange or refresh
    #[error("token endpoint error: {message}")]
    TokenExchange {
        /// Provider error code and description, or the transport failure
        message: String,
    },

    /// No known browser opener on the search path
    #[error("could not find a way to open a browser")]
    NoBrowserOpener,
}

impl AuthError {
    /// Whether the failure originated from the local redirect rather than the provider's token endpoint.
    pub fn is_callback_failure(&self) -> bool {
        matches!(
            self,
            Self::StateMismatch
                | Self::AuthorizationDenied { .. }
                | Self::MissingCode
                | Self::Cancelled
                | Self::Timeout { .. }
        )
    }
}
