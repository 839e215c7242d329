//! # gsheet Core
//!
//! OAuth2 loopback authorization and Sheets value retrieval for the gsheet CLI.
//!
//! ```text
//! gsheet-core/src/modules/
//! ├── token_store.rs      # token.json load/save/delete (0600)
//! ├── browser.rs          # best-effort system browser opener
//! ├── callback_server.rs  # one-shot localhost redirect listener
//! ├── oauth.rs            # auth URL, code exchange, refresh
//! ├── authenticator.rs    # cache hit or interactive flow
//! ├── auth_client.rs      # bearer client with silent refresh
//! ├── sheets.rs           # range fetch → JSON lines
//! └── config.rs           # credentials.json → OAuthConfig
//! ```

#![cfg_attr(test, allow(clippy::panic, clippy::print_stdout))]

pub mod error;
pub mod modules;
pub mod utils;

// Re-export commonly used types
pub use error::{AppError, AppResult};
pub use modules::auth_client::AuthenticatedClient;
pub use modules::authenticator::{Authenticator, FlowSettings};
pub use modules::oauth::OAuthConfig;
pub use modules::sheets::SheetsClient;
pub use tokio_util::sync::CancellationToken;
