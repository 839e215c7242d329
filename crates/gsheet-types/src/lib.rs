//! # gsheet Types
//!
//! Data model and error definitions for the gsheet CLI.
//!
//! - **`error`** - Typed errors for configuration and the authorization flow
//! - **`models`** - Credential record, client secret file, value ranges
//!
//! ## Architecture Role
//!
//! ```text
//!     gsheet-types (this crate)
//!            │
//!            ▼
//!       gsheet-core
//!            │
//!            ▼
//!       gsheet-cli
//! ```

pub mod error;
pub mod models;

pub use error::{AuthError, ConfigError};
pub use models::{ClientSecret, ClientSecretFile, Credential, ValueRange};
