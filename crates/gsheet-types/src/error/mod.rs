//! Typed error definitions for gsheet.
//!
//! Errors here are plain data so they can be matched on in tests and
//! carried inside the core crate's `AppError` without losing detail.

mod auth;
mod config;

pub use auth::AuthError;
pub use config::ConfigError;
