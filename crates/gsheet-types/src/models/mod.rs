//! Data models shared between the core crate and the CLI.

mod client_secret;
mod credential;
mod value_range;

pub use client_secret::{ClientSecret, ClientSecretFile};
pub use credential::Credential;
pub use value_range::{ApiErrorBody, ApiErrorEnvelope, ValueRange};
