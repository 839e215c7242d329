//! Authentication flow, credential persistence, and spreadsheet retrieval.

pub mod auth_client;
pub mod authenticator;
pub mod browser;
pub mod callback_server;
pub mod config;
pub mod oauth;
pub mod sheets;
pub mod token_store;
