//! Utility functions for HTTP clients and config paths.

pub mod http;
pub mod paths;
