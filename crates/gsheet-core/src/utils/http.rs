//! HTTP client utilities.

use reqwest::Client;
use std::time::Duration;

/// Default request timeout for token and Sheets API calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Create HTTP client with the given timeout.
pub fn create_client(timeout_secs: u64) -> Result<Client, reqwest::Error> {
    base_builder(timeout_secs).build()
}

/// Shared builder for token and Sheets API calls.
fn base_builder(timeout_secs: u64) -> reqwest::ClientBuilder {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .tcp_nodelay(true)
        // Token endpoints must not redirect the authorization code elsewhere.
        .redirect(reqwest::redirect::Policy::none())
        .user_agent(concat!("gsheet/", env!("CARGO_PKG_VERSION")))
}

/// Render a bearer credential for logs: first and last four characters only.
pub fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token("short"), "*****");
        assert_eq!(mask_token("ya29.a0AfH6SMBxxxxxxxxxxQ1w"), "ya29...xQ1w");
    }
}
