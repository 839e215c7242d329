//! Spreadsheet range retrieval, streamed as JSON lines.

use std::io::Write;

use gsheet_types::models::ApiErrorEnvelope;
use gsheet_types::{ConfigError, ValueRange};
use url::Url;

use crate::error::{AppError, AppResult};
use crate::modules::auth_client::AuthenticatedClient;

pub const DEFAULT_SHEETS_BASE_URL: &str = "https://sheets.googleapis.com";

pub struct SheetsClient {
    auth: AuthenticatedClient,
    base_url: Url,
}

impl SheetsClient {
    pub fn new(auth: AuthenticatedClient) -> AppResult<Self> {
        let base_url = Url::parse(DEFAULT_SHEETS_BASE_URL)
            .map_err(|e| ConfigError::invalid("sheets_base_url", e.to_string()))?;
        Ok(Self { auth, base_url })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// `GET /v4/spreadsheets/{id}/values/{range}`.
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> AppResult<ValueRange> {
        let url = self.values_url(spreadsheet_id, range)?;
        let response = self.auth.get(url).await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Api { status: status.as_u16(), message: api_error_message(&body) });
        }

        Ok(response.json::<ValueRange>().await?)
    }

    /// Fetch each range in order and write its value matrix as one JSON line.
    ///
    /// Stops at the first failure; lines already written stay written.
    pub async fn fetch_ranges<W: Write>(
        &self,
        spreadsheet_id: &str,
        ranges: &[String],
        out: &mut W,
    ) -> AppResult<usize> {
        let mut written = 0;
        for range in ranges {
            tracing::debug!(spreadsheet_id, range = %range, "Fetching range");
            let value_range = self.get_values(spreadsheet_id, range).await?;

            serde_json::to_writer(&mut *out, &value_range.values)?;
            out.write_all(b"\n")?;
            out.flush()?;
            written += 1;
        }
        Ok(written)
    }

    fn values_url(&self, spreadsheet_id: &str, range: &str) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ConfigError::invalid("sheets_base_url", "cannot be a base URL"))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", range]);
        Ok(url)
    }
}

fn api_error_message(body: &str) -> String {
    match serde_json::from_str::<ApiErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => {
            if envelope.error.status.is_empty() {
                envelope.error.message
            } else {
                format!("{} ({})", envelope.error.message, envelope.error.status)
            }
        }
        _ => body.chars().take(200).collect(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_message() {
        let body = r#"{"error":{"code":400,"message":"Unable to parse range: BAD!","status":"INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "Unable to parse range: BAD! (INVALID_ARGUMENT)");
        assert_eq!(api_error_message("oops"), "oops");
    }
}
