//! Sheets API value range payloads.

use serde::{Deserialize, Serialize};

/// Response body of `spreadsheets.values.get`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_dimension: Option<String>,
    /// Omitted by the API when the range is empty; re-encodes as `null`.
    #[serde(default)]
    pub values: Option<Vec<Vec<serde_json::Value>>>,
}

/// Google API error envelope: `{"error": {"message", "status"}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_values_encodes_as_null() {
        let vr: ValueRange =
            serde_json::from_str(r#"{"range":"Sheet1!A1:B2","majorDimension":"ROWS"}"#).unwrap();
        assert!(vr.values.is_none());
        assert_eq!(vr.major_dimension.as_deref(), Some("ROWS"));
        assert_eq!(serde_json::to_string(&vr.values).unwrap(), "null");
    }

    #[test]
    fn test_mixed_cells() {
        let vr: ValueRange =
            serde_json::from_str(r#"{"range":"A1:B2","values":[["a",1],[true]]}"#).unwrap();
        let values = vr.values.unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values[0][1], serde_json::json!(1));
    }

    #[test]
    fn test_error_envelope_ignores_numeric_code() {
        let env: ApiErrorEnvelope = serde_json::from_str(
            r#"{"error":{"code":404,"message":"Requested entity was not found.","status":"NOT_FOUND"}}"#,
        )
        .unwrap();
        assert_eq!(env.error.message, "Requested entity was not found.");
        assert_eq!(env.error.status, "NOT_FOUND");
    }
}
