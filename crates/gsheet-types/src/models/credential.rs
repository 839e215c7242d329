//! Credential record persisted between invocations.

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};

/// OAuth token set, in the canonical `{access_token, token_type, refresh_token, expiry}` shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credential {
    /// OAuth access token
    pub access_token: String,
    /// Token type (usually "Bearer")
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub token_type: String,
    /// OAuth refresh token for renewing access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Absolute expiry instant, RFC 3339 on disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

impl Credential {
    /// Build a credential from a token endpoint response.
    ///
    /// A lifetime too large to represent is stored as "no expiry".
    pub fn from_expires_in(
        access_token: String,
        token_type: Option<String>,
        refresh_token: Option<String>,
        expires_in: Option<i64>,
    ) -> Self {
        let expiry = expires_in
            .filter(|secs| *secs > 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime));
        Self {
            access_token,
            token_type: token_type.unwrap_or_else(|| "Bearer".to_string()),
            refresh_token: refresh_token.filter(|t| !t.is_empty()),
            expiry,
        }
    }

    /// Expiry ignoring the zero-time placeholder some writers emit for "never".
    pub fn effective_expiry(&self) -> Option<DateTime<Utc>> {
        self.expiry.filter(|e| e.year() > 1)
    }

    /// Check if the token is expired.
    pub fn is_expired(&self) -> bool {
        self.expires_within(0)
    }

    /// Check if the token will expire within the given seconds.
    pub fn expires_within(&self, seconds: i64) -> bool {
        match self.effective_expiry() {
            Some(expiry) => Duration::try_seconds(seconds)
                .and_then(|window| Utc::now().checked_add_signed(window))
                .map_or(true, |deadline| deadline >= expiry),
            None => false,
        }
    }

    /// Whether a silent refresh is possible.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Value for the `Authorization` header.
    pub fn authorization_header(&self) -> String {
        let kind = match self.token_type.as_str() {
            "" => "Bearer",
            t if t.eq_ignore_ascii_case("bearer") => "Bearer",
            t => t,
        };
        format!("{} {}", kind, self.access_token)
    }

    /// Merge a refreshed credential, keeping the old refresh token if the provider did not rotate it.
    pub fn merged_with(self, refreshed: Credential) -> Credential {
        Credential {
            refresh_token: refreshed.refresh_token.or(self.refresh_token),
            ..refreshed
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_unrepresentable_lifetime_means_no_expiry() {
        let token = Credential::from_expires_in("a".into(), None, None, Some(10_000_000_000_000));
        assert!(token.expiry.is_none());
        assert!(!token.is_expired());

        let token = Credential::from_expires_in("a".into(), None, None, Some(i64::MAX));
        assert!(token.expiry.is_none());
    }

    #[test]
    fn test_token_expiry_check() {
        let token = Credential::from_expires_in(
            "access".to_string(),
            None,
            Some("refresh".to_string()),
            Some(3600),
        );

        assert!(!token.is_expired());
        assert!(token.expires_within(3601));
        assert!(!token.expires_within(3599));
        assert!(token.expires_within(i64::MAX));
        assert_eq!(token.token_type, "Bearer");
    }

    #[test]
    fn test_zero_time_expiry_never_expires() {
        let json = r#"{"access_token":"a","token_type":"Bearer","expiry":"0001-01-01T00:00:00Z"}"#;
        let token: Credential = serde_json::from_str(json).unwrap();

        assert!(token.expiry.is_some());
        assert!(token.effective_expiry().is_none());
        assert!(!token.is_expired());
    }

    #[test]
    fn test_serialized_shape() {
        let token = Credential {
            access_token: "ya29.abc".to_string(),
            token_type: "Bearer".to_string(),
            refresh_token: None,
            expiry: Some("2030-01-02T03:04:05Z".parse().unwrap()),
        };

        let value = serde_json::to_value(&token).unwrap();
        assert_eq!(value["access_token"], "ya29.abc");
        assert_eq!(value["token_type"], "Bearer");
        assert_eq!(value["expiry"], "2030-01-02T03:04:05Z");
        assert!(value.get("refresh_token").is_none());
    }

    #[test]
    fn test_merge_keeps_refresh_token() {
        let old = Credential::from_expires_in("old".into(), None, Some("r1".into()), Some(10));
        let new = Credential::from_expires_in("new".into(), None, None, Some(3600));

        let merged = old.merged_with(new);
        assert_eq!(merged.access_token, "new");
        assert_eq!(merged.refresh_token.as_deref(), Some("r1"));
    }

    #[test]
    fn test_authorization_header() {
        let mut token = Credential::from_expires_in("abc".into(), Some("bearer".into()), None, None);
        assert_eq!(token.authorization_header(), "Bearer abc");
        token.token_type = String::new();
        assert_eq!(token.authorization_header(), "Bearer abc");
    }
}
