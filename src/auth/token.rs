//! Claim inspection for bearer credentials.
//!
//! The backend issues signed tokens in the standard three-segment form.
//! The client never verifies the signature (it has no key and no reason
//! to); it only decodes the payload segment to read the subject and the
//! expiry instant. Verification is the server's job on every request.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("credential is not a well-formed token")]
    Malformed,
}

/// Claims embedded in a credential's payload segment.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Claims {
    /// Token subject; the backend sets it to the username.
    #[serde(rename = "sub", default)]
    pub subject: Option<String>,
    /// Expiry as epoch seconds.
    #[serde(rename = "exp", default)]
    pub expires_at: Option<i64>,
    /// Issued-at as epoch seconds.
    #[serde(rename = "iat", default)]
    pub issued_at: Option<i64>,
}

impl Claims {
    /// Whether the credential is expired relative to the wall clock.
    ///
    /// A missing expiry claim counts as expired: a token the client cannot
    /// bound in time is never treated as live.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Expiry check against an explicit instant. Expiry is inclusive: a
    /// token whose `exp` equals `now` is already expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expiry) => now.timestamp() >= expiry,
            None => true,
        }
    }
}

/// Decode the claims out of a credential without verifying it.
///
/// Fails with `TokenError::Malformed` whenever the string does not split
/// into exactly three segments or the payload segment is not base64url
/// JSON. Callers treat that as "not logged in", never as a crash.
pub fn decode(credential: &str) -> Result<Claims, TokenError> {
    let mut segments = credential.trim().split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_header), Some(payload), Some(_signature), None) => payload,
        _ => return Err(TokenError::Malformed),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::Malformed)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::Malformed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::token_with_claims;
    use chrono::TimeZone;

    #[test]
    fn decodes_subject_and_expiry() {
        let token = token_with_claims(&serde_json::json!({
            "sub": "maria",
            "iat": 1_700_000_000,
            "exp": 1_700_003_600,
        }));

        let claims = decode(&token).expect("decodable");
        assert_eq!(claims.subject.as_deref(), Some("maria"));
        assert_eq!(claims.expires_at, Some(1_700_003_600));
        assert_eq!(claims.issued_at, Some(1_700_000_000));
    }

    #[test]
    fn rejects_structurally_broken_credentials() {
        assert_eq!(decode(""), Err(TokenError::Malformed));
        assert_eq!(decode("justonesegment"), Err(TokenError::Malformed));
        assert_eq!(decode("two.segments"), Err(TokenError::Malformed));
        assert_eq!(decode("a.b.c.d"), Err(TokenError::Malformed));
        // Payload that is valid base64 but not JSON.
        assert_eq!(decode("head.bm90anNvbg.sig"), Err(TokenError::Malformed));
        // Payload that is not base64 at all.
        assert_eq!(decode("head.%%%.sig"), Err(TokenError::Malformed));
    }

    #[test]
    fn missing_expiry_counts_as_expired() {
        let token = token_with_claims(&serde_json::json!({ "sub": "maria" }));
        let claims = decode(&token).expect("decodable");
        assert!(claims.is_expired());
    }

    #[test]
    fn expiry_comparison_is_inclusive() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = |exp: i64| Claims {
            subject: None,
            expires_at: Some(exp),
            issued_at: None,
        };

        assert!(claims(1_699_999_999).is_expired_at(now));
        assert!(claims(1_700_000_000).is_expired_at(now));
        assert!(!claims(1_700_000_001).is_expired_at(now));
    }
}
