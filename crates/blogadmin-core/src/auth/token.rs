//! Credential expiry decoding.
//!
//! Credentials issued by the backend are JWTs. Only the `exp` claim of the
//! payload segment is read here; the signature is never checked locally.
//! The backend accepts or rejects the credential on every request.

use base64::{
    engine::general_purpose::{URL_SAFE, URL_SAFE_NO_PAD},
    Engine,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TokenError {
    #[error("Credential is not a three-part token")]
    Malformed,

    #[error("Credential payload is not valid base64url")]
    Encoding,

    #[error("Credential payload is not valid JSON: {0}")]
    Payload(String),

    #[error("Credential has no usable expiry claim")]
    MissingExpiry,
}

#[derive(Debug, Deserialize)]
struct Claims {
    exp: Option<serde_json::Number>,
}

/// Extract the expiry instant encoded in a credential.
pub fn expires_at(credential: &str) -> Result<DateTime<Utc>, TokenError> {
    let mut parts = credential.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(TokenError::Malformed);
    };

    if payload.is_empty() {
        return Err(TokenError::Malformed);
    }

    // Some issuers keep the `=` padding even though the JWT encoding drops it
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .or_else(|_| URL_SAFE.decode(payload))
        .map_err(|_| TokenError::Encoding)?;

    let claims: Claims =
        serde_json::from_slice(&bytes).map_err(|e| TokenError::Payload(e.to_string()))?;

    let exp = claims.exp.ok_or(TokenError::MissingExpiry)?;
    let seconds = exp
        .as_i64()
        .or_else(|| exp.as_f64().map(|f| f.floor() as i64))
        .ok_or(TokenError::MissingExpiry)?;

    DateTime::from_timestamp(seconds, 0).ok_or(TokenError::MissingExpiry)
}

/// Check whether a credential is expired at `now`.
///
/// Anything that cannot be decoded counts as expired.
pub fn is_expired(credential: &str, now: DateTime<Utc>) -> bool {
    match expires_at(credential) {
        Ok(expiry) => now >= expiry,
        Err(e) => {
            tracing::debug!(error = %e, "Treating undecodable credential as expired");
            true
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

/// Build an unsigned credential with the given payload JSON.
#[cfg(test)]
pub(crate) fn encode_for_test(payload: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(payload.to_string());
    format!("{}.{}.c2lnbmF0dXJl", header, body)
}

/// Build a credential that expires `offset_secs` from now.
#[cfg(test)]
pub(crate) fn credential_expiring_in(offset_secs: i64) -> String {
    let exp = Utc::now().timestamp() + offset_secs;
    encode_for_test(&serde_json::json!({ "sub": 1, "exp": exp }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_expires_at_reads_exp_claim() {
        let token = encode_for_test(&serde_json::json!({ "id": 7, "exp": 1_700_000_000 }));
        let expiry = expires_at(&token).unwrap();
        assert_eq!(expiry.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_expires_at_accepts_padded_payload() {
        let header = URL_SAFE_NO_PAD.encode(b"{}");
        // 25 bytes, so the padded encoding ends in `==`
        let body = URL_SAFE.encode(br#"{"exp":1700000000,"a":12}"#);
        assert!(body.ends_with("=="));
        assert!(URL_SAFE_NO_PAD.decode(&body).is_err());
        let token = format!("{}.{}.sig", header, body);
        assert_eq!(expires_at(&token).unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_expires_at_fractional_exp() {
        let token = encode_for_test(&serde_json::json!({ "exp": 1_700_000_000.75 }));
        assert_eq!(expires_at(&token).unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_expires_at_malformed() {
        assert_eq!(expires_at(""), Err(TokenError::Malformed));
        assert_eq!(expires_at("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(expires_at("a.b"), Err(TokenError::Malformed));
        assert_eq!(expires_at("a.b.c.d"), Err(TokenError::Malformed));
        assert_eq!(expires_at("a..c"), Err(TokenError::Malformed));
        assert_eq!(expires_at("a.!!!.c"), Err(TokenError::Encoding));
    }

    #[test]
    fn test_expires_at_bad_payload() {
        let body = URL_SAFE_NO_PAD.encode(b"not json");
        let token = format!("h.{}.s", body);
        assert!(matches!(expires_at(&token), Err(TokenError::Payload(_))));
    }

    #[test]
    fn test_expires_at_missing_or_invalid_exp() {
        let no_exp = encode_for_test(&serde_json::json!({ "sub": 1 }));
        assert_eq!(expires_at(&no_exp), Err(TokenError::MissingExpiry));

        let string_exp = encode_for_test(&serde_json::json!({ "exp": "tomorrow" }));
        assert!(matches!(expires_at(&string_exp), Err(TokenError::Payload(_))));
    }

    #[test]
    fn test_is_expired_boundaries() {
        let token = encode_for_test(&serde_json::json!({ "exp": 1_700_000_000 }));
        let expiry = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        assert!(!is_expired(&token, expiry - Duration::seconds(1)));
        // Expiry instant itself counts as expired
        assert!(is_expired(&token, expiry));
        assert!(is_expired(&token, expiry + Duration::seconds(1)));
    }

    #[test]
    fn test_is_expired_treats_garbage_as_expired() {
        let now = Utc::now();
        assert!(is_expired("", now));
        assert!(is_expired("garbage", now));
        assert!(is_expired("x.y.z", now));
    }

    #[test]
    fn test_credential_helpers() {
        assert!(!is_expired(&credential_expiring_in(3600), Utc::now()));
        assert!(is_expired(&credential_expiring_in(-60), Utc::now()));
    }
}
