//! Slack request signature verification
//!
//! Slack signs every Events API request with HMAC-SHA256 over
//! `v0:{timestamp}:{body}` using the app's signing secret and sends the
//! result as `X-Slack-Signature: v0=<hex>`.

use axum::http::HeaderMap;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-slack-signature";
pub const TIMESTAMP_HEADER: &str = "x-slack-request-timestamp";

/// Slack signature version prefix
pub const SIGNATURE_VERSION: &str = "v0";

/// Maximum allowed clock skew for request timestamps (5 minutes)
pub const MAX_TIMESTAMP_SKEW_SECS: i64 = 300;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("missing X-Slack-Request-Timestamp header")]
    MissingTimestamp,

    #[error("invalid X-Slack-Request-Timestamp header: {0}")]
    InvalidTimestamp(String),

    #[error("failed to initialise verifier: {0}")]
    Mac(String),

    #[error("request timestamp is outside the allowed window")]
    ExpiredTimestamp,

    #[error("signature mismatch")]
    Mismatch,
}

/// Incremental verifier for one request
///
/// Built from the request headers, fed the raw body with [`update`](Self::update)
/// and checked with [`ensure`](Self::ensure).
pub struct SecretsVerifier {
    mac: HmacSha256,
    signature: Option<String>,
    timestamp: i64,
    now: i64,
}

impl SecretsVerifier {
    /// Create a verifier checked against the current time
    pub fn new(headers: &HeaderMap, signing_secret: &str) -> Result<Self, VerifyError> {
        Self::new_at(headers, signing_secret, chrono::Utc::now().timestamp())
    }

    /// Create a verifier checked against `now` (unix seconds)
    pub fn new_at(headers: &HeaderMap, signing_secret: &str, now: i64) -> Result<Self, VerifyError> {
        let raw = headers
            .get(TIMESTAMP_HEADER)
            .ok_or(VerifyError::MissingTimestamp)?
            .to_str()
            .map_err(|e| VerifyError::InvalidTimestamp(e.to_string()))?;
        let timestamp: i64 = raw
            .trim()
            .parse()
            .map_err(|_| VerifyError::InvalidTimestamp(raw.to_string()))?;

        // A missing signature only fails at `ensure`, like a wrong one
        let signature = headers
            .get(SIGNATURE_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
            .map_err(|e| VerifyError::Mac(e.to_string()))?;
        mac.update(format!("{}:{}:", SIGNATURE_VERSION, timestamp).as_bytes());

        Ok(Self {
            mac,
            signature,
            timestamp,
            now,
        })
    }

    /// Feed request body bytes
    pub fn update(&mut self, body: &[u8]) {
        self.mac.update(body);
    }

    /// Check timestamp freshness and compare signatures in constant time
    pub fn ensure(self) -> Result<(), VerifyError> {
        if self.now.abs_diff(self.timestamp) > MAX_TIMESTAMP_SKEW_SECS.unsigned_abs() {
            return Err(VerifyError::ExpiredTimestamp);
        }

        let provided = self
            .signature
            .as_deref()
            .and_then(|s| s.strip_prefix("v0="))
            .and_then(|hex_sig| hex::decode(hex_sig).ok())
            .ok_or(VerifyError::Mismatch)?;

        self.mac
            .verify_slice(&provided)
            .map_err(|_| VerifyError::Mismatch)
    }
}

/// Compute the `X-Slack-Signature` value for a body
pub fn compute_signature(
    signing_secret: &str,
    timestamp: i64,
    body: &[u8],
) -> Result<String, VerifyError> {
    let mut mac = HmacSha256::new_from_slice(signing_secret.as_bytes())
        .map_err(|e| VerifyError::Mac(e.to_string()))?;
    mac.update(format!("{}:{}:", SIGNATURE_VERSION, timestamp).as_bytes());
    mac.update(body);
    Ok(format!(
        "{}={}",
        SIGNATURE_VERSION,
        hex::encode(mac.finalize().into_bytes())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "8f742231b10e8888abcd99yyyzzz85a5";
    const NOW: i64 = 1_531_420_618;

    fn headers(timestamp: Option<&str>, signature: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(ts) = timestamp {
            headers.insert(TIMESTAMP_HEADER, ts.parse().unwrap());
        }
        if let Some(sig) = signature {
            headers.insert(SIGNATURE_HEADER, sig.parse().unwrap());
        }
        headers
    }

    fn verify(headers: &HeaderMap, body: &[u8], now: i64) -> Result<(), VerifyError> {
        let mut verifier = SecretsVerifier::new_at(headers, SECRET, now)?;
        verifier.update(body);
        verifier.ensure()
    }

    #[test]
    fn test_valid_signature() {
        let body = br#"{"type":"url_verification","challenge":"abc"}"#;
        let sig = compute_signature(SECRET, NOW, body).unwrap();
        let headers = headers(Some(&NOW.to_string()), Some(&sig));

        assert!(verify(&headers, body, NOW).is_ok());
    }

    #[test]
    fn test_known_slack_vector() {
        // Example request from Slack's signing documentation
        let body = b"token=xyzz0WbapA4vBCDEFasx0q6G&team_id=T1DC2JH3J&team_domain=testteamnow&channel_id=G8PSS9T3V&channel_name=foobar&user_id=U2CERLKJA&user_name=roadrunner&command=%2Fwebhook-collect&text=&response_url=https%3A%2F%2Fhooks.slack.com%2Fcommands%2FT1DC2JH3J%2F397700885554%2F96rGlfmibIGlgcZRskXaIFfN&trigger_id=398738663015.47445629121.803a0bc887a14d10d2c447fce8b6703c";
        assert_eq!(
            compute_signature(SECRET, NOW, body).unwrap(),
            "v0=a2114d57b48eac39b9ad189dd8316235a7b4a8d21a10bd27519666489c69b503"
        );
    }

    #[test]
    fn test_tampered_body_fails() {
        let sig = compute_signature(SECRET, NOW, br#"{"challenge":"abc"}"#).unwrap();
        let headers = headers(Some(&NOW.to_string()), Some(&sig));

        let result = verify(&headers, br#"{"challenge":"evil"}"#, NOW);
        assert!(matches!(result, Err(VerifyError::Mismatch)));
    }

    #[test]
    fn test_wrong_secret_fails() {
        let body = b"{}";
        let sig = compute_signature("other-secret", NOW, body).unwrap();
        let headers = headers(Some(&NOW.to_string()), Some(&sig));

        assert!(matches!(verify(&headers, body, NOW), Err(VerifyError::Mismatch)));
    }

    #[test]
    fn test_missing_signature_fails() {
        let headers = headers(Some(&NOW.to_string()), None);
        assert!(matches!(verify(&headers, b"{}", NOW), Err(VerifyError::Mismatch)));
    }

    #[test]
    fn test_malformed_signature_fails() {
        for sig in ["deadbeef", "v0=not-hex", "v1=abcd", "v0="] {
            let headers = headers(Some(&NOW.to_string()), Some(sig));
            assert!(
                matches!(verify(&headers, b"{}", NOW), Err(VerifyError::Mismatch)),
                "signature {sig:?} should not verify"
            );
        }
    }

    #[test]
    fn test_missing_timestamp() {
        let headers = headers(None, Some("v0=abcd"));
        assert!(matches!(
            SecretsVerifier::new_at(&headers, SECRET, NOW),
            Err(VerifyError::MissingTimestamp)
        ));
    }

    #[test]
    fn test_invalid_timestamp() {
        let headers = headers(Some("yesterday"), Some("v0=abcd"));
        assert!(matches!(
            SecretsVerifier::new_at(&headers, SECRET, NOW),
            Err(VerifyError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_stale_timestamp_fails() {
        let body = b"{}";
        let old = NOW - MAX_TIMESTAMP_SKEW_SECS - 1;
        let sig = compute_signature(SECRET, old, body).unwrap();
        let headers = headers(Some(&old.to_string()), Some(&sig));

        assert!(matches!(verify(&headers, body, NOW), Err(VerifyError::ExpiredTimestamp)));
    }

    #[test]
    fn test_timestamp_at_window_edge_passes() {
        let body = b"{}";
        let edge = NOW + MAX_TIMESTAMP_SKEW_SECS;
        let sig = compute_signature(SECRET, edge, body).unwrap();
        let headers = headers(Some(&edge.to_string()), Some(&sig));

        assert!(verify(&headers, body, NOW).is_ok());
    }

    #[test]
    fn test_extreme_timestamps_are_expired() {
        for ts in [i64::MIN, i64::MAX] {
            let headers = headers(Some(&ts.to_string()), Some("v0=abcd"));
            assert!(
                matches!(verify(&headers, b"{}", NOW), Err(VerifyError::ExpiredTimestamp)),
                "timestamp {ts} should be rejected"
            );
        }
    }
}
