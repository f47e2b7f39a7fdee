//! Access-token expiry decoding and refresh scheduling arithmetic.
//!
//! The client holds no signing key, so the JWT payload is decoded with
//! signature verification disabled; the only claim consumed is `exp`.
//! Decode failures are surfaced as errors and must never take the session
//! down — callers log and skip scheduling instead.

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation};

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("malformed access token: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
    #[error("access token expiry out of range: {0}")]
    ExpiryOutOfRange(i64),
}

#[derive(Debug, serde::Deserialize)]
struct Claims {
    exp: i64,
}

/// Extract the expiry timestamp embedded in an access token.
pub fn expires_at(access_token: &str) -> Result<DateTime<Utc>, TokenError> {
    let header = jsonwebtoken::decode_header(access_token)?;
    let mut validation = Validation::new(header.alg);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = jsonwebtoken::decode::<Claims>(access_token, &DecodingKey::from_secret(&[]), &validation)?;
    DateTime::from_timestamp(data.claims.exp, 0).ok_or(TokenError::ExpiryOutOfRange(data.claims.exp))
}

/// Delay until the proactive refresh for a token expiring at `expires_at`,
/// counted from `now` with the given lead. `None` when the refresh moment is
/// already in the past (the token expires within the lead, or expired).
#[must_use]
pub fn refresh_delay(expires_at: DateTime<Utc>, now: DateTime<Utc>, lead: Duration) -> Option<Duration> {
    let lead = chrono::Duration::from_std(lead).ok()?;
    let delay = expires_at - now - lead;
    if delay > chrono::Duration::zero() {
        delay.to_std().ok()
    } else {
        None
    }
}

#[cfg(test)]
#[path = "token_test.rs"]
mod tests;
