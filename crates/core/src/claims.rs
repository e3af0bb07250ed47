//! Unverified JWT claim inspection for client-side session gating.
//!
//! The client never verifies token signatures; the server is the trust
//! boundary and will reject a forged or expired token on the first
//! authenticated request. What the client needs is an instantaneous,
//! network-free answer to "does this credential look usable?" so it
//! can gate views before first paint. [`decode_claims`] base64url-
//! decodes the middle JWT segment as JSON and nothing more.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Claims the client cares about. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Claims {
    /// Subject -- the user identifier.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// User email, when the issuer includes it.
    #[serde(default)]
    pub email: Option<String>,
}

/// Decode the payload segment of a JWT without verifying anything.
///
/// Returns `None` on any structural problem: wrong segment count,
/// invalid base64url, non-JSON payload, or a payload missing the
/// required `sub`/`exp` fields.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let mut segments = token.split('.');
    let _header = segments.next()?;
    let payload = segments.next()?;
    // A JWT has exactly three segments.
    segments.next()?;
    if segments.next().is_some() {
        return None;
    }

    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Whether a credential is valid at `now`.
///
/// Valid means: decodable per [`decode_claims`] and strictly
/// unexpired. The boundary `exp == now` counts as expired.
pub fn is_valid_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_claims(token) {
        Some(claims) => claims.exp > now.timestamp(),
        None => false,
    }
}

/// Whether a credential is valid right now.
pub fn is_valid(token: &str) -> bool {
    is_valid_at(token, Utc::now())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
