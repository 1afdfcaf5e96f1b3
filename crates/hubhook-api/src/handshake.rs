//! Subscription handshake verification.
//!
//! Before the platform delivers events to a callback URL, it sends a
//! one-time GET with `hub.mode`, `hub.verify_token`, and `hub.challenge`
//! query parameters. Proving ownership means echoing the challenge back
//! only when the mode is `subscribe` and the token matches the
//! configured secret. The exchange is idempotent and has no side
//! effects.

use serde::Deserialize;
use thiserror::Error;

/// Mode value a subscriber must present.
const SUBSCRIBE_MODE: &str = "subscribe";

/// Query parameters of a subscription handshake request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandshakeQuery {
    /// `hub.mode` parameter; must be `subscribe`.
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    /// `hub.verify_token` parameter; must equal the configured token.
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    /// `hub.challenge` parameter; echoed verbatim on success.
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

/// Handshake verification errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeError {
    /// `hub.mode` or `hub.verify_token` was absent.
    #[error("missing hub.mode or hub.verify_token parameter")]
    MissingParameters,
    /// Mode or token did not match; the response never says which.
    #[error("verify token mismatch")]
    TokenMismatch,
}

/// Verifies a handshake request against the configured token.
///
/// Token comparison is plain string equality: the verify token is a
/// registration-time shared value, not a per-request digest, so digest
/// comparison rules do not apply to it.
///
/// # Errors
///
/// [`HandshakeError::MissingParameters`] when `hub.mode` or
/// `hub.verify_token` is absent; [`HandshakeError::TokenMismatch`] for
/// any other rejection. The challenge is only returned on success.
pub fn verify_handshake(
    expected_token: &str,
    query: &HandshakeQuery,
) -> Result<String, HandshakeError> {
    let (Some(mode), Some(token)) = (query.mode.as_deref(), query.verify_token.as_deref()) else {
        return Err(HandshakeError::MissingParameters);
    };

    if mode == SUBSCRIBE_MODE && token == expected_token {
        Ok(query.challenge.clone().unwrap_or_default())
    } else {
        Err(HandshakeError::TokenMismatch)
    }
}
