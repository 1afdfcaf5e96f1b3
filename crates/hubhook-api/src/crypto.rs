//! Cryptographic verification of delivery signatures.
//!
//! Every delivery carries an HMAC-SHA256 digest of its body, computed by
//! the platform with the shared application secret and sent as
//! `sha256=<lowercase hex>`. Verification runs over the literal bytes as
//! received on the wire, before any JSON decoding; the
//! [`VerifiedPayload`] token is the only path from raw bytes to envelope
//! parsing, so dispatch logic cannot run on an unverified body.

use bytes::Bytes;
use hmac::{Hmac, Mac};
use hubhook_core::{EnvelopeError, WebhookEnvelope};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Prefix naming the digest algorithm in the signature header.
const SIGNATURE_PREFIX: &str = "sha256=";

/// Length in bytes of a SHA-256 digest.
const DIGEST_LEN: usize = 32;

/// Signature validation errors.
///
/// All variants map to the same HTTP response: the caller must not be
/// able to distinguish a malformed signature from a wrong one.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SignatureError {
    /// Signature header absent or empty.
    #[error("signature header missing")]
    Missing,
    /// Header did not carry a `sha256=` prefix followed by a digest of
    /// the expected length.
    #[error("invalid signature format")]
    InvalidFormat,
    /// Digest comparison failed.
    #[error("signature verification failed")]
    Mismatch,
    /// The application secret could not be used as an HMAC key.
    #[error("invalid signing secret")]
    InvalidSecret,
}

/// Payload bytes that passed signature validation.
///
/// Constructed only by [`verify_signature`]; the delivery pipeline parses
/// envelopes through [`VerifiedPayload::parse_envelope`], which makes
/// signature-first ordering a type-level property rather than a calling
/// convention.
#[derive(Debug, Clone)]
pub struct VerifiedPayload(Bytes);

impl VerifiedPayload {
    /// The verified bytes, identical to what was received on the wire.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Parses the verified body into a delivery envelope.
    ///
    /// # Errors
    ///
    /// Returns [`EnvelopeError::MalformedPayload`] when the body is not
    /// valid JSON or does not match the envelope shape.
    pub fn parse_envelope(&self) -> Result<WebhookEnvelope, EnvelopeError> {
        Ok(serde_json::from_slice(&self.0)?)
    }
}

/// Validates a delivery signature over the raw body bytes.
///
/// The header must be `sha256=` followed by a hex digest of exactly
/// [`DIGEST_LEN`] bytes; anything else fails closed before any value
/// comparison. Digests are compared in constant time.
///
/// # Errors
///
/// Returns a [`SignatureError`] describing which gate failed. Callers
/// must collapse all variants into one response.
pub fn verify_signature(
    secret: &str,
    body: Bytes,
    header: Option<&str>,
) -> Result<VerifiedPayload, SignatureError> {
    let header = header.unwrap_or_default();
    if header.is_empty() {
        return Err(SignatureError::Missing);
    }

    let hex_digest = header.strip_prefix(SIGNATURE_PREFIX).ok_or(SignatureError::InvalidFormat)?;
    let received = hex::decode(hex_digest).map_err(|_| SignatureError::InvalidFormat)?;
    if received.len() != DIGEST_LEN {
        return Err(SignatureError::InvalidFormat);
    }

    let expected = hmac_digest(secret, &body)?;

    if bool::from(expected.as_slice().ct_eq(received.as_slice())) {
        Ok(VerifiedPayload(body))
    } else {
        Err(SignatureError::Mismatch)
    }
}

/// Produces the canonical signature header value for `payload`.
///
/// This is the value the platform would send for the same body and
/// secret: `sha256=` plus the lowercase hex HMAC-SHA256 digest.
///
/// # Errors
///
/// Returns [`SignatureError::InvalidSecret`] if the secret is rejected
/// as an HMAC key.
pub fn signature_for(secret: &str, payload: &[u8]) -> Result<String, SignatureError> {
    let digest = hmac_digest(secret, payload)?;
    Ok(format!("{SIGNATURE_PREFIX}{}", hex::encode(digest)))
}

/// Computes the HMAC-SHA256 digest of `payload` keyed by `secret`.
fn hmac_digest(secret: &str, payload: &[u8]) -> Result<[u8; DIGEST_LEN], SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|_| SignatureError::InvalidSecret)?;
    mac.update(payload);
    Ok(mac.finalize().into_bytes().into())
}
