//! Error types for envelope parsing and change dispatch.
//!
//! Every variant is terminal for the request that produced it; the HTTP
//! layer maps each to a status code and never propagates past the handler.

use thiserror::Error;

/// Failure to parse a verified delivery body into a [`crate::WebhookEnvelope`].
///
/// Distinct from a signature failure: this can only occur after the raw
/// bytes have already passed signature validation.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// The body was not valid JSON or did not match the envelope shape.
    #[error("malformed delivery payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// Failure to dispatch a parsed envelope.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// The envelope's object kind is not a supported subscription topic.
    /// Entries are left untouched when this is returned.
    #[error("unsupported subscription object")]
    UnsupportedObject,
}
