//! Signed delivery ingestion handler.
//!
//! The write path of the service: capture the raw body, validate its
//! signature, parse the envelope, dispatch each change. The stages are
//! strictly ordered; an attacker without a valid signature never
//! reaches parse or dispatch logic.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use hubhook_core::DispatchError;
use tracing::{info, instrument, warn};

use crate::{crypto::verify_signature, server::AppState};

/// Header carrying the keyed digest of the delivery body.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";

/// Acknowledgment body the platform expects on success.
const ACK_BODY: &str = "EVENT_RECEIVED";

/// Ingests a signed event delivery.
///
/// The `body` extractor yields the exact wire bytes before any JSON
/// handling; the signature is computed over those same bytes.
///
/// Responses:
/// - `200 "EVENT_RECEIVED"` - all entries processed
/// - `400` - verified payload was malformed
/// - `403` - signature absent, malformed, or wrong (indistinguishable)
/// - `404` - unsupported subscription object
#[instrument(
    name = "receive_delivery",
    skip(state, headers, body),
    fields(payload_size = body.len())
)]
pub async fn receive_delivery(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());

    let verified = match verify_signature(&state.secrets.app_secret, body, signature) {
        Ok(verified) => verified,
        Err(error) => {
            warn!(error = %error, "delivery signature rejected");
            return StatusCode::FORBIDDEN.into_response();
        },
    };

    let envelope = match verified.parse_envelope() {
        Ok(envelope) => envelope,
        Err(error) => {
            warn!(error = %error, "verified payload failed to parse");
            return StatusCode::BAD_REQUEST.into_response();
        },
    };

    match state.registry.dispatch(&envelope).await {
        Ok(outcome) => {
            info!(
                dispatched = outcome.dispatched,
                skipped = outcome.skipped,
                failed = outcome.failed,
                "delivery processed"
            );
            (StatusCode::OK, ACK_BODY).into_response()
        },
        Err(DispatchError::UnsupportedObject) => {
            warn!("delivery for unsupported subscription object");
            StatusCode::NOT_FOUND.into_response()
        },
    }
}
