//! Subscription handshake handler.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{info, instrument, warn};

use crate::{
    handshake::{verify_handshake, HandshakeError, HandshakeQuery},
    server::AppState,
};

/// Handles the one-time subscription handshake.
///
/// Echoes `hub.challenge` as plain text when the mode is `subscribe`
/// and the verify token matches. Failures never echo the challenge:
/// missing parameters are a `400`, everything else a bodyless `403`
/// that does not reveal which check failed.
#[instrument(
    name = "verify_subscription",
    skip(state, query),
    fields(mode = query.mode.as_deref().unwrap_or("none"))
)]
pub async fn verify_subscription(
    State(state): State<AppState>,
    Query(query): Query<HandshakeQuery>,
) -> Response {
    match verify_handshake(&state.secrets.verify_token, &query) {
        Ok(challenge) => {
            info!("subscription handshake verified");
            (StatusCode::OK, challenge).into_response()
        },
        Err(HandshakeError::MissingParameters) => {
            warn!("handshake request missing parameters");
            StatusCode::BAD_REQUEST.into_response()
        },
        Err(HandshakeError::TokenMismatch) => {
            warn!("handshake verification failed");
            StatusCode::FORBIDDEN.into_response()
        },
    }
}
