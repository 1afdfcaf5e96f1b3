//! Integration tests for the subscription handshake endpoint.
//!
//! Drives the router directly and checks the three handshake outcomes:
//! challenge echo on success, bodyless forbidden on mismatch, bad
//! request on missing parameters.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use hubhook_api::{config::WebhookSecrets, create_router, AppState};
use hubhook_core::HandlerRegistry;
use tower::ServiceExt;

const VERIFY_TOKEN: &str = "test-verify-token";
const APP_SECRET: &str = "test-app-secret";

fn test_router() -> Router {
    let state = AppState {
        secrets: Arc::new(WebhookSecrets {
            verify_token: VERIFY_TOKEN.to_string(),
            app_secret: APP_SECRET.to_string(),
        }),
        registry: Arc::new(HandlerRegistry::new()),
    };
    create_router(state, Duration::from_secs(5))
}

async fn body_string(response: axum::response::Response) -> Result<String> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test]
async fn subscribe_with_correct_token_echoes_challenge() -> Result<()> {
    let app = test_router();

    let request = Request::builder()
        .method("GET")
        .uri(format!(
            "/webhooks?hub.mode=subscribe&hub.verify_token={VERIFY_TOKEN}&hub.challenge=challenge-1234"
        ))
        .body(Body::empty())?;

    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/plain"), "expected plain text, got {content_type}");
    assert_eq!(body_string(response).await?, "challenge-1234");

    Ok(())
}

#[tokio::test]
async fn wrong_token_is_forbidden_and_never_echoes_challenge() -> Result<()> {
    let app = test_router();

    let request = Request::builder()
        .method("GET")
        .uri("/webhooks?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=challenge-1234")
        .body(Body::empty())?;

    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_string(response).await?;
    assert!(!body.contains("challenge-1234"));
    assert!(body.is_empty());

    Ok(())
}

#[tokio::test]
async fn wrong_mode_is_forbidden() -> Result<()> {
    let app = test_router();

    let request = Request::builder()
        .method("GET")
        .uri(format!(
            "/webhooks?hub.mode=unsubscribe&hub.verify_token={VERIFY_TOKEN}&hub.challenge=c"
        ))
        .body(Body::empty())?;

    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    Ok(())
}

#[tokio::test]
async fn missing_mode_is_bad_request() -> Result<()> {
    let app = test_router();

    let request = Request::builder()
        .method("GET")
        .uri(format!("/webhooks?hub.verify_token={VERIFY_TOKEN}&hub.challenge=c"))
        .body(Body::empty())?;

    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_string(response).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn missing_token_is_bad_request() -> Result<()> {
    let app = test_router();

    let request = Request::builder()
        .method("GET")
        .uri("/webhooks?hub.mode=subscribe&hub.challenge=c")
        .body(Body::empty())?;

    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn handshake_is_repeatable() -> Result<()> {
    let app = test_router();

    for _ in 0..2 {
        let request = Request::builder()
            .method("GET")
            .uri(format!(
                "/webhooks?hub.mode=subscribe&hub.verify_token={VERIFY_TOKEN}&hub.challenge=again"
            ))
            .body(Body::empty())?;

        let response = app.clone().oneshot(request).await?;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await?, "again");
    }

    Ok(())
}
