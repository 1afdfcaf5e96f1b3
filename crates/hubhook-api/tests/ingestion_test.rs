//! End-to-end ingestion tests: signature gate, envelope parsing, and
//! change dispatch through the full router.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use hubhook_api::{config::WebhookSecrets, create_router, crypto::signature_for, AppState};
use hubhook_core::{Change, ChangeHandler, HandlerRegistry, PhotoChange};
use tower::ServiceExt;

const VERIFY_TOKEN: &str = "test-verify-token";
const APP_SECRET: &str = "test-app-secret";

const PHOTOS_PAYLOAD: &[u8] = br#"{"object":"page","entry":[{"id":"1","changes":[{"field":"photos","value":{"verb":"add","object_id":"42"}}]}]}"#;

/// Records every photo change it receives.
#[derive(Debug, Default)]
struct RecordingPhotosHandler {
    photos: Arc<Mutex<Vec<(String, PhotoChange)>>>,
}

#[async_trait::async_trait]
impl ChangeHandler for RecordingPhotosHandler {
    async fn on_change(&self, entry_id: &str, change: &Change) -> Result<()> {
        let photo: PhotoChange = change.value_as()?;
        self.photos.lock().unwrap().push((entry_id.to_string(), photo));
        Ok(())
    }
}

/// Counts invocations without interpreting the value.
#[derive(Debug)]
struct CountingHandler {
    calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl ChangeHandler for CountingHandler {
    async fn on_change(&self, _entry_id: &str, _change: &Change) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Fails every change it receives.
#[derive(Debug)]
struct FailingHandler;

#[async_trait::async_trait]
impl ChangeHandler for FailingHandler {
    async fn on_change(&self, _entry_id: &str, _change: &Change) -> Result<()> {
        anyhow::bail!("downstream unavailable")
    }
}

fn router_with(registry: HandlerRegistry) -> Router {
    let state = AppState {
        secrets: Arc::new(WebhookSecrets {
            verify_token: VERIFY_TOKEN.to_string(),
            app_secret: APP_SECRET.to_string(),
        }),
        registry: Arc::new(registry),
    };
    create_router(state, Duration::from_secs(5))
}

fn signed_delivery(body: &[u8]) -> Result<Request<Body>> {
    let signature = signature_for(APP_SECRET, body)?;
    Ok(Request::builder()
        .method("POST")
        .uri("/webhooks")
        .header("content-type", "application/json")
        .header("x-hub-signature-256", signature)
        .body(Body::from(body.to_vec()))?)
}

async fn body_string(response: axum::response::Response) -> Result<String> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(String::from_utf8(bytes.to_vec())?)
}

#[tokio::test]
async fn photos_change_invokes_handler_exactly_once() -> Result<()> {
    let photos = Arc::new(Mutex::new(Vec::new()));
    let mut registry = HandlerRegistry::new();
    registry.register("photos", Arc::new(RecordingPhotosHandler { photos: photos.clone() }));
    let app = router_with(registry);

    let response = app.oneshot(signed_delivery(PHOTOS_PAYLOAD)?).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await?, "EVENT_RECEIVED");

    let photos = photos.lock().unwrap();
    assert_eq!(photos.len(), 1);
    let (entry_id, photo) = &photos[0];
    assert_eq!(entry_id, "1");
    assert_eq!(photo.verb, "add");
    assert_eq!(photo.object_id, "42");

    Ok(())
}

#[tokio::test]
async fn unsigned_delivery_never_reaches_handlers() -> Result<()> {
    let photos = Arc::new(Mutex::new(Vec::new()));
    let mut registry = HandlerRegistry::new();
    registry.register("photos", Arc::new(RecordingPhotosHandler { photos: photos.clone() }));
    let app = router_with(registry);

    let request = Request::builder()
        .method("POST")
        .uri("/webhooks")
        .header("content-type", "application/json")
        .body(Body::from(PHOTOS_PAYLOAD.to_vec()))?;

    let response = app.oneshot(request).await?;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(photos.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn unsupported_object_is_not_found() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = HandlerRegistry::new();
    registry.register("photos", Arc::new(CountingHandler { calls: calls.clone() }));
    let app = router_with(registry);

    let body = br#"{"object":"group","entry":[]}"#;
    let response = app.oneshot(signed_delivery(body)?).await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    Ok(())
}

#[tokio::test]
async fn malformed_payload_with_valid_signature_is_bad_request() -> Result<()> {
    let app = router_with(HandlerRegistry::new());

    let response = app.oneshot(signed_delivery(b"not json at all")?).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    Ok(())
}

#[tokio::test]
async fn handler_failure_does_not_fail_the_request_or_siblings() -> Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = HandlerRegistry::new();
    registry.register("feed", Arc::new(FailingHandler));
    registry.register("photos", Arc::new(CountingHandler { calls: calls.clone() }));
    let app = router_with(registry);

    let body = br#"{"object":"page","entry":[{"id":"1","changes":[{"field":"feed","value":{}},{"field":"photos","value":{"verb":"add","object_id":"7"}}]}]}"#;
    let response = app.oneshot(signed_delivery(body)?).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await?, "EVENT_RECEIVED");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn unknown_fields_are_acknowledged_without_handlers() -> Result<()> {
    let app = router_with(HandlerRegistry::new());

    let body = br#"{"object":"user","entry":[{"id":"9","uid":"9","changes":[{"field":"widgets","value":{"anything":true}}]}]}"#;
    let response = app.oneshot(signed_delivery(body)?).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await?, "EVENT_RECEIVED");

    Ok(())
}

#[tokio::test]
async fn changes_across_entries_dispatch_in_arrival_order() -> Result<()> {
    let photos = Arc::new(Mutex::new(Vec::new()));
    let mut registry = HandlerRegistry::new();
    registry.register("photos", Arc::new(RecordingPhotosHandler { photos: photos.clone() }));
    let app = router_with(registry);

    let body = br#"{"object":"page","entry":[
        {"id":"a","changes":[
            {"field":"photos","value":{"verb":"add","object_id":"1"}},
            {"field":"photos","value":{"verb":"add","object_id":"2"}}]},
        {"id":"b","changes":[
            {"field":"photos","value":{"verb":"remove","object_id":"3"}}]}]}"#;
    let response = app.oneshot(signed_delivery(body)?).await?;

    assert_eq!(response.status(), StatusCode::OK);

    let photos = photos.lock().unwrap();
    let order: Vec<(String, String)> = photos
        .iter()
        .map(|(entry_id, photo)| (entry_id.clone(), photo.object_id.clone()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("a".to_string(), "1".to_string()),
            ("a".to_string(), "2".to_string()),
            ("b".to_string(), "3".to_string()),
        ]
    );

    Ok(())
}
