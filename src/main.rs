//! Hubhook webhook ingestion service.
//!
//! Main entry point for the hubhook server. Loads configuration,
//! resolves the webhook secrets, wires the default change handlers, and
//! serves until a shutdown signal arrives.

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use hubhook_api::{server, Config};
use hubhook_core::{Change, ChangeHandler, HandlerRegistry, PhotoChange};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration from environment
    let config = Config::load()?;

    // Initialize tracing with structured logging
    init_tracing(&config.rust_log);

    info!(
        environment = ?config.environment,
        host = %config.host,
        port = config.port,
        "Starting hubhook webhook ingestion service"
    );

    // Missing secrets are startup-fatal in production
    let secrets = Arc::new(config.secrets()?);
    let registry = Arc::new(default_registry());
    let addr = config.parse_server_addr()?;

    info!(addr = %addr, handlers = registry.handler_count(), "Hubhook is ready to receive webhooks");

    server::start_server(
        server::AppState { secrets, registry },
        addr,
        Duration::from_secs(config.request_timeout),
    )
    .await?;

    info!("Hubhook shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .or_else(|_| EnvFilter::try_new("info,hubhook=debug,tower_http=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

/// Builds the default field-to-handler dispatch table.
///
/// Deployments extend this by registering additional handlers; fields
/// without one are acknowledged without action.
fn default_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::new();
    registry.register("photos", Arc::new(PhotosHandler));
    registry
}

/// Logs photo change notifications.
///
/// Downstream effects (storage, notification) belong to deployments;
/// this default handler only records that the change arrived.
#[derive(Debug, Default)]
struct PhotosHandler;

#[async_trait::async_trait]
impl ChangeHandler for PhotosHandler {
    async fn on_change(&self, entry_id: &str, change: &Change) -> Result<()> {
        let photo: PhotoChange = change.value_as()?;
        info!(entry_id, verb = %photo.verb, object_id = %photo.object_id, "Photo change received");
        Ok(())
    }
}
