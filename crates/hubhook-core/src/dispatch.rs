//! Field-keyed change dispatch.
//!
//! Routes each change in a parsed envelope to the handler registered for
//! its field name. The registry is a dispatch table rather than branch
//! logic: adding support for a new platform field is one `register` call.
//!
//! Dispatch guarantees:
//! - entries in arrival order, changes within an entry in arrival order
//! - each change dispatched exactly once, no dedup or batching
//! - a handler failure is logged and isolated; sibling changes still run
//! - fields with no registered handler are a no-op, not an error

use std::{collections::HashMap, sync::Arc};

use tracing::{debug, warn};

use crate::{
    envelope::{Change, WebhookEnvelope},
    error::DispatchError,
};

/// Handler for changes on a single field.
///
/// Implementations own whatever downstream effect a change triggers;
/// the dispatcher only guarantees that `on_change` is invoked with the
/// entry id and the change, in arrival order. Errors are logged by the
/// dispatcher and never abort the surrounding delivery.
#[async_trait::async_trait]
pub trait ChangeHandler: Send + Sync + std::fmt::Debug {
    /// Handles one change notification for `entry_id`.
    async fn on_change(&self, entry_id: &str, change: &Change) -> anyhow::Result<()>;
}

/// No-op handler that acknowledges every change without acting.
#[derive(Debug, Default)]
pub struct NoOpChangeHandler;

impl NoOpChangeHandler {
    /// Creates a new no-op change handler.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl ChangeHandler for NoOpChangeHandler {
    async fn on_change(&self, _entry_id: &str, _change: &Change) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Counters describing how a delivery's changes were routed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Changes routed to a registered handler.
    pub dispatched: usize,
    /// Changes whose field had no registered handler.
    pub skipped: usize,
    /// Dispatched changes whose handler returned an error.
    pub failed: usize,
}

/// Field-name-to-handler dispatch table.
#[derive(Debug, Default, Clone)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn ChangeHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self { handlers: HashMap::new() }
    }

    /// Registers `handler` for changes on `field`, replacing any previous
    /// handler for the same field.
    pub fn register(&mut self, field: impl Into<String>, handler: Arc<dyn ChangeHandler>) {
        self.handlers.insert(field.into(), handler);
    }

    /// Returns the number of registered fields.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Routes every change in `envelope` to its registered handler.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::UnsupportedObject`] when the envelope's
    /// object kind is not a supported topic; no entry is processed in
    /// that case. Handler failures do not surface here.
    pub async fn dispatch(
        &self,
        envelope: &WebhookEnvelope,
    ) -> Result<DispatchOutcome, DispatchError> {
        if !envelope.object.is_supported() {
            return Err(DispatchError::UnsupportedObject);
        }

        let mut outcome = DispatchOutcome::default();

        for entry in &envelope.entry {
            for change in &entry.changes {
                let Some(handler) = self.handlers.get(&change.field) else {
                    debug!(entry_id = %entry.id, field = %change.field, "no handler for field");
                    outcome.skipped += 1;
                    continue;
                };

                outcome.dispatched += 1;
                if let Err(error) = handler.on_change(&entry.id, change).await {
                    warn!(
                        entry_id = %entry.id,
                        field = %change.field,
                        error = %error,
                        "change handler failed"
                    );
                    outcome.failed += 1;
                }
            }
        }

        Ok(outcome)
    }
}
