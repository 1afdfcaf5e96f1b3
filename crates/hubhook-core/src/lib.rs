//! Core domain types for hub webhook ingestion.
//!
//! Provides the delivery envelope model, the field-to-handler dispatch
//! table, and the error taxonomy shared across the service. The HTTP
//! surface in `hubhook-api` depends on these types; nothing here touches
//! the network.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod dispatch;
pub mod envelope;
pub mod error;

pub use dispatch::{ChangeHandler, DispatchOutcome, HandlerRegistry, NoOpChangeHandler};
pub use envelope::{Change, Entry, ObjectKind, PhotoChange, WebhookEnvelope};
pub use error::{DispatchError, EnvelopeError};
