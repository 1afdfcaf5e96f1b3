//! HTTP request handlers for the hubhook API.
//!
//! Handlers are grouped by functionality:
//! - `verify` - subscription handshake (GET)
//! - `receive` - signed delivery ingestion (POST)
//! - `health` - health and liveness probes
//!
//! Every handler validates input before acting, traces its work, and
//! maps failures to an HTTP status at the boundary; nothing is thrown
//! past a handler. The delivery path is ordered signature-first: the
//! raw body is captured untouched, validated, and only then parsed.

pub mod health;
pub mod receive;
pub mod verify;

// Re-export handlers for convenient access
pub use health::{health_check, liveness_check};
pub use receive::receive_delivery;
pub use verify::verify_subscription;
