//! Hubhook HTTP API.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod crypto;
pub mod handlers;
pub mod handshake;
pub mod server;

pub use config::Config;
pub use server::{create_router, start_server, AppState};
