//! FXCM REST API client library.
//!
//! Opens a Socket.IO session for identity, then issues authenticated REST
//! calls for instruments, offers, subscriptions and historical candles,
//! decoding responses into typed models.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod models;
pub mod tls;
pub mod websocket;

pub use client::FxcmClient;
pub use config::Environment;
pub use error::{FxcmError, Result, ServerError};
pub use websocket::Session;
