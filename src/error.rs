//! Crate-level error types.
//!
//! [`FxcmError`] unifies every error source (handshake, range validation,
//! server rejections, HTTP, WebSocket, JSON) behind a single enum so callers
//! can match on the variant they care about while still using the `?`
//! operator for easy propagation.

use std::fmt;

use reqwest::StatusCode;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FxcmError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum FxcmError {
    /// The streaming handshake was rejected or failed before the server
    /// acknowledged the session.
    #[error("Connection Error: {0}")]
    Connection(String),

    /// A client-side precondition failed before any request was sent.
    #[error("{0}")]
    Validation(String),

    /// The server answered with `executed: false`.
    #[error("{0}")]
    Server(ServerError),

    /// An HTTP request could not be sent or its body could not be read.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status and no envelope.
    #[error("unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: StatusCode, body: String },

    /// A WebSocket operation (send, receive) failed after the handshake.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A base URL or request path could not be parsed.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),

    /// Required configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The TLS client configuration could not be built.
    #[error("tls error: {0}")]
    Tls(String),

    /// A frame or response did not have the expected shape.
    #[error("malformed message: {0}")]
    MalformedMessage(String),
}

impl FxcmError {
    /// Returns the server payload if this is a [`FxcmError::Server`] error.
    pub fn server_payload(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Server(err) => Some(err.payload()),
            _ => None,
        }
    }
}

/// The error payload embedded in a rejected response envelope.
///
/// FXCM reports most failures as a plain string (`"Invalid symbol."`) but
/// some endpoints return structured objects, so the payload is kept as raw
/// JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerError(serde_json::Value);

impl ServerError {
    pub fn new(payload: serde_json::Value) -> Self {
        Self(payload)
    }

    /// The payload exactly as the server sent it.
    pub fn payload(&self) -> &serde_json::Value {
        &self.0
    }

    /// The payload as text when the server sent a string.
    pub fn message(&self) -> Option<&str> {
        self.0.as_str()
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(message) => f.write_str(message),
            other => write!(f, "{other}"),
        }
    }
}
