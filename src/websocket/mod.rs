//! Socket.IO session transport.
//!
//! FXCM identifies REST callers by the id of a live Socket.IO connection.
//! This module is organized by concern:
//! - [`packet`] - Engine.IO / Socket.IO frame codec
//! - [`connection`] - handshake and the [`Session`] handle
//! - [`handler`] - processing of frames after the handshake

mod connection;
mod handler;
pub mod packet;

use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::stream::{SplitSink, SplitStream};
use tokio::net::TcpStream;
use tokio_tungstenite::{Connector, MaybeTlsStream, WebSocketStream, connect_async_tls_with_config};
use tracing::info;
use tungstenite::Message;
use url::Url;

use crate::{FxcmError, Result};
use packet::ENGINE_IO_VERSION;

pub use connection::{DEFAULT_CONNECT_TIMEOUT, Handshake, Session, handshake, open_session};
pub use handler::{FrameAction, handle_frame};

/// Path of the Socket.IO endpoint relative to the API base URL.
pub const SOCKET_IO_PATH: &str = "socket.io/";

/// Write half of a Socket.IO WebSocket connection.
pub type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Read half of a Socket.IO WebSocket connection.
pub type WsReader = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// Builds the WebSocket URL for the Socket.IO endpoint under `base`.
///
/// `https` becomes `wss` and `http` becomes `ws`; the token travels as the
/// `access_token` query parameter.
///
/// # Errors
///
/// Returns [`FxcmError::Config`] if `base` uses a scheme other than
/// http(s) or ws(s).
pub fn socket_url(base: &Url, token: &str) -> Result<Url> {
    let mut url = base.join(SOCKET_IO_PATH)?;

    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(FxcmError::Config(format!(
                "unsupported URL scheme '{other}' for the socket endpoint"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| FxcmError::Config(format!("cannot switch {base} to {scheme}")))?;

    url.query_pairs_mut()
        .append_pair("EIO", ENGINE_IO_VERSION)
        .append_pair("transport", "websocket")
        .append_pair("access_token", token);

    Ok(url)
}

/// Establishes a WebSocket connection to the given URL.
///
/// # Errors
///
/// Returns a [`FxcmError`] if the connection or TLS handshake fails.
pub async fn connect(url: &Url, tls_config: Arc<rustls::ClientConfig>) -> Result<(WsWriter, WsReader)> {
    let connector = Connector::Rustls(tls_config);
    let (ws_stream, _) =
        connect_async_tls_with_config(url.as_str(), None, false, Some(connector)).await?;
    info!(host = url.host_str().unwrap_or_default(), "WebSocket handshake completed");

    Ok(ws_stream.split())
}
