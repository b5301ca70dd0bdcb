//! Processing of Socket.IO frames received after the handshake.

use tracing::{debug, error, info, warn};

use super::packet::{EnginePacket, ROOT_NAMESPACE, SocketPacket, describe_payload};

/// What the session task should do after a frame has been handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameAction {
    /// Nothing to send.
    Continue,
    /// Send this frame back to the server.
    Reply(String),
    /// The server ended the session.
    Disconnected,
}

/// Parses and logs a text frame, deciding how the session should react.
///
/// Errors reported by the server after the handshake are logged and do not
/// end the session; unparseable frames are skipped.
pub fn handle_frame(text: &str) -> FrameAction {
    let packet = match EnginePacket::parse(text) {
        Ok(packet) => packet,
        Err(e) => {
            warn!(error = %e, bytes = text.len(), "Skipping unparseable frame");
            return FrameAction::Continue;
        }
    };

    match packet {
        EnginePacket::Ping(data) => FrameAction::Reply(EnginePacket::Pong(data).encode()),
        EnginePacket::Pong(_) => {
            debug!("Received pong");
            FrameAction::Continue
        }
        EnginePacket::Close => FrameAction::Disconnected,
        EnginePacket::Message(message) => handle_message(message),
        EnginePacket::Open(_) | EnginePacket::Upgrade | EnginePacket::Noop => FrameAction::Continue,
    }
}

fn handle_message(message: SocketPacket) -> FrameAction {
    match message {
        SocketPacket::Disconnect { namespace } if namespace == ROOT_NAMESPACE => {
            info!("Server closed the Socket.IO namespace");
            FrameAction::Disconnected
        }
        SocketPacket::Error { namespace, payload } => {
            error!(
                namespace = %namespace,
                error = %describe_payload(&payload),
                "Socket.IO session error"
            );
            FrameAction::Continue
        }
        event @ SocketPacket::Event { .. } => {
            debug!(event = event.event_name().unwrap_or_default(), "Received event");
            FrameAction::Continue
        }
        other => {
            debug!(?other, "Ignoring socket.io packet");
            FrameAction::Continue
        }
    }
}
