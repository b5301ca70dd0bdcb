//! Session establishment and lifecycle.
//!
//! [`open_session`] connects, waits for the server to acknowledge the root
//! namespace, and hands the socket to a background task that keeps the
//! Engine.IO session alive until the [`Session`] is disconnected or
//! dropped, or the server goes away.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use tungstenite::Message;
use url::Url;

use super::handler::{FrameAction, handle_frame};
use super::packet::{EnginePacket, OpenInfo, ROOT_NAMESPACE, SocketPacket, describe_payload};
use super::{WsReader, WsWriter, connect, socket_url};
use crate::{FxcmError, Result};

/// Used when the server advertises no ping interval.
const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(25);

/// How long [`open_session`] waits for the upgrade and the namespace
/// acknowledgement together, unless the client overrides it.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(20);

/// Commands sent from a [`Session`] handle to its background task.
enum SessionCommand {
    Disconnect,
}

/// Result of a successful Socket.IO handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handshake {
    /// Connection id used to authenticate REST calls.
    pub session_id: String,
    pub open: OpenInfo,
}

/// A live Socket.IO session.
///
/// Every REST operation takes a `&Session`, so a call cannot be made
/// before [`FxcmClient::connect`](crate::FxcmClient::connect) has
/// succeeded. Dropping the handle closes the connection.
#[derive(Debug)]
pub struct Session {
    id: String,
    open: Arc<AtomicBool>,
    commands: mpsc::UnboundedSender<SessionCommand>,
}

impl Session {
    /// The server-assigned connection id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns `false` once the stream has closed for any reason.
    ///
    /// Calls made on a closed session are still sent; the server rejects
    /// them as it no longer knows the id.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Closes the streaming connection without waiting for the close to
    /// complete. In-flight requests are not cancelled.
    pub fn disconnect(self) {
        info!(session_id = %self.id, "Disconnecting session");
        self.open.store(false, Ordering::Release);
        let _ = self.commands.send(SessionCommand::Disconnect);
    }
}

/// Connects to the Socket.IO endpoint under `base` and completes the
/// handshake.
///
/// # Errors
///
/// Returns [`FxcmError::Connection`] if the upgrade is rejected, the
/// transport fails, the server reports an error before acknowledging the
/// session, or no acknowledgement arrives within `connect_timeout`.
pub async fn open_session(
    base: &Url,
    token: &str,
    tls_config: Arc<rustls::ClientConfig>,
    connect_timeout: Duration,
) -> Result<Session> {
    let url = socket_url(base, token)?;
    info!(host = url.host_str().unwrap_or_default(), "Connecting to Socket.IO");

    let establish = async {
        let (write, mut read) = connect(&url, tls_config).await.map_err(|e| {
            error!("failed to connect: {e}");
            FxcmError::Connection(e.to_string())
        })?;
        let handshake = handshake(&mut read).await?;
        Ok::<_, FxcmError>((write, read, handshake))
    };

    let (write, read, handshake) = tokio::time::timeout(connect_timeout, establish)
        .await
        .map_err(|_| FxcmError::Connection("timeout".into()))
        .and_then(|result| result)
        .inspect_err(|e| error!("Socket.IO session error: {e}"))?;
    info!(session_id = %handshake.session_id, "Socket.IO session has been opened");

    let open = Arc::new(AtomicBool::new(true));
    let (commands, cmd_rx) = mpsc::unbounded_channel();
    let ping_interval = match handshake.open.ping_interval {
        0 => DEFAULT_PING_INTERVAL,
        ms => Duration::from_millis(ms),
    };

    tokio::spawn(run(write, read, cmd_rx, open.clone(), ping_interval));

    Ok(Session {
        id: handshake.session_id,
        open,
        commands,
    })
}

/// Reads frames until the server acknowledges the root namespace.
///
/// The session id is the `sid` of the namespace acknowledgement when the
/// server sends one, otherwise the Engine.IO `sid`.
///
/// # Errors
///
/// Returns [`FxcmError::Connection`] if the server sends an error packet,
/// closes the stream, or acknowledges before opening the Engine.IO session.
pub async fn handshake(read: &mut WsReader) -> Result<Handshake> {
    let mut open: Option<OpenInfo> = None;

    while let Some(msg) = read.next().await {
        let text = match msg.map_err(|e| FxcmError::Connection(e.to_string()))? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        let packet = EnginePacket::parse(text.as_str())
            .map_err(|e| FxcmError::Connection(e.to_string()))?;

        match packet {
            EnginePacket::Open(info) => {
                debug!(
                    sid = %info.sid,
                    ping_interval = info.ping_interval,
                    ping_timeout = info.ping_timeout,
                    "Engine.IO session opened"
                );
                open = Some(info);
            }
            EnginePacket::Message(SocketPacket::Connect { namespace, sid })
                if namespace == ROOT_NAMESPACE =>
            {
                let open = open.ok_or_else(|| {
                    FxcmError::Connection("namespace acknowledged before open".into())
                })?;
                let session_id = sid.unwrap_or_else(|| open.sid.clone());
                return Ok(Handshake { session_id, open });
            }
            EnginePacket::Message(SocketPacket::Error { payload, .. }) => {
                return Err(FxcmError::Connection(describe_payload(&payload)));
            }
            EnginePacket::Close => break,
            other => debug!(?other, "Ignoring frame during handshake"),
        }
    }

    Err(FxcmError::Connection(
        "connection closed before the session was acknowledged".into(),
    ))
}

/// Owns the socket for the lifetime of a session: sends keepalive pings,
/// answers server frames, and closes on command.
async fn run(
    mut write: WsWriter,
    mut read: WsReader,
    mut cmd_rx: mpsc::UnboundedReceiver<SessionCommand>,
    open: Arc<AtomicBool>,
    ping_interval: Duration,
) {
    let mut keepalive =
        tokio::time::interval_at(tokio::time::Instant::now() + ping_interval, ping_interval);

    loop {
        tokio::select! {
            _ = keepalive.tick() => {
                let ping = EnginePacket::Ping(String::new()).encode();
                if let Err(e) = write.send(Message::Text(ping.into())).await {
                    warn!("Failed to send ping: {e}");
                    break;
                }
                debug!("Sent ping");
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    // A closed channel means the handle was dropped.
                    Some(SessionCommand::Disconnect) | None => {
                        close(&mut write).await;
                        break;
                    }
                }
            }

            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => match handle_frame(text.as_str()) {
                        FrameAction::Continue => {}
                        FrameAction::Reply(frame) => {
                            if let Err(e) = write.send(Message::Text(frame.into())).await {
                                warn!("Failed to answer server frame: {e}");
                                break;
                            }
                        }
                        FrameAction::Disconnected => {
                            info!("Socket disconnected, terminating client.");
                            break;
                        }
                    },
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Socket disconnected, terminating client.");
                        break;
                    }
                    Some(Ok(_)) => {} // Binary/Ping/Pong frames
                    Some(Err(e)) => {
                        error!("Socket.IO session error: {e}");
                        break;
                    }
                }
            }
        }
    }

    open.store(false, Ordering::Release);
}

/// Leaves the root namespace and closes the WebSocket.
async fn close(write: &mut WsWriter) {
    let leave = EnginePacket::Message(SocketPacket::Disconnect {
        namespace: ROOT_NAMESPACE.to_string(),
    })
    .encode();

    if let Err(e) = write.send(Message::Text(leave.into())).await {
        debug!("Failed to send namespace disconnect: {e}");
    }
    if let Err(e) = write.close().await {
        debug!("Failed to close WebSocket: {e}");
    }
    info!("Socket.IO session closed by client");
}
