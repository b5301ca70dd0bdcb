//! Engine.IO (protocol 3) and Socket.IO packet encoding.
//!
//! Every WebSocket text frame is one Engine.IO packet: a single type digit
//! followed by its payload. Type `4` (message) carries a Socket.IO packet,
//! itself a type digit, an optional `/namespace,` prefix, an optional ack
//! id, and JSON data.

use serde::Deserialize;
use serde_json::Value;

use crate::{FxcmError, Result};

/// Engine.IO protocol revision spoken by the FXCM socket server.
pub const ENGINE_IO_VERSION: &str = "3";

/// The default Socket.IO namespace.
pub const ROOT_NAMESPACE: &str = "/";

/// Handshake data carried by the Engine.IO `open` packet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default)]
    pub upgrades: Vec<String>,
    /// Milliseconds between client pings.
    pub ping_interval: u64,
    /// Milliseconds the server waits for a ping before closing.
    pub ping_timeout: u64,
}

/// One Engine.IO packet.
#[derive(Debug, Clone, PartialEq)]
pub enum EnginePacket {
    Open(OpenInfo),
    Close,
    Ping(String),
    Pong(String),
    Message(SocketPacket),
    Upgrade,
    Noop,
}

/// One Socket.IO packet carried inside an Engine.IO message.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketPacket {
    Connect {
        namespace: String,
        /// Session id sent by servers speaking Socket.IO 3+.
        sid: Option<String>,
    },
    Disconnect {
        namespace: String,
    },
    Event {
        namespace: String,
        id: Option<u64>,
        data: Value,
    },
    Ack {
        namespace: String,
        id: Option<u64>,
        data: Value,
    },
    Error {
        namespace: String,
        payload: Value,
    },
    /// Binary event or ack; attachments are not supported.
    Binary,
}

impl EnginePacket {
    /// Parses a WebSocket text frame.
    ///
    /// # Errors
    ///
    /// Returns [`FxcmError::MalformedMessage`] for an empty frame or an
    /// unknown packet type, and [`FxcmError::Json`] for an invalid `open`
    /// payload.
    pub fn parse(frame: &str) -> Result<Self> {
        let mut chars = frame.chars();
        let kind = chars
            .next()
            .ok_or_else(|| FxcmError::MalformedMessage("empty engine.io frame".into()))?;
        let body = chars.as_str();

        match kind {
            '0' => Ok(EnginePacket::Open(serde_json::from_str(body)?)),
            '1' => Ok(EnginePacket::Close),
            '2' => Ok(EnginePacket::Ping(body.to_string())),
            '3' => Ok(EnginePacket::Pong(body.to_string())),
            '4' => Ok(EnginePacket::Message(SocketPacket::parse(body)?)),
            '5' => Ok(EnginePacket::Upgrade),
            '6' => Ok(EnginePacket::Noop),
            other => Err(FxcmError::MalformedMessage(format!(
                "unknown engine.io packet type '{other}'"
            ))),
        }
    }

    /// Encodes the packet as a WebSocket text frame.
    pub fn encode(&self) -> String {
        match self {
            EnginePacket::Open(_) => "0".to_string(),
            EnginePacket::Close => "1".to_string(),
            EnginePacket::Ping(data) => format!("2{data}"),
            EnginePacket::Pong(data) => format!("3{data}"),
            EnginePacket::Message(packet) => format!("4{}", packet.encode()),
            EnginePacket::Upgrade => "5".to_string(),
            EnginePacket::Noop => "6".to_string(),
        }
    }
}

impl SocketPacket {
    /// Parses the payload of an Engine.IO message packet.
    ///
    /// Data that is not valid JSON is kept as a string, which is how older
    /// servers deliver error reasons.
    pub fn parse(input: &str) -> Result<Self> {
        let mut chars = input.chars();
        let kind = chars
            .next()
            .ok_or_else(|| FxcmError::MalformedMessage("empty socket.io packet".into()))?;
        let mut rest = chars.as_str();

        let namespace = if rest.starts_with('/') {
            let (namespace, tail) = match rest.find(',') {
                Some(i) => (&rest[..i], &rest[i + 1..]),
                None => (rest, ""),
            };
            rest = tail;
            namespace.to_string()
        } else {
            ROOT_NAMESPACE.to_string()
        };

        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        let id = rest[..digits].parse().ok();
        rest = &rest[digits..];

        let data = if rest.is_empty() {
            None
        } else {
            Some(serde_json::from_str(rest).unwrap_or_else(|_| Value::String(rest.to_string())))
        };

        match kind {
            '0' => Ok(SocketPacket::Connect {
                namespace,
                sid: data
                    .as_ref()
                    .and_then(|d| d.get("sid"))
                    .and_then(Value::as_str)
                    .map(String::from),
            }),
            '1' => Ok(SocketPacket::Disconnect { namespace }),
            '2' => Ok(SocketPacket::Event {
                namespace,
                id,
                data: data.unwrap_or(Value::Null),
            }),
            '3' => Ok(SocketPacket::Ack {
                namespace,
                id,
                data: data.unwrap_or(Value::Null),
            }),
            '4' => Ok(SocketPacket::Error {
                namespace,
                payload: data.unwrap_or(Value::Null),
            }),
            '5' | '6' => Ok(SocketPacket::Binary),
            other => Err(FxcmError::MalformedMessage(format!(
                "unknown socket.io packet type '{other}'"
            ))),
        }
    }

    /// Encodes the packet (without the Engine.IO `4` prefix).
    pub fn encode(&self) -> String {
        let (kind, namespace, id, data) = match self {
            SocketPacket::Connect { namespace, .. } => ('0', namespace, None, None),
            SocketPacket::Disconnect { namespace } => ('1', namespace, None, None),
            SocketPacket::Event {
                namespace,
                id,
                data,
            } => ('2', namespace, *id, Some(data)),
            SocketPacket::Ack {
                namespace,
                id,
                data,
            } => ('3', namespace, *id, Some(data)),
            SocketPacket::Error { namespace, payload } => ('4', namespace, None, Some(payload)),
            SocketPacket::Binary => return "5".to_string(),
        };

        let mut out = String::from(kind);
        if namespace != ROOT_NAMESPACE {
            out.push_str(namespace);
            out.push(',');
        }
        if let Some(id) = id {
            out.push_str(&id.to_string());
        }
        if let Some(data) = data {
            out.push_str(&data.to_string());
        }
        out
    }

    /// The event name of an [`SocketPacket::Event`], if any.
    pub fn event_name(&self) -> Option<&str> {
        match self {
            SocketPacket::Event { data, .. } => data.get(0).and_then(Value::as_str),
            _ => None,
        }
    }
}

/// A Socket.IO error payload rendered for messages and logs.
pub fn describe_payload(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
