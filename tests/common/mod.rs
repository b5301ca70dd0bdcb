//! Shared test utilities: a scripted Socket.IO server and client helpers.

#![allow(dead_code)]

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tungstenite::Message;
use tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tungstenite::http::StatusCode;
use wiremock::MockServer;

use fxcm_api::{FxcmClient, Session};

/// Token every test client authenticates with.
pub const TEST_TOKEN: &str = "test-token";

/// Engine.IO session id sent by the scripted server.
pub const SESSION_ID: &str = "sid-123";

/// Session id carried by the namespace acknowledgement in
/// [`Script::AckWithSid`].
pub const NAMESPACE_SID: &str = "ns-456";

/// How the scripted server behaves after the WebSocket upgrade.
#[derive(Clone, Copy, Debug)]
pub enum Script {
    /// Open, acknowledge the root namespace, then answer pings.
    Accept,
    /// Like `Accept`, but the acknowledgement carries its own sid.
    AckWithSid,
    /// Open, then refuse the namespace with an error packet.
    RejectNamespace,
    /// Open, then close the socket without acknowledging.
    CloseEarly,
    /// Acknowledge, then immediately leave the namespace and close.
    DisconnectAfterAck,
    /// Open, then stay silent without acknowledging.
    OpenOnly,
}

/// Starts a Socket.IO server on a random local port.
///
/// Returns its base URL and a receiver of every text frame the server got
/// after the handshake.
pub async fn spawn_socket_server(script: Script) -> (String, mpsc::UnboundedReceiver<String>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind socket server");
    let addr = listener.local_addr().expect("no local address");
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream, script, tx.clone()));
        }
    });

    (format!("http://{addr}/"), rx)
}

/// Rejects upgrades that miss the Socket.IO path, protocol or token.
fn check_request(req: &Request, resp: Response) -> Result<Response, ErrorResponse> {
    let query = req.uri().query().unwrap_or_default();
    let token = format!("access_token={TEST_TOKEN}");

    if req.uri().path() == "/socket.io/" && query.contains("EIO=3") && query.contains(&token) {
        Ok(resp)
    } else {
        let mut err = ErrorResponse::new(Some("unauthorized".to_string()));
        *err.status_mut() = StatusCode::UNAUTHORIZED;
        Err(err)
    }
}

async fn serve(stream: TcpStream, script: Script, frames: mpsc::UnboundedSender<String>) {
    let Ok(ws) = tokio_tungstenite::accept_hdr_async(stream, check_request).await else {
        return;
    };
    let (mut write, mut read) = ws.split();

    let open = format!(
        r#"0{{"sid":"{SESSION_ID}","upgrades":[],"pingInterval":25000,"pingTimeout":60000}}"#
    );
    let _ = write.send(Message::Text(open.into())).await;

    match script {
        Script::Accept => {
            let _ = write.send(Message::Text("40".into())).await;
        }
        Script::AckWithSid => {
            let ack = format!(r#"40{{"sid":"{NAMESPACE_SID}"}}"#);
            let _ = write.send(Message::Text(ack.into())).await;
        }
        Script::RejectNamespace => {
            let _ = write.send(Message::Text(r#"44"Invalid token""#.into())).await;
            return;
        }
        Script::CloseEarly => {
            let _ = write.close().await;
            return;
        }
        Script::OpenOnly => {
            // Hold the socket open until the client gives up.
            while let Some(Ok(_)) = read.next().await {}
            return;
        }
        Script::DisconnectAfterAck => {
            let _ = write.send(Message::Text("40".into())).await;
            let _ = write.send(Message::Text("41".into())).await;
            let _ = write.close().await;
            return;
        }
    }

    while let Some(Ok(msg)) = read.next().await {
        match msg {
            Message::Text(text) => {
                let text = text.as_str().to_string();
                if text == "2" {
                    let _ = write.send(Message::Text("3".into())).await;
                }
                let leaving = text == "41";
                let _ = frames.send(text);
                if leaving {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }
}

/// Builds a client whose REST calls go to `rest` and whose socket points
/// at a fresh scripted server.
pub async fn client_for(
    rest: &MockServer,
    script: Script,
) -> (FxcmClient, mpsc::UnboundedReceiver<String>) {
    let (stream_url, frames) = spawn_socket_server(script).await;
    let tls = fxcm_api::tls::build_tls_config(None).expect("failed to build TLS config");
    let client = FxcmClient::with_urls(&rest.uri(), &stream_url, TEST_TOKEN, tls)
        .expect("failed to build client");

    (client, frames)
}

/// A client with an open session against the scripted server.
pub async fn connected_client(rest: &MockServer) -> (FxcmClient, Session) {
    let (client, _frames) = client_for(rest, Script::Accept).await;
    let session = client.connect().await.expect("failed to connect");

    (client, session)
}

/// The `Authorization` header value expected for [`connected_client`].
pub fn expected_authorization() -> String {
    format!("Bearer {SESSION_ID}{TEST_TOKEN}")
}
