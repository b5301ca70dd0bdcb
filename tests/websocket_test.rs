//! Session lifecycle tests against a scripted Socket.IO server.

mod common;

use std::time::Duration;

use tokio::sync::mpsc;
use wiremock::MockServer;

use common::{NAMESPACE_SID, SESSION_ID, Script, TEST_TOKEN, client_for, spawn_socket_server};
use fxcm_api::{FxcmClient, FxcmError};

const WAIT: Duration = Duration::from_secs(5);

async fn next_frame(frames: &mut mpsc::UnboundedReceiver<String>) -> Option<String> {
    tokio::time::timeout(WAIT, frames.recv()).await.ok().flatten()
}

#[tokio::test]
async fn test_connect_uses_engine_sid_as_session_id() {
    let rest = MockServer::start().await;
    let (client, _frames) = client_for(&rest, Script::Accept).await;

    let session = client.connect().await.expect("Failed to connect");

    assert_eq!(session.id(), SESSION_ID);
    assert!(session.is_open());
}

#[tokio::test]
async fn test_connect_prefers_namespace_sid() {
    let rest = MockServer::start().await;
    let (client, _frames) = client_for(&rest, Script::AckWithSid).await;

    let session = client.connect().await.expect("Failed to connect");

    assert_eq!(session.id(), NAMESPACE_SID);
}

#[tokio::test]
async fn test_namespace_error_fails_connect() {
    let rest = MockServer::start().await;
    let (client, _frames) = client_for(&rest, Script::RejectNamespace).await;

    let err = client.connect().await.unwrap_err();

    assert!(matches!(err, FxcmError::Connection(_)));
    assert!(err.to_string().contains("Invalid token"), "got: {err}");
}

#[tokio::test]
async fn test_rejected_token_fails_connect() {
    let (stream_url, _frames) = spawn_socket_server(Script::Accept).await;
    let tls = fxcm_api::tls::build_tls_config(None).expect("Failed to build TLS config");
    let client = FxcmClient::with_base_url(&stream_url, "wrong-token", tls)
        .expect("Failed to build client");

    let err = client.connect().await.unwrap_err();

    assert!(matches!(err, FxcmError::Connection(_)));
    assert!(err.to_string().starts_with("Connection Error: "));
}

#[tokio::test]
async fn test_close_before_ack_fails_connect() {
    let rest = MockServer::start().await;
    let (client, _frames) = client_for(&rest, Script::CloseEarly).await;

    let err = client.connect().await.unwrap_err();

    assert!(matches!(err, FxcmError::Connection(_)));
}

#[tokio::test]
async fn test_silent_server_times_out() {
    let rest = MockServer::start().await;
    let (client, _frames) = client_for(&rest, Script::OpenOnly).await;
    let client = client.with_connect_timeout(Duration::from_millis(200));

    let result = tokio::time::timeout(WAIT, client.connect()).await;

    let err = result.expect("connect did not give up").unwrap_err();
    assert!(matches!(err, FxcmError::Connection(ref msg) if msg == "timeout"));
}

#[tokio::test]
async fn test_unreachable_host_fails_connect() {
    let tls = fxcm_api::tls::build_tls_config(None).expect("Failed to build TLS config");
    // Port 9 (discard) is not expected to accept connections locally.
    let client = FxcmClient::with_base_url("http://127.0.0.1:9/", TEST_TOKEN, tls)
        .expect("Failed to build client");

    let err = client.connect().await.unwrap_err();

    assert!(matches!(err, FxcmError::Connection(_)));
}

#[tokio::test]
async fn test_disconnect_leaves_namespace() {
    let rest = MockServer::start().await;
    let (client, mut frames) = client_for(&rest, Script::Accept).await;
    let session = client.connect().await.expect("Failed to connect");

    session.disconnect();

    assert_eq!(next_frame(&mut frames).await.as_deref(), Some("41"));
}

#[tokio::test]
async fn test_dropping_session_leaves_namespace() {
    let rest = MockServer::start().await;
    let (client, mut frames) = client_for(&rest, Script::Accept).await;
    let session = client.connect().await.expect("Failed to connect");

    drop(session);

    assert_eq!(next_frame(&mut frames).await.as_deref(), Some("41"));
}

#[tokio::test]
async fn test_server_disconnect_closes_session() {
    let rest = MockServer::start().await;
    let (client, _frames) = client_for(&rest, Script::DisconnectAfterAck).await;
    let session = client.connect().await.expect("Failed to connect");

    let closed = tokio::time::timeout(WAIT, async {
        while session.is_open() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    assert!(closed.is_ok(), "session still open after server disconnect");
}

#[tokio::test]
async fn test_sessions_are_independent() {
    let rest = MockServer::start().await;
    let (client, mut frames) = client_for(&rest, Script::Accept).await;

    let first = client.connect().await.expect("Failed to connect");
    let second = client.connect().await.expect("Failed to connect");

    first.disconnect();
    assert_eq!(next_frame(&mut frames).await.as_deref(), Some("41"));
    assert!(second.is_open());
}
