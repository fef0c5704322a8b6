//! Shared test utilities

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use babel_relay::{ClientEvent, ConnectionId, CredentialStore, GatewayClient, Relay, ServerEvent};

/// Build a relay whose gateway points at `base_url` (typically a mock server)
pub fn relay_with_gateway(base_url: &str) -> Arc<Relay> {
    let gateway = GatewayClient::new("test-model").with_base_url(base_url);
    Arc::new(Relay::new(gateway, CredentialStore::new()))
}

/// Build a relay with an unroutable gateway, for tests that never translate
pub fn relay() -> Arc<Relay> {
    relay_with_gateway("http://127.0.0.1:9")
}

/// Attach a connection and immediately join it
pub async fn join(
    relay: &Arc<Relay>,
    name: &str,
) -> (ConnectionId, UnboundedReceiver<ServerEvent>) {
    let id = ConnectionId::new();
    let rx = relay.attach(id).await;
    relay
        .handle(
            id,
            ClientEvent::Join {
                display_name: name.to_string(),
                elevated: false,
            },
        )
        .await;
    (id, rx)
}

/// Receive the next event, waiting for spawned gateway work if needed
pub async fn recv(rx: &mut UnboundedReceiver<ServerEvent>) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

/// Assert that no further event arrives within a short window
pub async fn assert_silent(rx: &mut UnboundedReceiver<ServerEvent>) {
    let res = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
    assert!(res.is_err(), "expected no event, got {res:?}");
}
