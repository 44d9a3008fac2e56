use beamcast_core::{PeerId, SdpKind};

use crate::integration::{create_test_engine, init_tracing};
use crate::utils::{CONNECTION_TIMEOUT_MS, TestClient, TestClientConfig, perform_signaling};

#[tokio::test]
async fn test_answer_follows_offer() {
    init_tracing();

    let (router, mut signal_rx, signaling) = create_test_engine();

    let peer_id = PeerId::new();
    let client = TestClient::new(peer_id.clone(), TestClientConfig::default())
        .await
        .expect("Failed to create test client");

    perform_signaling(&client, &router, &mut signal_rx)
        .await
        .expect("Signaling failed");

    client
        .wait_for_connection(CONNECTION_TIMEOUT_MS)
        .await
        .expect("Connection not established");

    // One remote offer obliges exactly one local answer, nothing more.
    let descriptions = signaling.descriptions_for(&peer_id).await;
    assert_eq!(descriptions.len(), 1, "expected exactly one local description");
    assert_eq!(descriptions[0].0, SdpKind::Answer);

    client.close().await.expect("Failed to close client");
}
