use beamcast_core::PeerId;

use crate::integration::{create_test_engine, init_tracing};
use crate::utils::{
    CONNECTION_TIMEOUT_MS, OutboundSignal, TestClient, TestClientConfig, perform_signaling,
};

#[tokio::test]
async fn test_candidates_follow_the_description() {
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

    let signals = signaling.signals_for(&peer_id).await;

    // The answer leads; every candidate trails it, buffered ones first and
    // in discovery order.
    let first_description = signals
        .iter()
        .position(|s| matches!(s, OutboundSignal::Description { .. }))
        .expect("no description was sent");
    assert_eq!(first_description, 0, "description must precede all candidates");

    let descriptions = signals
        .iter()
        .filter(|s| matches!(s, OutboundSignal::Description { .. }))
        .count();
    assert_eq!(descriptions, 1, "a single round sends a single description");

    let candidates = signaling.candidates_for(&peer_id).await;
    assert!(
        !candidates.is_empty(),
        "expected at least one trickled host candidate"
    );

    client.close().await.expect("Failed to close client");
}
