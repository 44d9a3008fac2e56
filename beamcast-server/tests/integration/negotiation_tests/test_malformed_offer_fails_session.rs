use beamcast_core::{PeerId, SignalMessage};

use crate::integration::{create_test_engine, init_tracing};
use crate::utils::{CONNECTION_TIMEOUT_MS, TestClient, TestClientConfig, perform_signaling};

#[tokio::test]
async fn test_malformed_offer_fails_only_its_session() {
    init_tracing();

    let (router, mut signal_rx, signaling) = create_test_engine();

    // A peer whose offer cannot be applied ends up failed and silent.
    let broken = PeerId::new();
    router
        .peer_connected(broken.clone())
        .await
        .expect("Engine should stay up");
    router
        .dispatch(
            broken.clone(),
            SignalMessage::Offer {
                sdp: "this is not an sdp".to_owned(),
            },
        )
        .await
        .expect("Engine should stay up");

    // A healthy peer on the same engine is unaffected.
    let peer_id = PeerId::new();
    let client = TestClient::new(peer_id.clone(), TestClientConfig::default())
        .await
        .expect("Failed to create test client");

    perform_signaling(&client, &router, &mut signal_rx)
        .await
        .expect("Healthy peer should still negotiate");

    client
        .wait_for_connection(CONNECTION_TIMEOUT_MS)
        .await
        .expect("Connection not established");

    assert!(
        signaling.descriptions_for(&broken).await.is_empty(),
        "failed session must not emit a description"
    );

    client.close().await.expect("Failed to close client");
}
