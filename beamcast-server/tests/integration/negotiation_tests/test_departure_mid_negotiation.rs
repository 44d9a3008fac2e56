use std::time::Duration;

use beamcast_core::{PeerId, SignalMessage};

use crate::integration::{create_test_engine, init_tracing};
use crate::utils::{TestClient, TestClientConfig, perform_signaling};

#[tokio::test]
async fn test_departure_mid_negotiation() {
    init_tracing();

    let (router, mut signal_rx, signaling) = create_test_engine();

    // Kick off a negotiation and yank the peer while the answer chain is
    // still in flight.
    let leaver = PeerId::new();
    let leaver_client = TestClient::new(leaver.clone(), TestClientConfig::default())
        .await
        .expect("Failed to create leaver client");

    router
        .peer_connected(leaver.clone())
        .await
        .expect("Engine should stay up");
    let offer = leaver_client
        .create_offer()
        .await
        .expect("Failed to create offer");
    router
        .dispatch(leaver.clone(), SignalMessage::Offer { sdp: offer })
        .await
        .expect("Engine should stay up");
    router
        .peer_disconnected(leaver.clone())
        .await
        .expect("Engine should stay up");

    // Whatever async completions straggle in for the departed session are
    // dropped: after a settling delay, no further traffic appears for it.
    tokio::time::sleep(Duration::from_millis(500)).await;
    let settled = signaling.signals_for(&leaver).await.len();
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(
        signaling.signals_for(&leaver).await.len(),
        settled,
        "departed session kept emitting"
    );

    // The engine keeps serving everyone else.
    let peer_id = PeerId::new();
    let client = TestClient::new(peer_id.clone(), TestClientConfig::default())
        .await
        .expect("Failed to create test client");

    perform_signaling(&client, &router, &mut signal_rx)
        .await
        .expect("Signaling failed");

    leaver_client.close().await.expect("Failed to close leaver");
    client.close().await.expect("Failed to close client");
}
