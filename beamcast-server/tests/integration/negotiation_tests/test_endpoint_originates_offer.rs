use beamcast_core::{PeerId, SdpKind, SignalMessage};

use crate::integration::{create_test_engine, init_tracing};
use crate::utils::{
    CONNECTION_TIMEOUT_MS, SIGNAL_TIMEOUT_MS, TestClient, TestClientConfig,
    exchange_ice_candidates, wait_for_description,
};

#[tokio::test]
async fn test_endpoint_originates_offer() {
    init_tracing();

    let (router, mut signal_rx, signaling) = create_test_engine();

    let peer_id = PeerId::new();
    let client = TestClient::new(peer_id.clone(), TestClientConfig::default())
        .await
        .expect("Failed to create test client");

    router
        .peer_connected(peer_id.clone())
        .await
        .expect("Engine should stay up");
    router
        .begin_negotiation(peer_id.clone())
        .await
        .expect("Engine should stay up");

    let offer_sdp = wait_for_description(&mut signal_rx, &peer_id, SdpKind::Offer, SIGNAL_TIMEOUT_MS)
        .await
        .expect("No offer emitted");

    let answer = client
        .answer_offer(offer_sdp)
        .await
        .expect("Failed to answer the offer");
    router
        .dispatch(peer_id.clone(), SignalMessage::Answer { sdp: answer })
        .await
        .expect("Engine should stay up");

    // Candidates are applied to the connection the moment they arrive, so
    // give the engine a beat to commit the answer first.
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;

    exchange_ice_candidates(&client, &router, &mut signal_rx)
        .await
        .expect("Candidate exchange failed");

    client
        .wait_for_connection(CONNECTION_TIMEOUT_MS)
        .await
        .expect("Connection not established");

    // The endpoint emitted exactly one description for the round: its offer.
    let descriptions = signaling.descriptions_for(&peer_id).await;
    assert_eq!(descriptions.len(), 1);
    assert_eq!(descriptions[0].0, SdpKind::Offer);

    client.close().await.expect("Failed to close client");
}
