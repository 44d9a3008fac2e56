use anyhow::{Context, Result};
use tokio::sync::mpsc;

use beamcast_core::{PeerId, SdpKind, SignalMessage};
use beamcast_server::SignalingRouter;

use super::mock_signaling::OutboundSignal;
use super::test_client::TestClient;

/// Timeout for signal exchange operations (ms).
pub const SIGNAL_TIMEOUT_MS: u64 = 5000;

/// Timeout for ICE gathering (ms).
pub const ICE_GATHERING_TIMEOUT_MS: u64 = 3000;

/// Timeout for connection establishment (ms).
pub const CONNECTION_TIMEOUT_MS: u64 = 10000;

/// Helper to perform the full signaling exchange between a TestClient and
/// the engine: connect, offer, answer, trickled candidates both ways.
pub async fn perform_signaling(
    client: &TestClient,
    router: &SignalingRouter,
    signal_rx: &mut mpsc::UnboundedReceiver<OutboundSignal>,
) -> Result<()> {
    let peer_id = client.peer_id.clone();

    router
        .peer_connected(peer_id.clone())
        .await
        .context("Engine unavailable")?;

    let offer = client
        .create_offer()
        .await
        .context("Failed to create offer")?;
    tracing::debug!("[SignalHelper] Created offer for {:?}", peer_id);

    router
        .dispatch(peer_id.clone(), SignalMessage::Offer { sdp: offer })
        .await
        .context("Failed to dispatch offer")?;

    let answer_sdp = wait_for_description(signal_rx, &peer_id, SdpKind::Answer, SIGNAL_TIMEOUT_MS)
        .await
        .context("Failed to receive answer")?;
    tracing::debug!("[SignalHelper] Received answer for {:?}", peer_id);

    client
        .set_remote_answer(answer_sdp)
        .await
        .context("Failed to set remote answer")?;

    exchange_ice_candidates(client, router, signal_rx).await?;

    Ok(())
}

/// Wait for a local description of the given kind addressed to `peer_id`.
pub async fn wait_for_description(
    signal_rx: &mut mpsc::UnboundedReceiver<OutboundSignal>,
    peer_id: &PeerId,
    kind: SdpKind,
    timeout_ms: u64,
) -> Result<String> {
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);

    loop {
        let recv_timeout =
            tokio::time::timeout(std::time::Duration::from_millis(100), signal_rx.recv());

        match recv_timeout.await {
            Ok(Some(OutboundSignal::Description {
                peer_id: id,
                kind: k,
                sdp,
            })) if &id == peer_id && k == kind => {
                return Ok(sdp);
            }
            Ok(Some(_)) => continue,
            Ok(None) => anyhow::bail!("Signal channel closed"),
            Err(_) => {
                if start.elapsed() > timeout {
                    anyhow::bail!("Timeout waiting for {kind}");
                }
            }
        }
    }
}

/// Exchange ICE candidates between client and engine.
///
/// Runs for a bounded time to let trickled candidates flow both ways.
pub async fn exchange_ice_candidates(
    client: &TestClient,
    router: &SignalingRouter,
    signal_rx: &mut mpsc::UnboundedReceiver<OutboundSignal>,
) -> Result<()> {
    let peer_id = client.peer_id.clone();
    let exchange_duration = std::time::Duration::from_millis(ICE_GATHERING_TIMEOUT_MS);
    let start = std::time::Instant::now();

    let client_candidates = client
        .gather_ice_candidates(ICE_GATHERING_TIMEOUT_MS)
        .await?;

    for init in client_candidates {
        let _ = router
            .dispatch(
                peer_id.clone(),
                SignalMessage::Candidate {
                    candidate: init.candidate,
                    sdp_mid: init.sdp_mid,
                    sdp_m_line_index: init.sdp_mline_index,
                },
            )
            .await;
    }

    while start.elapsed() < exchange_duration {
        let recv_timeout =
            tokio::time::timeout(std::time::Duration::from_millis(100), signal_rx.recv());

        match recv_timeout.await {
            Ok(Some(OutboundSignal::Candidate {
                peer_id: id,
                candidate,
            })) if id == peer_id => {
                if let Err(e) = client.add_ice_candidate(candidate).await {
                    tracing::warn!("[SignalHelper] Failed to add ICE candidate: {}", e);
                }
            }
            Ok(Some(_)) => continue,
            Ok(None) => break,
            Err(_) => continue,
        }
    }

    Ok(())
}
