use crate::error::EngineError;
use crate::signaling::router::SignalingRouter;
use crate::signaling::signaling_output::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use beamcast_core::{PeerId, SdpKind, SignalMessage};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;

struct SignalingInner {
    peers: DashMap<PeerId, mpsc::UnboundedSender<Message>>,
}

/// Transport-side peer table plus the outbound send path. Cheap to clone;
/// one instance is shared between the WebSocket handlers and the engine.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) router: SignalingRouter,
}

impl SignalingService {
    pub fn new(router: SignalingRouter) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
            }),
            router,
        }
    }

    pub fn router(&self) -> &SignalingRouter {
        &self.router
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.inner.peers.remove(peer_id);
    }

    pub fn send_signal(&self, peer_id: &PeerId, msg: &SignalMessage) -> Result<(), EngineError> {
        let Some(peer) = self.inner.peers.get(peer_id) else {
            return Err(EngineError::TransportSend {
                peer_id: peer_id.clone(),
                reason: "peer is not connected".to_owned(),
            });
        };

        let json = serde_json::to_string(msg).map_err(|e| EngineError::TransportSend {
            peer_id: peer_id.clone(),
            reason: format!("serialization failed: {e}"),
        })?;

        peer.send(Message::Text(json.into()))
            .map_err(|_| EngineError::TransportSend {
                peer_id: peer_id.clone(),
                reason: "channel closed".to_owned(),
            })
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_description(
        &self,
        peer_id: PeerId,
        kind: SdpKind,
        sdp: String,
    ) -> Result<(), EngineError> {
        let msg = SignalMessage::description(kind, sdp);
        self.send_signal(&peer_id, &msg)
    }

    async fn send_candidate(
        &self,
        peer_id: PeerId,
        candidate: RTCIceCandidateInit,
    ) -> Result<(), EngineError> {
        let msg = SignalMessage::Candidate {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_m_line_index: candidate.sdp_mline_index,
        };
        self.send_signal(&peer_id, &msg)
    }
}
