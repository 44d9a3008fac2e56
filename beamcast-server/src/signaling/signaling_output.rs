use crate::error::EngineError;
use async_trait::async_trait;
use beamcast_core::{PeerId, SdpKind};
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;

/// Outbound half of the signaling channel. Every local description and
/// candidate the engine emits goes through here; there is no other path out.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Deliver a local session description to the peer.
    async fn send_description(
        &self,
        peer_id: PeerId,
        kind: SdpKind,
        sdp: String,
    ) -> Result<(), EngineError>;

    /// Deliver a locally-discovered ICE candidate to the peer.
    async fn send_candidate(
        &self,
        peer_id: PeerId,
        candidate: RTCIceCandidateInit,
    ) -> Result<(), EngineError>;
}
