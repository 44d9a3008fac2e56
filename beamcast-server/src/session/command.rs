use beamcast_core::{PeerId, SdpKind};
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;

/// Commands entering the engine from the signaling front.
#[derive(Debug)]
pub enum SessionCommand {
    /// First contact from a peer identity. Idempotent for known peers.
    PeerArrived { peer_id: PeerId },

    /// Ask the endpoint to originate the exchange with a local offer instead
    /// of waiting for the peer to send one.
    BeginNegotiation { peer_id: PeerId },

    /// A remote session description arrived over signaling.
    RemoteDescription {
        peer_id: PeerId,
        kind: SdpKind,
        sdp: String,
    },

    /// A remote ICE candidate arrived over signaling.
    RemoteCandidate {
        peer_id: PeerId,
        candidate: RTCIceCandidateInit,
    },

    /// The peer's signaling channel closed or errored.
    PeerDeparted { peer_id: PeerId },
}
