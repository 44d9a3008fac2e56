use crate::error::EngineError;
use beamcast_core::{PeerId, SdpKind};
use std::sync::Arc;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::track::track_remote::TrackRemote;

/// Everything a live peer connection reports back into the engine loop:
/// callback traffic plus the completions of spawned negotiation steps.
pub enum ConnectionEvent {
    /// The ICE agent discovered a local candidate (Trickle ICE).
    LocalCandidate(PeerId, RTCIceCandidateInit),

    /// Transport-level connection state changed.
    StateChanged(PeerId, RTCPeerConnectionState),

    /// The remote side added a media track.
    RemoteTrack(PeerId, Arc<TrackRemote>),

    /// A spawned create-offer/create-answer step finished.
    DescriptionCreated {
        peer_id: PeerId,
        kind: SdpKind,
        result: Result<RTCSessionDescription, EngineError>,
    },

    /// A spawned set-local-description step finished; on success the applied
    /// description is handed back so it can be transmitted.
    LocalDescriptionApplied {
        peer_id: PeerId,
        kind: SdpKind,
        result: Result<RTCSessionDescription, EngineError>,
    },

    /// A spawned set-remote-description step finished.
    RemoteDescriptionApplied {
        peer_id: PeerId,
        kind: SdpKind,
        result: Result<(), EngineError>,
    },
}
