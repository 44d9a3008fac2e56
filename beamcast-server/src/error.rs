use beamcast_core::{PeerId, SdpKind};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Which side of the connection a description was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DescriptionSide {
    Local,
    Remote,
}

impl fmt::Display for DescriptionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptionSide::Local => write!(f, "local"),
            DescriptionSide::Remote => write!(f, "remote"),
        }
    }
}

/// Failures surfaced by the negotiation core. Every one of them is
/// session-local: the engine logs it and keeps serving other peers.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to construct peer connection for {peer_id}: {source}")]
    ConnectionSetup {
        peer_id: PeerId,
        #[source]
        source: webrtc::Error,
    },

    #[error("failed to create local {kind}: {source}")]
    DescriptionCreation {
        kind: SdpKind,
        #[source]
        source: webrtc::Error,
    },

    #[error("failed to apply {side} {kind}: {source}")]
    DescriptionApplication {
        side: DescriptionSide,
        kind: SdpKind,
        #[source]
        source: webrtc::Error,
    },

    #[error("negotiation step timed out after {0:?}")]
    OperationTimeout(Duration),

    #[error("no session registered for peer {0}")]
    UnknownPeer(PeerId),

    #[error("failed to deliver signal to {peer_id}: {reason}")]
    TransportSend { peer_id: PeerId, reason: String },

    #[error("session engine is not running")]
    EngineClosed,
}
