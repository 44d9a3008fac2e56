use crate::error::EngineError;
use crate::session::SessionCommand;
use beamcast_core::{PeerId, SdpKind, SignalMessage};
use tokio::sync::mpsc;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;

/// Inbound dispatch: turns signaling messages into engine commands, keyed by
/// the identity of the channel they arrived on.
#[derive(Clone)]
pub struct SignalingRouter {
    cmd_tx: mpsc::Sender<SessionCommand>,
}

impl SignalingRouter {
    pub fn new(cmd_tx: mpsc::Sender<SessionCommand>) -> Self {
        Self { cmd_tx }
    }

    /// The transport opened a signaling channel for `peer_id`.
    pub async fn peer_connected(&self, peer_id: PeerId) -> Result<(), EngineError> {
        self.send(SessionCommand::PeerArrived { peer_id }).await
    }

    /// The peer's signaling channel closed or errored.
    pub async fn peer_disconnected(&self, peer_id: PeerId) -> Result<(), EngineError> {
        self.send(SessionCommand::PeerDeparted { peer_id }).await
    }

    /// Ask the engine to originate negotiation with `peer_id`.
    pub async fn begin_negotiation(&self, peer_id: PeerId) -> Result<(), EngineError> {
        self.send(SessionCommand::BeginNegotiation { peer_id }).await
    }

    /// Route one inbound message to the session owning `peer_id`.
    pub async fn dispatch(&self, peer_id: PeerId, message: SignalMessage) -> Result<(), EngineError> {
        let cmd = match message {
            SignalMessage::Connect => SessionCommand::PeerArrived { peer_id },
            SignalMessage::Offer { sdp } => SessionCommand::RemoteDescription {
                peer_id,
                kind: SdpKind::Offer,
                sdp,
            },
            SignalMessage::Answer { sdp } => SessionCommand::RemoteDescription {
                peer_id,
                kind: SdpKind::Answer,
                sdp,
            },
            SignalMessage::Candidate {
                candidate,
                sdp_mid,
                sdp_m_line_index,
            } => SessionCommand::RemoteCandidate {
                peer_id,
                candidate: RTCIceCandidateInit {
                    candidate,
                    sdp_mid,
                    sdp_mline_index: sdp_m_line_index,
                    username_fragment: None,
                },
            },
        };
        self.send(cmd).await
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), EngineError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| EngineError::EngineClosed)
    }
}
