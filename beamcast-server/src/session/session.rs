use crate::media::MediaConnection;
use crate::session::candidate_queue::CandidateQueue;
use crate::session::negotiation::NegotiationState;
use beamcast_core::PeerId;

/// Everything the endpoint tracks for one remote peer. Sessions live
/// exclusively inside the engine's table and are only ever touched while
/// handling an event routed to them.
pub struct PeerSession {
    pub identity: PeerId,
    pub connection: MediaConnection,
    pub state: NegotiationState,
    pub candidates: CandidateQueue,
}

impl PeerSession {
    pub fn new(identity: PeerId, connection: MediaConnection) -> Self {
        Self {
            identity,
            connection,
            state: NegotiationState::New,
            candidates: CandidateQueue::new(),
        }
    }
}
