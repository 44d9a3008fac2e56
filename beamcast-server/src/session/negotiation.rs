use beamcast_core::SdpKind;

/// Where a session stands in the offer/answer exchange. The in-flight async
/// step, if any, is encoded by the state itself, which is what keeps a
/// session to at most one outstanding create/apply operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    /// Session registered, no negotiation traffic yet.
    New,
    /// Waiting on create-offer.
    CreatingOffer,
    /// Waiting on create-answer.
    CreatingAnswer,
    /// Waiting on set-remote-description for a received offer.
    ApplyingRemoteOffer,
    /// Waiting on set-remote-description for a received answer.
    ApplyingRemoteAnswer,
    /// Waiting on set-local-description for a locally-created description.
    ApplyingLocalDescription,
    /// Negotiation round complete; a further remote offer starts a new one.
    Stable,
    /// A negotiation step failed. Terminal: the session stays registered but
    /// inert, and only connection-state changes are still observed.
    Failed,
}

impl NegotiationState {
    /// True while an async create/apply step is outstanding.
    pub fn op_in_flight(&self) -> bool {
        matches!(
            self,
            NegotiationState::CreatingOffer
                | NegotiationState::CreatingAnswer
                | NegotiationState::ApplyingRemoteOffer
                | NegotiationState::ApplyingRemoteAnswer
                | NegotiationState::ApplyingLocalDescription
        )
    }

    /// State to enter when a remote description of `kind` arrives, if the
    /// session may accept one right now. An offer is welcome whenever the
    /// session is idle; an answer only once our own offer has gone out,
    /// i.e. after the previous round settled. Anything else is a protocol
    /// violation from the remote side and gets dropped by the caller.
    pub fn accept_remote(&self, kind: SdpKind) -> Option<NegotiationState> {
        match (self, kind) {
            (NegotiationState::New | NegotiationState::Stable, SdpKind::Offer) => {
                Some(NegotiationState::ApplyingRemoteOffer)
            }
            (NegotiationState::Stable, SdpKind::Answer) => {
                Some(NegotiationState::ApplyingRemoteAnswer)
            }
            _ => None,
        }
    }
}
