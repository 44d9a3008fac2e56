use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;

/// Holds locally-discovered ICE candidates until the session's local
/// description has gone out. A candidate sent before the description it
/// belongs to would be meaningless to the remote side, so everything queues
/// up; once released, the queue steps aside for good and later candidates
/// pass straight through.
#[derive(Default)]
pub struct CandidateQueue {
    released: bool,
    pending: Vec<RTCIceCandidateInit>,
}

impl CandidateQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Either buffers the candidate or hands it back for immediate
    /// transmission.
    pub fn enqueue(&mut self, candidate: RTCIceCandidateInit) -> Option<RTCIceCandidateInit> {
        if self.released {
            Some(candidate)
        } else {
            self.pending.push(candidate);
            None
        }
    }

    /// Marks the local description as transmitted and drains the backlog in
    /// discovery order.
    pub fn release(&mut self) -> Vec<RTCIceCandidateInit> {
        self.released = true;
        std::mem::take(&mut self.pending)
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}
