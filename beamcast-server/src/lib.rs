pub mod error;
pub mod media;
pub mod session;
pub mod signaling;

pub use error::{DescriptionSide, EngineError};
pub use media::{ConnectionEvent, MediaConfig, MediaConnection, MediaSource, RemoteTrackSink};
pub use session::{CandidateQueue, NegotiationState, PeerSession, SessionCommand, SessionEngine};
pub use signaling::{SignalingOutput, SignalingRouter, SignalingService, ws_handler};
