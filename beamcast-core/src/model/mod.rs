mod peer;
mod signaling;

pub use peer::PeerId;
pub use signaling::{IceServerConfig, SdpKind, SignalMessage};
