pub mod model;

pub use model::{IceServerConfig, PeerId, SdpKind, SignalMessage};
