pub use beamcast_core::model::PeerId;

pub mod model {
    pub use beamcast_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use beamcast_server::*;
}
