use beamcast_core::IceServerConfig;
use std::time::Duration;

/// Knobs applied to every peer connection the endpoint creates.
#[derive(Clone)]
pub struct MediaConfig {
    /// STUN/TURN servers handed to the ICE agent.
    pub ice_servers: Vec<IceServerConfig>,
    /// Upper bound on a single description create/apply step; an elapsed
    /// timer fails the session instead of leaving it stuck mid-negotiation.
    pub op_timeout: Duration,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            ice_servers: vec![IceServerConfig {
                urls: vec!["stun:stun.l.google.com:19302".to_owned()],
                username: None,
                credential: None,
            }],
            op_timeout: Duration::from_secs(10),
        }
    }
}
