use async_trait::async_trait;
use beamcast_core::PeerId;
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

/// Display-side collaborator. The engine hands every remote track over here
/// and is done with it; rendering is not its business.
#[async_trait]
pub trait RemoteTrackSink: Send + Sync {
    async fn on_remote_track(&self, peer_id: PeerId, track: Arc<TrackRemote>);
}
