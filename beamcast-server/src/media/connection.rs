use crate::error::{DescriptionSide, EngineError};
use crate::media::config::MediaConfig;
use crate::media::event::ConnectionEvent;
use beamcast_core::{PeerId, SdpKind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

/// Opaque handle to whatever produces the endpoint's outgoing media. The
/// negotiation core attaches it to each connection and never looks inside.
pub type MediaSource = Arc<dyn TrackLocal + Send + Sync>;

/// Owning wrapper around one peer's `RTCPeerConnection`. Construction wires
/// the connection's callbacks into the engine event channel; negotiation
/// steps are exposed as separate async operations so the engine can drive
/// them one at a time.
#[derive(Clone)]
pub struct MediaConnection {
    peer_id: PeerId,
    pc: Arc<RTCPeerConnection>,
}

impl MediaConnection {
    /// Build a configured peer connection for `peer_id` with the local media
    /// source attached. `event_tx` is the channel the connection reports
    /// into for the engine's main loop.
    pub async fn new(
        peer_id: PeerId,
        config: &MediaConfig,
        source: MediaSource,
        event_tx: mpsc::Sender<ConnectionEvent>,
    ) -> Result<Self, EngineError> {
        let setup = |e| EngineError::ConnectionSetup {
            peer_id: peer_id.clone(),
            source: e,
        };

        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs().map_err(setup)?;

        let registry =
            register_default_interceptors(Registry::new(), &mut media_engine).map_err(setup)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: config
                .ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                })
                .collect(),
            ..Default::default()
        };

        let pc = Arc::new(api.new_peer_connection(rtc_config).await.map_err(setup)?);

        // Connection-level state, observed for logging and diagnostics.
        let state_tx = event_tx.clone();
        let state_peer = peer_id.clone();
        pc.on_peer_connection_state_change(Box::new(move |state: RTCPeerConnectionState| {
            let tx = state_tx.clone();
            let peer_id = state_peer.clone();

            Box::pin(async move {
                let _ = tx.send(ConnectionEvent::StateChanged(peer_id, state)).await;
            })
        }));

        // Trickle ICE: every discovered candidate goes to the engine, which
        // decides whether it may be transmitted yet.
        let ice_tx = event_tx.clone();
        let ice_peer = peer_id.clone();
        pc.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            let peer_id = ice_peer.clone();

            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let _ = tx.send(ConnectionEvent::LocalCandidate(peer_id, init)).await;
            })
        }));

        let track_tx = event_tx.clone();
        let track_peer = peer_id.clone();
        pc.on_track(Box::new(move |track: Arc<TrackRemote>, _receiver, _transceiver| {
            let tx = track_tx.clone();
            let peer_id = track_peer.clone();

            Box::pin(async move {
                debug!("Remote {} track from {:?}", track.kind(), peer_id);
                let _ = tx.send(ConnectionEvent::RemoteTrack(peer_id, track)).await;
            })
        }));

        let sender = pc.add_track(Arc::clone(&source)).await.map_err(setup)?;

        // Drain RTCP on the sender so the interceptors keep running.
        tokio::spawn(async move {
            let mut rtcp_buf = vec![0u8; 1500];
            while let Ok((_, _)) = sender.read(&mut rtcp_buf).await {}
        });

        info!("Created peer connection for {:?}", peer_id);

        Ok(Self { peer_id, pc })
    }

    /// Create a local offer or answer. Does not touch the local description;
    /// applying it is a separate step.
    pub async fn create_description(
        &self,
        kind: SdpKind,
    ) -> Result<RTCSessionDescription, EngineError> {
        debug!("Creating {} for {:?}", kind, self.peer_id);

        let result = match kind {
            SdpKind::Offer => self.pc.create_offer(None).await,
            SdpKind::Answer => self.pc.create_answer(None).await,
        };
        result.map_err(|e| EngineError::DescriptionCreation { kind, source: e })
    }

    /// Commit a locally-created description to the connection.
    pub async fn apply_local(
        &self,
        kind: SdpKind,
        desc: RTCSessionDescription,
    ) -> Result<(), EngineError> {
        debug!("Applying local {} for {:?}", kind, self.peer_id);

        self.pc
            .set_local_description(desc)
            .await
            .map_err(|e| EngineError::DescriptionApplication {
                side: DescriptionSide::Local,
                kind,
                source: e,
            })
    }

    /// Apply a description received from the peer.
    pub async fn apply_remote(&self, kind: SdpKind, sdp: String) -> Result<(), EngineError> {
        debug!("Applying remote {} for {:?}", kind, self.peer_id);

        let application = |source| EngineError::DescriptionApplication {
            side: DescriptionSide::Remote,
            kind,
            source,
        };

        let desc = match kind {
            SdpKind::Offer => RTCSessionDescription::offer(sdp),
            SdpKind::Answer => RTCSessionDescription::answer(sdp),
        }
        .map_err(application)?;

        self.pc.set_remote_description(desc).await.map_err(application)
    }

    /// Add a remote ICE candidate (Trickle ICE).
    pub async fn add_remote_candidate(
        &self,
        candidate: RTCIceCandidateInit,
    ) -> Result<(), webrtc::Error> {
        self.pc.add_ice_candidate(candidate).await
    }

    /// Close the underlying connection; no callbacks fire afterwards.
    pub async fn close(&self) -> Result<(), webrtc::Error> {
        self.pc.close().await
    }
}
