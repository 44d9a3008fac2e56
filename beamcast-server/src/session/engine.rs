use crate::error::EngineError;
use crate::media::{ConnectionEvent, MediaConfig, MediaConnection, MediaSource, RemoteTrackSink};
use crate::session::command::SessionCommand;
use crate::session::negotiation::NegotiationState;
use crate::session::session::PeerSession;
use crate::signaling::SignalingOutput;
use beamcast_core::{PeerId, SdpKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// The negotiation core. Owns every peer session outright and consumes
/// commands from the signaling front and events from the peer connections in
/// a single loop, so all per-session state transitions are serialized.
/// Description create/apply steps are spawned off and report back as events;
/// the loop itself never waits on one.
pub struct SessionEngine {
    sessions: HashMap<PeerId, PeerSession>,
    command_rx: mpsc::Receiver<SessionCommand>,
    event_rx: mpsc::Receiver<ConnectionEvent>,
    event_tx: mpsc::Sender<ConnectionEvent>,
    signaling: Arc<dyn SignalingOutput>,
    track_sink: Arc<dyn RemoteTrackSink>,
    config: MediaConfig,
    source: MediaSource,
}

impl SessionEngine {
    pub fn new(
        command_rx: mpsc::Receiver<SessionCommand>,
        signaling: Arc<dyn SignalingOutput>,
        track_sink: Arc<dyn RemoteTrackSink>,
        config: MediaConfig,
        source: MediaSource,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(256);

        Self {
            sessions: HashMap::new(),
            command_rx,
            event_rx,
            event_tx,
            signaling,
            track_sink,
            config,
            source,
        }
    }

    pub async fn run(mut self) {
        info!("Session engine started");

        loop {
            tokio::select! {
                cmd = self.command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Shutting down engine.");
                            break;
                        }
                    }
                }

                evt = self.event_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_event(e).await,
                        None => {
                            warn!("Connection event channel closed unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        for (peer_id, session) in self.sessions.drain() {
            if let Err(e) = session.connection.close().await {
                warn!("Error closing connection for {:?}: {}", peer_id, e);
            }
        }

        info!("Session engine finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::PeerArrived { peer_id } => self.register_peer(peer_id).await,

            SessionCommand::BeginNegotiation { peer_id } => {
                let conn = match self.sessions.get_mut(&peer_id) {
                    Some(session) if session.state == NegotiationState::New => {
                        session.state = NegotiationState::CreatingOffer;
                        session.connection.clone()
                    }
                    Some(session) => {
                        warn!(
                            "Ignoring negotiation request for {:?} in state {:?}",
                            peer_id, session.state
                        );
                        return;
                    }
                    None => {
                        warn!("{}", EngineError::UnknownPeer(peer_id));
                        return;
                    }
                };
                self.spawn_create(conn, peer_id, SdpKind::Offer);
            }

            SessionCommand::RemoteDescription { peer_id, kind, sdp } => {
                let conn = match self.sessions.get_mut(&peer_id) {
                    Some(session) => match session.state.accept_remote(kind) {
                        Some(next) => {
                            session.state = next;
                            session.connection.clone()
                        }
                        None => {
                            warn!(
                                "Dropping remote {} for {:?} in state {:?}",
                                kind, peer_id, session.state
                            );
                            return;
                        }
                    },
                    None => {
                        warn!("{}", EngineError::UnknownPeer(peer_id));
                        return;
                    }
                };
                self.spawn_apply_remote(conn, peer_id, kind, sdp);
            }

            SessionCommand::RemoteCandidate { peer_id, candidate } => {
                let Some(session) = self.sessions.get(&peer_id) else {
                    warn!("{}", EngineError::UnknownPeer(peer_id));
                    return;
                };
                // Applied right away: the connection exists for exactly as
                // long as the session does.
                if let Err(e) = session.connection.add_remote_candidate(candidate).await {
                    warn!("Failed to add remote candidate for {:?}: {}", peer_id, e);
                }
            }

            SessionCommand::PeerDeparted { peer_id } => self.remove_peer(&peer_id).await,
        }
    }

    async fn handle_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::LocalCandidate(peer_id, candidate) => {
                let ready = match self.sessions.get_mut(&peer_id) {
                    Some(session) => session.candidates.enqueue(candidate),
                    None => {
                        debug!("Dropping local candidate for departed peer {:?}", peer_id);
                        return;
                    }
                };
                match ready {
                    Some(candidate) => {
                        self.transmit_candidate(&peer_id, candidate).await;
                    }
                    None => debug!("Buffered local candidate for {:?}", peer_id),
                }
            }

            ConnectionEvent::StateChanged(peer_id, state) => {
                info!("Connection state for {:?}: {:?}", peer_id, state);
            }

            ConnectionEvent::RemoteTrack(peer_id, track) => {
                info!("Handing off remote {} track from {:?}", track.kind(), peer_id);
                self.track_sink.on_remote_track(peer_id, track).await;
            }

            ConnectionEvent::DescriptionCreated {
                peer_id,
                kind,
                result,
            } => self.on_description_created(peer_id, kind, result),

            ConnectionEvent::LocalDescriptionApplied {
                peer_id,
                kind,
                result,
            } => self.on_local_applied(peer_id, kind, result).await,

            ConnectionEvent::RemoteDescriptionApplied {
                peer_id,
                kind,
                result,
            } => self.on_remote_applied(peer_id, kind, result),
        }
    }

    async fn register_peer(&mut self, peer_id: PeerId) {
        if self.sessions.contains_key(&peer_id) {
            debug!("Peer {:?} is already registered", peer_id);
            return;
        }

        let connection = MediaConnection::new(
            peer_id.clone(),
            &self.config,
            Arc::clone(&self.source),
            self.event_tx.clone(),
        )
        .await;

        match connection {
            Ok(connection) => {
                self.sessions
                    .insert(peer_id.clone(), PeerSession::new(peer_id, connection));
            }
            Err(e) => error!("{}", e),
        }
    }

    async fn remove_peer(&mut self, peer_id: &PeerId) {
        let Some(session) = self.sessions.remove(peer_id) else {
            debug!("Departure for unknown peer {:?}", peer_id);
            return;
        };

        info!(
            "Peer {:?} departed in state {:?}",
            session.identity, session.state
        );
        if let Err(e) = session.connection.close().await {
            warn!("Error closing connection for {:?}: {}", peer_id, e);
        }
    }

    /// A create step finished: on success, move on to applying the created
    /// description locally.
    fn on_description_created(
        &mut self,
        peer_id: PeerId,
        kind: SdpKind,
        result: Result<RTCSessionDescription, EngineError>,
    ) {
        let expected = match kind {
            SdpKind::Offer => NegotiationState::CreatingOffer,
            SdpKind::Answer => NegotiationState::CreatingAnswer,
        };
        let next = match self.completion_target(&peer_id, expected) {
            Some(session) => match result {
                Ok(desc) => {
                    session.state = NegotiationState::ApplyingLocalDescription;
                    Some((session.connection.clone(), desc))
                }
                Err(e) => {
                    error!("Negotiation failed for {:?}: {}", peer_id, e);
                    session.state = NegotiationState::Failed;
                    None
                }
            },
            None => None,
        };

        if let Some((conn, desc)) = next {
            self.spawn_apply_local(conn, peer_id, kind, desc);
        }
    }

    /// The local description is committed: the session settles, the
    /// description goes out, and the candidate backlog follows it in
    /// discovery order.
    async fn on_local_applied(
        &mut self,
        peer_id: PeerId,
        kind: SdpKind,
        result: Result<RTCSessionDescription, EngineError>,
    ) {
        let settled = match self.completion_target(&peer_id, NegotiationState::ApplyingLocalDescription)
        {
            Some(session) => match result {
                Ok(desc) => {
                    session.state = NegotiationState::Stable;
                    Some((desc, session.candidates.release()))
                }
                Err(e) => {
                    error!("Negotiation failed for {:?}: {}", peer_id, e);
                    session.state = NegotiationState::Failed;
                    None
                }
            },
            None => None,
        };
        let Some((desc, backlog)) = settled else {
            return;
        };

        info!("Sending {} to {:?}", kind, peer_id);
        if let Err(e) = self
            .signaling
            .send_description(peer_id.clone(), kind, desc.sdp)
            .await
        {
            // The description never reached the peer; its candidates would
            // be meaningless on their own.
            warn!("{}", e);
            return;
        }

        for candidate in backlog {
            if !self.transmit_candidate(&peer_id, candidate).await {
                break;
            }
        }
    }

    /// A remote description is committed: an offer obliges us to produce an
    /// answer, an answer settles the round.
    fn on_remote_applied(
        &mut self,
        peer_id: PeerId,
        kind: SdpKind,
        result: Result<(), EngineError>,
    ) {
        let expected = match kind {
            SdpKind::Offer => NegotiationState::ApplyingRemoteOffer,
            SdpKind::Answer => NegotiationState::ApplyingRemoteAnswer,
        };
        let follow_up = match self.completion_target(&peer_id, expected) {
            Some(session) => match result {
                Ok(()) => match kind {
                    SdpKind::Offer => {
                        session.state = NegotiationState::CreatingAnswer;
                        Some(session.connection.clone())
                    }
                    SdpKind::Answer => {
                        session.state = NegotiationState::Stable;
                        info!("Negotiation with {:?} settled", peer_id);
                        None
                    }
                },
                Err(e) => {
                    error!("Negotiation failed for {:?}: {}", peer_id, e);
                    session.state = NegotiationState::Failed;
                    None
                }
            },
            None => None,
        };

        if let Some(conn) = follow_up {
            self.spawn_create(conn, peer_id, SdpKind::Answer);
        }
    }

    /// Looks up the session a completion belongs to and checks it is still
    /// waiting on that step. Completions for departed peers or superseded
    /// states are stale and get dropped here.
    fn completion_target(
        &mut self,
        peer_id: &PeerId,
        expected: NegotiationState,
    ) -> Option<&mut PeerSession> {
        let Some(session) = self.sessions.get_mut(peer_id) else {
            debug!("Dropping stale completion for departed peer {:?}", peer_id);
            return None;
        };
        if session.state != expected {
            warn!(
                "Dropping completion for {:?}: expected state {:?}, found {:?}",
                peer_id, expected, session.state
            );
            return None;
        }
        Some(session)
    }

    async fn transmit_candidate(&self, peer_id: &PeerId, candidate: RTCIceCandidateInit) -> bool {
        match self
            .signaling
            .send_candidate(peer_id.clone(), candidate)
            .await
        {
            Ok(()) => true,
            Err(e) => {
                // No retry: whatever is left of this flush is discarded.
                warn!("{}", e);
                false
            }
        }
    }

    fn spawn_create(&self, conn: MediaConnection, peer_id: PeerId, kind: SdpKind) {
        let tx = self.event_tx.clone();
        let op_timeout = self.config.op_timeout;

        tokio::spawn(async move {
            let result = match timeout(op_timeout, conn.create_description(kind)).await {
                Ok(result) => result,
                Err(_) => Err(EngineError::OperationTimeout(op_timeout)),
            };
            let _ = tx
                .send(ConnectionEvent::DescriptionCreated {
                    peer_id,
                    kind,
                    result,
                })
                .await;
        });
    }

    fn spawn_apply_local(
        &self,
        conn: MediaConnection,
        peer_id: PeerId,
        kind: SdpKind,
        desc: RTCSessionDescription,
    ) {
        let tx = self.event_tx.clone();
        let op_timeout = self.config.op_timeout;

        tokio::spawn(async move {
            let result = match timeout(op_timeout, conn.apply_local(kind, desc.clone())).await {
                Ok(Ok(())) => Ok(desc),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(EngineError::OperationTimeout(op_timeout)),
            };
            let _ = tx
                .send(ConnectionEvent::LocalDescriptionApplied {
                    peer_id,
                    kind,
                    result,
                })
                .await;
        });
    }

    fn spawn_apply_remote(
        &self,
        conn: MediaConnection,
        peer_id: PeerId,
        kind: SdpKind,
        sdp: String,
    ) {
        let tx = self.event_tx.clone();
        let op_timeout = self.config.op_timeout;

        tokio::spawn(async move {
            let result = match timeout(op_timeout, conn.apply_remote(kind, sdp)).await {
                Ok(result) => result,
                Err(_) => Err(EngineError::OperationTimeout(op_timeout)),
            };
            let _ = tx
                .send(ConnectionEvent::RemoteDescriptionApplied {
                    peer_id,
                    kind,
                    result,
                })
                .await;
        });
    }
}
