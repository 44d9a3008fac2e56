use anyhow::Result;
use async_trait::async_trait;
use axum::{Router, routing::get};
use clap::Parser;
use colored::*;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use webrtc::api::media_engine::MIME_TYPE_VP8;
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

use beamcast::model::{IceServerConfig, PeerId};
use beamcast::server::{
    MediaConfig, MediaSource, RemoteTrackSink, SessionEngine, SignalingRouter, SignalingService,
    ws_handler,
};

#[derive(Parser)]
#[command(name = "beamcast", about = "WebRTC media endpoint with WebSocket signaling")]
struct Args {
    /// Port the signaling WebSocket server listens on.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// STUN/TURN URIs handed to every peer connection.
    #[arg(long = "ice-server", default_values_t = vec!["stun:stun.l.google.com:19302".to_owned()])]
    ice_servers: Vec<String>,

    /// Seconds before an in-flight negotiation step is abandoned.
    #[arg(long, default_value_t = 10)]
    op_timeout: u64,
}

/// The endpoint is a sender; remote tracks are unexpected and only logged.
struct LogTrackSink;

#[async_trait]
impl RemoteTrackSink for LogTrackSink {
    async fn on_remote_track(&self, peer_id: PeerId, track: Arc<TrackRemote>) {
        info!("Remote {} track from {:?}", track.kind(), peer_id);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    println!("{}", "📡 Starting beamcast endpoint...".green().bold());

    let config = MediaConfig {
        ice_servers: vec![IceServerConfig {
            urls: args.ice_servers.clone(),
            username: None,
            credential: None,
        }],
        op_timeout: Duration::from_secs(args.op_timeout),
    };

    // Stand-in outgoing track; frame production is wired up externally.
    let source: MediaSource = Arc::new(TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: MIME_TYPE_VP8.to_owned(),
            clock_rate: 90000,
            ..Default::default()
        },
        "video".to_owned(),
        "beamcast".to_owned(),
    ));

    let (cmd_tx, cmd_rx) = mpsc::channel(100);
    let router = SignalingRouter::new(cmd_tx);
    let service = SignalingService::new(router);

    let engine = SessionEngine::new(
        cmd_rx,
        Arc::new(service.clone()),
        Arc::new(LogTrackSink),
        config,
        source,
    );
    tokio::spawn(engine.run());

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .with_state(service);

    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Signaling server listening on ws://{}/ws", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
