use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Kind tag of a session description, as it appears on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SdpKind {
    Offer,
    Answer,
}

impl fmt::Display for SdpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SdpKind::Offer => write!(f, "offer"),
            SdpKind::Answer => write!(f, "answer"),
        }
    }
}

/// One signaling frame. The JSON shape is fixed by the browser side:
/// `{"type": "...", "sdp": ..., "candidate": ..., "sdpMid": ..., "sdpMLineIndex": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SignalMessage {
    Connect,
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    Candidate {
        candidate: String,
        #[serde(rename = "sdpMid")]
        sdp_mid: Option<String>,
        #[serde(rename = "sdpMLineIndex")]
        sdp_m_line_index: Option<u16>,
    },
}

impl SignalMessage {
    pub fn description(kind: SdpKind, sdp: String) -> Self {
        match kind {
            SdpKind::Offer => SignalMessage::Offer { sdp },
            SdpKind::Answer => SignalMessage::Answer { sdp },
        }
    }
}
