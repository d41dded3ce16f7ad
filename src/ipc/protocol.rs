//! JSON-lines message protocol between the landmark client and the caption server.

use crate::caption::{CaptionMode, CaptionResult};
use crate::config::CaptionStyle;
use crate::error::{Result, SigncapError};
use crate::landmarks::{Hand, Handedness, LandmarkFrame, Point};
use crate::session::SessionKey;
use serde::{Deserialize, Serialize};

/// One hand as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WireHand {
    /// `[x, y]` pixel coordinates.
    pub keypoints: Vec<[f32; 2]>,
    #[serde(default)]
    pub handedness: Handedness,
}

/// Messages sent by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum InboundMessage {
    /// Landmarks for one sampled image
    Frame {
        session: String,
        user: String,
        ts: i64,
        hands: Vec<WireHand>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<CaptionStyle>,
    },
    /// User feedback that a caption named the wrong sign
    Correction {
        session: String,
        user: String,
        ts: i64,
        incorrect_token: String,
        correct_token: String,
    },
    /// Clear smoothing history for the session
    Reset {
        session: String,
        user: String,
        ts: i64,
    },
    /// The session is over
    End { session: String, user: String },
}

impl InboundMessage {
    /// Serialize message to JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize message from JSON string.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Parses one wire line, mapping failures into the crate error.
    pub fn parse_line(line: &str) -> Result<Self> {
        Self::from_json(line.trim()).map_err(|e| SigncapError::MalformedMessage {
            message: e.to_string(),
        })
    }

    pub fn key(&self) -> SessionKey {
        match self {
            Self::Frame { session, user, .. }
            | Self::Correction { session, user, .. }
            | Self::Reset { session, user, .. }
            | Self::End { session, user } => SessionKey::new(session.as_str(), user.as_str()),
        }
    }
}

/// Validates wire hands into a [`LandmarkFrame`].
pub fn frame_from_wire(ts: i64, hands: &[WireHand]) -> Result<LandmarkFrame> {
    let hands = hands
        .iter()
        .map(|h| {
            let keypoints = h.keypoints.iter().map(|[x, y]| Point::new(*x, *y)).collect();
            Hand::new(keypoints, h.handedness)
        })
        .collect::<Result<Vec<_>>>()?;
    LandmarkFrame::new(ts, hands)
}

/// Messages sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// A caption for one window or a correction acknowledgement
    Caption {
        session: String,
        user: String,
        ts: i64,
        caption: String,
        confidence: f32,
        mode: CaptionMode,
        hands_detected: usize,
    },
}

impl OutboundMessage {
    pub fn caption(key: &SessionKey, result: CaptionResult, hands_detected: usize) -> Self {
        Self::Caption {
            session: key.session.clone(),
            user: key.user.clone(),
            ts: result.ts,
            caption: result.caption,
            confidence: result.confidence,
            mode: result.mode,
            hands_detected,
        }
    }

    /// Serialize message to JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize message from JSON string.
    pub fn from_json(s: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}
