//! Landmark data produced by the upstream hand tracker.

use crate::error::{Result, SigncapError};
use serde::{Deserialize, Serialize};

/// A keypoint in capture pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    pub fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Which hand the tracker believes it saw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

/// One tracked hand.
#[derive(Debug, Clone, PartialEq)]
pub struct Hand {
    pub keypoints: Vec<Point>,
    pub handedness: Handedness,
}

impl Hand {
    /// Builds a hand, rejecting empty or non-finite keypoint sets.
    pub fn new(keypoints: Vec<Point>, handedness: Handedness) -> Result<Self> {
        if keypoints.is_empty() {
            return Err(SigncapError::MalformedFrame {
                message: "hand has no keypoints".to_string(),
            });
        }
        if keypoints.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(SigncapError::MalformedFrame {
                message: "hand has a non-finite keypoint".to_string(),
            });
        }
        Ok(Self {
            keypoints,
            handedness,
        })
    }

    /// Mean of all keypoints.
    pub fn centroid(&self) -> Point {
        let n = self.keypoints.len().max(1) as f32;
        let (sx, sy) = self
            .keypoints
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x, sy + p.y));
        Point::new(sx / n, sy / n)
    }
}

/// Maximum hands a single frame may carry.
pub const MAX_HANDS: usize = 2;

/// All hands observed in one sampled image.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkFrame {
    /// Capture timestamp in milliseconds.
    pub ts: i64,
    pub hands: Vec<Hand>,
}

impl LandmarkFrame {
    pub fn new(ts: i64, hands: Vec<Hand>) -> Result<Self> {
        if hands.len() > MAX_HANDS {
            return Err(SigncapError::MalformedFrame {
                message: format!("{} hands in one frame (max {})", hands.len(), MAX_HANDS),
            });
        }
        Ok(Self { ts, hands })
    }

    /// A frame in which the tracker saw nothing.
    pub fn empty(ts: i64) -> Self {
        Self {
            ts,
            hands: Vec::new(),
        }
    }

    pub fn has_hands(&self) -> bool {
        !self.hands.is_empty()
    }
}

/// A full, fixed-size batch of frames in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkWindow {
    pub ts_start: i64,
    pub ts_end: i64,
    frames: Vec<LandmarkFrame>,
}

impl LandmarkWindow {
    /// Seals a completed buffer into a window.
    ///
    /// Only the window buffer calls this, and only once it holds exactly the
    /// configured frame count, so `frames` is never empty here.
    pub(crate) fn from_full_buffer(frames: Vec<LandmarkFrame>) -> Self {
        let ts_start = frames.first().map(|f| f.ts).unwrap_or_default();
        let ts_end = frames.last().map(|f| f.ts).unwrap_or_default();
        Self {
            ts_start,
            ts_end,
            frames,
        }
    }

    pub fn frames(&self) -> &[LandmarkFrame] {
        &self.frames
    }

    pub fn size(&self) -> usize {
        self.frames.len()
    }

    /// Number of frames with at least one hand.
    pub fn frames_with_hands(&self) -> usize {
        self.frames.iter().filter(|f| f.has_hands()).count()
    }
}
