//! Landmark window → fixed-length feature vector.

use crate::config::FeatureConfig;
use crate::landmarks::geometry::{LEFT_SLOT, RIGHT_SLOT};
use crate::landmarks::{LandmarkWindow, slot_centroids, window_motion};

/// Number of feature dimensions.
pub const FEATURE_DIM: usize = 4;

/// `[hand_distance, hand_height, motion_magnitude, hand_speed]`, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FeatureVector(pub [f32; FEATURE_DIM]);

impl FeatureVector {
    /// Builds a vector, clamping every component into `[0, 1]`.
    pub fn clamped(values: [f32; FEATURE_DIM]) -> Self {
        Self(values.map(unit_clamp))
    }

    pub fn hand_distance(&self) -> f32 {
        self.0[0]
    }

    pub fn hand_height(&self) -> f32 {
        self.0[1]
    }

    pub fn motion_magnitude(&self) -> f32 {
        self.0[2]
    }

    pub fn hand_speed(&self) -> f32 {
        self.0[3]
    }

    /// Euclidean distance to `other`.
    pub fn distance(&self, other: &FeatureVector) -> f32 {
        self.0
            .iter()
            .zip(other.0.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

fn unit_clamp(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// Extracts features from a full window. Never fails; missing hands
/// contribute zero to the affected term.
pub fn extract_features(window: &LandmarkWindow, config: &FeatureConfig) -> FeatureVector {
    let diagonal = config.frame_width.hypot(config.frame_height);

    let hand_distance = window
        .frames()
        .last()
        .map(slot_centroids)
        .and_then(|slots| match (slots[LEFT_SLOT], slots[RIGHT_SLOT]) {
            (Some(left), Some(right)) => Some(left.distance(right) / diagonal),
            _ => None,
        })
        .unwrap_or(0.0);

    let (height_sum, height_count) = window
        .frames()
        .iter()
        .flat_map(|f| slot_centroids(f).into_iter().flatten())
        .fold((0.0f32, 0usize), |(sum, n), c| {
            (sum + c.y / config.frame_height, n + 1)
        });
    let hand_height = if height_count == 0 {
        0.0
    } else {
        height_sum / height_count as f32
    };

    let motion = window_motion(window);
    let motion_magnitude = motion.total / config.motion_scale;
    let hand_speed = motion.average_per_transition() / config.speed_scale;

    FeatureVector::clamped([hand_distance, hand_height, motion_magnitude, hand_speed])
}
