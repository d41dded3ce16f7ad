//! Nearest-prototype phrase classifier.
//!
//! The prototype table is built once at startup and shared read-only across
//! every session behind an `Arc`. Nothing mutates it at runtime; recalibrated
//! vectors arrive through configuration.

use crate::config::ClassifierConfig;
use crate::defaults;
use crate::error::{Result, SigncapError};
use crate::recognition::features::FeatureVector;
use crate::recognition::token::PhraseToken;

/// Reference vector for one phrase token.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prototype {
    pub token: PhraseToken,
    pub vector: FeatureVector,
}

/// Built-in prototypes in normalized feature space.
pub const DEFAULT_PROTOTYPES: [Prototype; 4] = [
    // Hands apart, raised, moderate waving motion
    Prototype {
        token: PhraseToken::Hello,
        vector: FeatureVector([0.20, 0.35, 0.50, 0.50]),
    },
    // Hands further apart, lower, fast circular motion
    Prototype {
        token: PhraseToken::Repeat,
        vector: FeatureVector([0.30, 0.60, 0.80, 0.80]),
    },
    // Hands close, mid height, slow slide
    Prototype {
        token: PhraseToken::Slow,
        vector: FeatureVector([0.05, 0.60, 0.15, 0.15]),
    },
    // Single hand from chin outward, slight motion
    Prototype {
        token: PhraseToken::Thanks,
        vector: FeatureVector([0.10, 0.45, 0.30, 0.30]),
    },
];

/// One classification of one window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPrediction {
    pub token: PhraseToken,
    /// In `[0, 1]`.
    pub confidence: f32,
    /// Two nearest tokens, nearest first.
    pub top2: (PhraseToken, PhraseToken),
    /// Timestamp of the window's last frame.
    pub ts: i64,
}

/// Smoothed predictions share the raw shape.
pub type SmoothedPrediction = RawPrediction;

/// Nearest-prototype classifier over a fixed table.
#[derive(Debug, Clone)]
pub struct PrototypeClassifier {
    prototypes: Vec<Prototype>,
    distance_scale: f32,
}

impl Default for PrototypeClassifier {
    fn default() -> Self {
        Self {
            prototypes: DEFAULT_PROTOTYPES.to_vec(),
            distance_scale: defaults::DISTANCE_SCALE,
        }
    }
}

impl PrototypeClassifier {
    /// Builds the table from configuration, falling back to the built-in prototypes.
    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let prototypes: Vec<Prototype> = if config.prototypes.is_empty() {
            DEFAULT_PROTOTYPES.to_vec()
        } else {
            config
                .prototypes
                .iter()
                .map(|entry| Prototype {
                    token: entry.token,
                    vector: FeatureVector::clamped(entry.vector),
                })
                .collect()
        };
        Self::new(prototypes, config.distance_scale)
    }

    pub fn new(prototypes: Vec<Prototype>, distance_scale: f32) -> Result<Self> {
        if prototypes.len() < 2 {
            return Err(SigncapError::ConfigInvalidValue {
                key: "classifier.prototypes".to_string(),
                message: "needs at least two prototypes".to_string(),
            });
        }
        if distance_scale <= 0.0 || !distance_scale.is_finite() {
            return Err(SigncapError::ConfigInvalidValue {
                key: "classifier.distance_scale".to_string(),
                message: "must be positive".to_string(),
            });
        }
        Ok(Self {
            prototypes,
            distance_scale,
        })
    }

    pub fn prototypes(&self) -> &[Prototype] {
        &self.prototypes
    }

    /// Classifies `features`, stamping the result with `ts`.
    ///
    /// Always returns a token from the table; ties within
    /// [`defaults::DISTANCE_TIE_EPSILON`] go to the lexicographically
    /// smallest token.
    pub fn predict(&self, features: &FeatureVector, ts: i64) -> RawPrediction {
        let scored: Vec<(PhraseToken, f32)> = self
            .prototypes
            .iter()
            .map(|p| (p.token, features.distance(&p.vector)))
            .collect();

        let first = nearest(&scored, None);
        let second = nearest(&scored, Some(first.0));

        RawPrediction {
            token: first.0,
            confidence: self.confidence_for(first.1),
            top2: (first.0, second.0),
            ts,
        }
    }

    /// Monotonically decreasing in `distance`, clamped to `[0.1, 0.99]`.
    pub fn confidence_for(&self, distance: f32) -> f32 {
        (1.0 - distance / self.distance_scale)
            .clamp(defaults::CONFIDENCE_FLOOR, defaults::CONFIDENCE_CEILING)
    }
}

/// Linear scan for the closest entry, optionally skipping one token.
fn nearest(scored: &[(PhraseToken, f32)], skip: Option<PhraseToken>) -> (PhraseToken, f32) {
    let mut candidates = scored.iter().copied().filter(|(t, _)| Some(*t) != skip);
    // The table always holds at least two distinct entries, so both scans find one.
    let mut best = candidates
        .next()
        .unwrap_or((PhraseToken::ALL[0], f32::INFINITY));
    for (token, distance) in candidates {
        let tied = (distance - best.1).abs() <= defaults::DISTANCE_TIE_EPSILON;
        if (tied && token < best.0) || (!tied && distance < best.1) {
            best = (token, distance);
        }
    }
    best
}
