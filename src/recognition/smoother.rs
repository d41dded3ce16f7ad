//! Temporal smoothing of per-window predictions.
//!
//! Each session owns a [`SmoothingHistory`]; the [`TemporalSmoother`] itself
//! only carries configuration and can be shared freely.

use crate::config::SmoothingConfig;
use crate::defaults;
use crate::recognition::classifier::{RawPrediction, SmoothedPrediction};
use crate::recognition::token::PhraseToken;
use std::collections::{HashMap, VecDeque};

/// Ring buffer of the last K raw predictions, oldest first.
#[derive(Debug, Clone)]
pub struct SmoothingHistory {
    entries: VecDeque<RawPrediction>,
    capacity: usize,
}

impl SmoothingHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Appends `raw`, evicting the oldest entries beyond capacity.
    fn record(&mut self, raw: RawPrediction) {
        self.entries.push_back(raw);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Forgets every buffered prediction.
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most frequent token; ties go to the most recently observed one.
    pub fn majority(&self) -> Option<PhraseToken> {
        let mut counts: HashMap<PhraseToken, usize> = HashMap::new();
        for entry in &self.entries {
            *counts.entry(entry.token).or_default() += 1;
        }
        let top = counts.values().copied().max()?;
        self.entries
            .iter()
            .rev()
            .map(|e| e.token)
            .find(|t| counts.get(t) == Some(&top))
    }
}

impl Default for SmoothingHistory {
    fn default() -> Self {
        Self::new(defaults::SMOOTHING_HISTORY)
    }
}

/// Debounces outliers and boosts agreement with recent history.
#[derive(Debug, Clone)]
pub struct TemporalSmoother {
    boost: f32,
    debounce_factor: f32,
}

impl Default for TemporalSmoother {
    fn default() -> Self {
        Self::new(&SmoothingConfig::default())
    }
}

impl TemporalSmoother {
    pub fn new(config: &SmoothingConfig) -> Self {
        Self {
            boost: config.boost,
            debounce_factor: config.debounce_factor,
        }
    }

    /// Records `raw` in `history` and returns the smoothed prediction.
    ///
    /// The new prediction is counted in the majority vote. With fewer than
    /// two entries buffered the prediction passes through untouched.
    pub fn smooth(&self, raw: RawPrediction, history: &mut SmoothingHistory) -> SmoothedPrediction {
        history.record(raw);

        if history.len() < 2 {
            return raw;
        }

        let majority = history.majority().unwrap_or(raw.token);

        if raw.token == majority {
            SmoothedPrediction {
                confidence: (raw.confidence + self.boost).min(defaults::CONFIDENCE_CEILING),
                ..raw
            }
        } else {
            SmoothedPrediction {
                token: majority,
                confidence: raw.confidence * self.debounce_factor,
                top2: raw.top2,
                ts: raw.ts,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PhraseToken::*;

    fn raw(token: PhraseToken, confidence: f32, ts: i64) -> RawPrediction {
        RawPrediction {
            token,
            confidence,
            top2: (token, if token == Hello { Thanks } else { Hello }),
            ts,
        }
    }

    #[test]
    fn test_first_prediction_passes_through() {
        let smoother = TemporalSmoother::default();
        let mut history = SmoothingHistory::default();
        let input = raw(Hello, 0.55, 1);
        assert_eq!(smoother.smooth(input, &mut history), input);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_four_agreeing_predictions_are_boosted() {
        let smoother = TemporalSmoother::default();
        let mut history = SmoothingHistory::default();
        let c = 0.6;
        let mut last = None;
        for ts in 0..4 {
            last = Some(smoother.smooth(raw(Slow, c, ts), &mut history));
        }
        let last = last.unwrap();
        assert_eq!(last.token, Slow);
        assert!((last.confidence - (c + 0.2f32).min(0.99)).abs() < 1e-6);
    }

    #[test]
    fn test_boost_is_capped_at_ceiling() {
        let smoother = TemporalSmoother::default();
        let mut history = SmoothingHistory::default();
        smoother.smooth(raw(Hello, 0.95, 0), &mut history);
        let out = smoother.smooth(raw(Hello, 0.95, 1), &mut history);
        assert_eq!(out.confidence, 0.99);
    }

    #[test]
    fn test_outlier_is_debounced_to_majority() {
        let smoother = TemporalSmoother::default();
        let mut history = SmoothingHistory::default();
        for ts in 0..3 {
            smoother.smooth(raw(Thanks, 0.9, ts), &mut history);
        }
        let outlier = raw(Repeat, 0.7, 3);
        let out = smoother.smooth(outlier, &mut history);
        assert_eq!(out.token, Thanks);
        assert!((out.confidence - 0.7 * 0.6).abs() < 1e-6);
        assert_eq!(out.top2, outlier.top2);
        assert_eq!(out.ts, 3);
    }

    #[test]
    fn test_tie_prefers_most_recent_token() {
        let smoother = TemporalSmoother::default();
        let mut history = SmoothingHistory::default();
        smoother.smooth(raw(Hello, 0.6, 0), &mut history);
        smoother.smooth(raw(Hello, 0.6, 1), &mut history);
        smoother.smooth(raw(Slow, 0.6, 2), &mut history);
        // Hello 2, Slow 2: the newest (Slow) wins and is boosted
        let out = smoother.smooth(raw(Slow, 0.6, 3), &mut history);
        assert_eq!(out.token, Slow);
        assert!((out.confidence - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_two_way_split_favours_newcomer() {
        let smoother = TemporalSmoother::default();
        let mut history = SmoothingHistory::default();
        smoother.smooth(raw(Hello, 0.6, 0), &mut history);
        let out = smoother.smooth(raw(Repeat, 0.6, 1), &mut history);
        assert_eq!(out.token, Repeat);
    }

    #[test]
    fn test_oldest_entries_are_evicted() {
        let smoother = TemporalSmoother::default();
        let mut history = SmoothingHistory::default();
        for ts in 0..3 {
            smoother.smooth(raw(Hello, 0.6, ts), &mut history);
        }
        for ts in 3..7 {
            smoother.smooth(raw(Thanks, 0.6, ts), &mut history);
        }
        assert_eq!(history.len(), 4);
        assert_eq!(history.majority(), Some(Thanks));
    }

    #[test]
    fn test_reset_makes_next_prediction_sole_occupant() {
        let smoother = TemporalSmoother::default();
        let mut history = SmoothingHistory::default();
        for ts in 0..4 {
            smoother.smooth(raw(Hello, 0.9, ts), &mut history);
        }
        history.reset();
        assert!(history.is_empty());
        let input = raw(Slow, 0.4, 10);
        assert_eq!(smoother.smooth(input, &mut history), input);
    }

    #[test]
    fn test_replay_after_reset_is_identical() {
        let smoother = TemporalSmoother::default();
        let mut history = SmoothingHistory::default();
        let sequence = [
            raw(Hello, 0.7, 0),
            raw(Hello, 0.5, 1),
            raw(Slow, 0.9, 2),
            raw(Hello, 0.3, 3),
            raw(Repeat, 0.8, 4),
            raw(Repeat, 0.6, 5),
        ];
        let first: Vec<_> = sequence
            .iter()
            .map(|r| smoother.smooth(*r, &mut history))
            .collect();
        history.reset();
        let second: Vec<_> = sequence
            .iter()
            .map(|r| smoother.smooth(*r, &mut history))
            .collect();
        assert_eq!(first, second);
    }
}
