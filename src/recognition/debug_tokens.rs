//! Deterministic stand-in for detector, extractor and classifier.
//!
//! Walks the phrase set in order, stepping through low, medium and high
//! confidence on each full lap, so every caption mode shows up without a
//! camera.

use crate::recognition::classifier::RawPrediction;
use crate::recognition::token::PhraseToken;

/// Confidence levels cycled per lap: uncertain, template, polish.
pub const DEBUG_CONFIDENCES: [f32; 3] = [0.30, 0.70, 0.90];

#[derive(Debug, Clone, Default)]
pub struct DebugTokenSource {
    step: usize,
}

impl DebugTokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces the next scripted prediction.
    pub fn next_prediction(&mut self, ts: i64) -> RawPrediction {
        let tokens = PhraseToken::ALL;
        let idx = self.step % tokens.len();
        let lap = self.step / tokens.len();
        self.step = self.step.wrapping_add(1);

        let token = tokens[idx];
        RawPrediction {
            token,
            confidence: DEBUG_CONFIDENCES[lap % DEBUG_CONFIDENCES.len()],
            top2: (token, tokens[(idx + 1) % tokens.len()]),
            ts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycles_tokens_then_confidences() {
        let mut source = DebugTokenSource::new();
        let preds: Vec<_> = (0..12).map(|i| source.next_prediction(i)).collect();

        assert_eq!(preds[0].token, PhraseToken::Hello);
        assert_eq!(preds[1].token, PhraseToken::Repeat);
        assert_eq!(preds[3].token, PhraseToken::Thanks);
        assert_eq!(preds[4].token, PhraseToken::Hello);

        assert_eq!(preds[0].confidence, 0.30);
        assert_eq!(preds[4].confidence, 0.70);
        assert_eq!(preds[8].confidence, 0.90);

        assert_eq!(preds[3].top2, (PhraseToken::Thanks, PhraseToken::Hello));
        assert_eq!(preds[7].ts, 7);
    }

    #[test]
    fn test_two_sources_agree() {
        let mut a = DebugTokenSource::new();
        let mut b = DebugTokenSource::new();
        for ts in 0..20 {
            assert_eq!(a.next_prediction(ts), b.next_prediction(ts));
        }
    }
}
