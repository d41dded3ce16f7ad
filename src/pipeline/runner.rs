//! One pass of the caption pipeline over a completed window.

use crate::caption::{CaptionMode, CaptionResult, ConfidenceGate, Polisher, Translator};
use crate::config::{Config, DetectorConfig, FeatureConfig};
use crate::defaults;
use crate::error::Result;
use crate::landmarks::LandmarkWindow;
use crate::recognition::{
    DebugTokenSource, PrototypeClassifier, SmoothingHistory, TemporalSmoother, extract_features,
    is_signing,
};
use crate::session::Profile;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// Caption for one window, plus how many of its frames showed a hand.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowCaption {
    pub result: CaptionResult,
    pub hands_detected: usize,
}

/// Per-session mutable state the pipeline threads through each run.
#[derive(Debug, Clone)]
pub struct SessionTrack {
    pub history: SmoothingHistory,
    /// Present only in debug-token mode.
    pub debug_source: Option<DebugTokenSource>,
}

impl SessionTrack {
    pub fn new(history_len: usize, debug_tokens: bool) -> Self {
        Self {
            history: SmoothingHistory::new(history_len),
            debug_source: debug_tokens.then(DebugTokenSource::new),
        }
    }

    /// Forgets smoothing history. The debug cycle keeps its position.
    pub fn reset(&mut self) {
        self.history.reset();
    }
}

/// Detector, extractor, classifier, smoother and translator wired together.
///
/// Shared by every session; holds no per-session state.
pub struct CaptionPipeline {
    detector: DetectorConfig,
    features: FeatureConfig,
    classifier: Arc<PrototypeClassifier>,
    smoother: TemporalSmoother,
    translator: Translator,
    history_len: usize,
    debug_tokens: bool,
}

impl CaptionPipeline {
    pub fn new(
        config: &Config,
        classifier: Arc<PrototypeClassifier>,
        polisher: Arc<dyn Polisher>,
    ) -> Self {
        let translator = Translator::new(
            ConfidenceGate::new(&config.gate),
            polisher,
            Duration::from_millis(config.polish.timeout_ms),
        );
        Self {
            detector: config.detector.clone(),
            features: config.features.clone(),
            classifier,
            smoother: TemporalSmoother::new(&config.smoothing),
            translator,
            history_len: config.smoothing.history,
            debug_tokens: config.debug_tokens,
        }
    }

    /// Builds the classifier from configuration and wraps it with `polisher`.
    pub fn from_config(config: &Config, polisher: Arc<dyn Polisher>) -> Result<Self> {
        let classifier = PrototypeClassifier::from_config(&config.classifier)?;
        Ok(Self::new(config, Arc::new(classifier), polisher))
    }

    /// Fresh per-session state matching this pipeline's settings.
    pub fn new_track(&self) -> SessionTrack {
        SessionTrack::new(self.history_len, self.debug_tokens)
    }

    /// Runs every stage over `window` for one session.
    pub async fn run(
        &self,
        window: &LandmarkWindow,
        track: &mut SessionTrack,
        profile: &Profile,
    ) -> WindowCaption {
        let hands_detected = window.frames_with_hands();

        let raw = match track.debug_source.as_mut() {
            Some(source) => source.next_prediction(window.ts_end),
            None => {
                if !is_signing(window, &self.detector) {
                    trace!("Window {}..{} not signing", window.ts_start, window.ts_end);
                    return WindowCaption {
                        result: no_signing(window.ts_end),
                        hands_detected,
                    };
                }
                let features = extract_features(window, &self.features);
                self.classifier.predict(&features, window.ts_end)
            }
        };

        let smoothed = self.smoother.smooth(raw, &mut track.history);
        debug!(
            "Window {}..{}: raw {} {:.2}, smoothed {} {:.2}",
            window.ts_start,
            window.ts_end,
            raw.token,
            raw.confidence,
            smoothed.token,
            smoothed.confidence
        );

        WindowCaption {
            result: self.translator.translate(&smoothed, profile).await,
            hands_detected,
        }
    }
}

fn no_signing(ts: i64) -> CaptionResult {
    CaptionResult {
        caption: defaults::NO_SIGNING_CAPTION.to_string(),
        confidence: 0.0,
        mode: CaptionMode::Template,
        ts,
    }
}
