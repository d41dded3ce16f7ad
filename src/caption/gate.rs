//! Confidence gate and translator.
//!
//! The gate is a pure function of confidence and thresholds. The translator
//! applies correction bias, asks the gate, and only then may call out to the
//! polisher, with a hard timeout and a template fallback.

use crate::caption::polish::{PolishError, Polisher};
use crate::caption::templates;
use crate::config::GateConfig;
use crate::recognition::classifier::SmoothedPrediction;
use crate::recognition::token::PhraseToken;
use crate::session::profile::Profile;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// How a caption was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptionMode {
    Template,
    Llm,
    Uncertain,
}

/// Terminal artifact of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionResult {
    pub caption: String,
    pub confidence: f32,
    pub mode: CaptionMode,
    pub ts: i64,
}

/// Outcome of gating one confidence value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// `confidence >= conf_high`
    Polish,
    /// `conf_med <= confidence < conf_high`
    Template,
    /// `confidence < conf_med`
    Clarify,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceGate {
    pub conf_high: f32,
    pub conf_med: f32,
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new(&GateConfig::default())
    }
}

impl ConfidenceGate {
    pub fn new(config: &GateConfig) -> Self {
        Self {
            conf_high: config.conf_high,
            conf_med: config.conf_med,
        }
    }

    pub fn decide(&self, confidence: f32) -> GateDecision {
        if confidence >= self.conf_high {
            GateDecision::Polish
        } else if confidence >= self.conf_med {
            GateDecision::Template
        } else {
            GateDecision::Clarify
        }
    }
}

/// Turns smoothed predictions into captions for one profile at a time.
pub struct Translator {
    gate: ConfidenceGate,
    polisher: Arc<dyn Polisher>,
    polish_timeout: Duration,
}

impl Translator {
    pub fn new(gate: ConfidenceGate, polisher: Arc<dyn Polisher>, polish_timeout: Duration) -> Self {
        Self {
            gate,
            polisher,
            polish_timeout,
        }
    }

    /// Produces the caption for `smoothed` under `profile`.
    ///
    /// Never fails: a polish error or timeout degrades to the template.
    pub async fn translate(&self, smoothed: &SmoothedPrediction, profile: &Profile) -> CaptionResult {
        let confidence = smoothed.confidence;
        let token = profile
            .bias
            .apply(smoothed.token, confidence, self.gate.conf_high);
        if token != smoothed.token {
            debug!("Applying correction bias: {} -> {}", smoothed.token, token);
        }

        let (caption, mode) = match self.gate.decide(confidence) {
            GateDecision::Clarify => (templates::clarification(smoothed.top2), CaptionMode::Uncertain),
            GateDecision::Template => (
                templates::template(token, profile.style).to_string(),
                CaptionMode::Template,
            ),
            GateDecision::Polish => match self.polish(token, profile).await {
                Ok(text) => (text, CaptionMode::Llm),
                Err(e) => {
                    warn!(
                        "{} polish failed for {}: {}, using template",
                        self.polisher.name(),
                        token,
                        e
                    );
                    (
                        templates::template(token, profile.style).to_string(),
                        CaptionMode::Template,
                    )
                }
            },
        };

        CaptionResult {
            caption,
            confidence,
            mode,
            ts: smoothed.ts,
        }
    }

    async fn polish(&self, token: PhraseToken, profile: &Profile) -> Result<String, PolishError> {
        match tokio::time::timeout(self.polish_timeout, self.polisher.polish(token, profile.style))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(PolishError::Timeout(self.polish_timeout)),
        }
    }
}
