//! Per-session caption preferences and correction bias.

use crate::config::CaptionStyle;
use crate::recognition::token::PhraseToken;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Learned `incorrect → correct` overrides. Last correction wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiasMap {
    overrides: HashMap<PhraseToken, PhraseToken>,
}

impl BiasMap {
    /// Records a correction, replacing any earlier one for `incorrect`.
    pub fn record(&mut self, incorrect: PhraseToken, correct: PhraseToken) {
        self.overrides.insert(incorrect, correct);
    }

    pub fn get(&self, token: PhraseToken) -> Option<PhraseToken> {
        self.overrides.get(&token).copied()
    }

    /// Substitutes a corrected token, but only below `conf_high`; a confident
    /// classification is never silently overridden.
    pub fn apply(&self, token: PhraseToken, confidence: f32, conf_high: f32) -> PhraseToken {
        if confidence >= conf_high {
            return token;
        }
        self.get(token).unwrap_or(token)
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }
}

/// Caption preferences for one session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub style: CaptionStyle,
    pub bias: BiasMap,
}

impl Profile {
    pub fn with_style(style: CaptionStyle) -> Self {
        Self {
            style,
            bias: BiasMap::default(),
        }
    }
}

/// Profile shared between the registry (corrections, style changes) and the
/// session's pipeline worker (reads at translate time).
#[derive(Debug, Clone, Default)]
pub struct SharedProfile(Arc<RwLock<Profile>>);

impl SharedProfile {
    pub fn new(profile: Profile) -> Self {
        Self(Arc::new(RwLock::new(profile)))
    }

    /// Copy of the current profile. A poisoned lock still yields its data.
    pub fn snapshot(&self) -> Profile {
        match self.0.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, f: impl FnOnce(&mut Profile)) {
        match self.0.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use PhraseToken::*;

    #[test]
    fn test_last_correction_wins() {
        let mut bias = BiasMap::default();
        bias.record(Slow, Repeat);
        bias.record(Slow, Thanks);
        assert_eq!(bias.get(Slow), Some(Thanks));
        assert_eq!(bias.len(), 1);
    }

    #[test]
    fn test_bias_applies_below_high_threshold_only() {
        let mut bias = BiasMap::default();
        bias.record(Slow, Repeat);
        assert_eq!(bias.apply(Slow, 0.7, 0.8), Repeat);
        assert_eq!(bias.apply(Slow, 0.8, 0.8), Slow);
        assert_eq!(bias.apply(Slow, 0.95, 0.8), Slow);
        assert_eq!(bias.apply(Hello, 0.5, 0.8), Hello);
    }

    #[test]
    fn test_shared_profile_updates_are_visible_to_snapshots() {
        let shared = SharedProfile::new(Profile::default());
        let reader = shared.clone();
        shared.update(|p| {
            p.style = CaptionStyle::Detailed;
            p.bias.record(Hello, Thanks);
        });
        let snap = reader.snapshot();
        assert_eq!(snap.style, CaptionStyle::Detailed);
        assert_eq!(snap.bias.get(Hello), Some(Thanks));
    }
}
