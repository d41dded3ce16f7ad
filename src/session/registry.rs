//! Session registry: the only owner of per-session frame buffers and profiles.

use crate::config::CaptionStyle;
use crate::error::Result;
use crate::landmarks::{LandmarkFrame, LandmarkWindow};
use crate::recognition::token::PhraseToken;
use crate::session::buffer::WindowBuffer;
use crate::session::profile::{Profile, SharedProfile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Identifies one signer in one call.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionKey {
    pub session: String,
    pub user: String,
}

impl SessionKey {
    pub fn new(session: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            user: user.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.session, self.user)
    }
}

#[derive(Debug)]
struct SessionState {
    buffer: WindowBuffer,
    profile: SharedProfile,
    last_seen: Instant,
}

/// Maps session keys to their state. Created on first sight, destroyed on
/// [`end_session`](Self::end_session) or idle expiry.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<SessionKey, SessionState>,
    window_size: usize,
    default_style: CaptionStyle,
}

impl SessionRegistry {
    pub fn new(window_size: usize, default_style: CaptionStyle) -> Self {
        Self {
            sessions: HashMap::new(),
            window_size,
            default_style,
        }
    }

    fn state_mut(&mut self, key: &SessionKey) -> &mut SessionState {
        let window_size = self.window_size;
        let default_style = self.default_style;
        self.sessions.entry(key.clone()).or_insert_with(|| {
            info!("Session {} started", key);
            SessionState {
                buffer: WindowBuffer::new(window_size),
                profile: SharedProfile::new(Profile::with_style(default_style)),
                last_seen: Instant::now(),
            }
        })
    }

    /// Appends `frame` to the session's buffer, returning a window when full.
    pub fn ingest(&mut self, key: &SessionKey, frame: LandmarkFrame) -> Option<LandmarkWindow> {
        let state = self.state_mut(key);
        state.last_seen = Instant::now();
        state.buffer.push(frame)
    }

    /// Drops the session's buffer and profile. Returns whether it existed.
    pub fn end_session(&mut self, key: &SessionKey) -> bool {
        let existed = self.sessions.remove(key).is_some();
        if existed {
            info!("Session {} ended", key);
        }
        existed
    }

    /// Records `incorrect -> correct` in the session's bias map.
    ///
    /// Both names must be known phrase tokens; otherwise nothing changes.
    pub fn handle_correction(
        &mut self,
        key: &SessionKey,
        incorrect: &str,
        correct: &str,
    ) -> Result<PhraseToken> {
        let incorrect: PhraseToken = incorrect.parse()?;
        let correct: PhraseToken = correct.parse()?;
        let state = self.state_mut(key);
        state.last_seen = Instant::now();
        state.profile.update(|p| p.bias.record(incorrect, correct));
        debug!("Session {} correction {} -> {}", key, incorrect, correct);
        Ok(correct)
    }

    pub fn set_style(&mut self, key: &SessionKey, style: CaptionStyle) {
        let state = self.state_mut(key);
        let mut changed = false;
        state.profile.update(|p| {
            changed = p.style != style;
            p.style = style;
        });
        if changed {
            debug!("Session {} style set to {}", key, style.as_str());
        }
    }

    /// Handle to the session's profile, creating the session if unseen.
    pub fn profile(&mut self, key: &SessionKey) -> SharedProfile {
        self.state_mut(key).profile.clone()
    }

    /// Marks the session active without adding a frame.
    pub fn touch(&mut self, key: &SessionKey) {
        if let Some(state) = self.sessions.get_mut(key) {
            state.last_seen = Instant::now();
        }
    }

    /// Ends every session silent for longer than `idle` and returns their keys.
    pub fn expire_idle(&mut self, idle: Duration) -> Vec<SessionKey> {
        let now = Instant::now();
        let mut expired: Vec<SessionKey> = self
            .sessions
            .iter()
            .filter(|(_, s)| now.duration_since(s.last_seen) > idle)
            .map(|(k, _)| k.clone())
            .collect();
        expired.sort();
        for key in &expired {
            self.sessions.remove(key);
            info!("Session {} expired after {:?} idle", key, idle);
        }
        expired
    }

    pub fn contains(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    /// Frames waiting in the session's partial window.
    pub fn pending_frames(&self, key: &SessionKey) -> usize {
        self.sessions.get(key).map_or(0, |s| s.buffer.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SigncapError;

    fn registry() -> SessionRegistry {
        SessionRegistry::new(3, CaptionStyle::Concise)
    }

    #[test]
    fn test_key_displays_as_session_colon_user() {
        assert_eq!(SessionKey::new("call-1", "alice").to_string(), "call-1:alice");
    }

    #[test]
    fn test_ingest_creates_session_and_emits_full_windows() {
        let mut reg = registry();
        let key = SessionKey::new("s", "u");
        assert!(reg.is_empty());
        assert!(reg.ingest(&key, LandmarkFrame::empty(0)).is_none());
        assert!(reg.contains(&key));
        assert!(reg.ingest(&key, LandmarkFrame::empty(1)).is_none());
        let window = reg.ingest(&key, LandmarkFrame::empty(2)).unwrap();
        assert_eq!(window.size(), 3);
        assert_eq!(reg.pending_frames(&key), 0);
    }

    #[test]
    fn test_sessions_buffer_independently() {
        let mut reg = registry();
        let a = SessionKey::new("s", "a");
        let b = SessionKey::new("s", "b");
        reg.ingest(&a, LandmarkFrame::empty(0));
        reg.ingest(&a, LandmarkFrame::empty(1));
        reg.ingest(&b, LandmarkFrame::empty(0));
        assert_eq!(reg.pending_frames(&a), 2);
        assert_eq!(reg.pending_frames(&b), 1);
        assert!(reg.ingest(&b, LandmarkFrame::empty(1)).is_none());
        assert!(reg.ingest(&a, LandmarkFrame::empty(2)).is_some());
    }

    #[test]
    fn test_end_session_discards_partial_window() {
        let mut reg = registry();
        let key = SessionKey::new("s", "u");
        reg.ingest(&key, LandmarkFrame::empty(0));
        reg.ingest(&key, LandmarkFrame::empty(1));
        assert!(reg.end_session(&key));
        assert!(!reg.end_session(&key));
        assert!(reg.ingest(&key, LandmarkFrame::empty(2)).is_none());
        assert_eq!(reg.pending_frames(&key), 1);
    }

    #[test]
    fn test_correction_only_affects_its_session() {
        let mut reg = registry();
        let a = SessionKey::new("s", "a");
        let b = SessionKey::new("s", "b");
        reg.ingest(&b, LandmarkFrame::empty(0));
        let corrected = reg.handle_correction(&a, "slow", "REPEAT").unwrap();
        assert_eq!(corrected, PhraseToken::Repeat);
        assert_eq!(
            reg.profile(&a).snapshot().bias.get(PhraseToken::Slow),
            Some(PhraseToken::Repeat)
        );
        assert!(reg.profile(&b).snapshot().bias.is_empty());
    }

    #[test]
    fn test_unknown_correction_token_leaves_bias_untouched() {
        let mut reg = registry();
        let key = SessionKey::new("s", "u");
        let err = reg.handle_correction(&key, "WAVE", "HELLO").unwrap_err();
        assert!(matches!(err, SigncapError::UnknownToken { .. }));
        assert!(reg.profile(&key).snapshot().bias.is_empty());
    }

    #[test]
    fn test_style_updates_shared_profile() {
        let mut reg = registry();
        let key = SessionKey::new("s", "u");
        let profile = reg.profile(&key);
        reg.set_style(&key, CaptionStyle::Detailed);
        assert_eq!(profile.snapshot().style, CaptionStyle::Detailed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let mut reg = registry();
        let old = SessionKey::new("s", "old");
        let fresh = SessionKey::new("s", "fresh");
        reg.ingest(&old, LandmarkFrame::empty(0));
        tokio::time::advance(Duration::from_secs(30)).await;
        reg.ingest(&fresh, LandmarkFrame::empty(0));
        tokio::time::advance(Duration::from_secs(31)).await;

        let expired = reg.expire_idle(Duration::from_secs(60));
        assert_eq!(expired, vec![old.clone()]);
        assert!(!reg.contains(&old));
        assert!(reg.contains(&fresh));
    }
}
