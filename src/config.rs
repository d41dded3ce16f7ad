use crate::defaults;
use crate::error::{Result, SigncapError};
use crate::recognition::token::PhraseToken;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    /// Bypass detector, extractor and classifier; cycle the phrase set instead.
    pub debug_tokens: bool,
    pub window: WindowConfig,
    pub detector: DetectorConfig,
    pub features: FeatureConfig,
    pub classifier: ClassifierConfig,
    pub smoothing: SmoothingConfig,
    pub gate: GateConfig,
    pub polish: PolishConfig,
    pub session: SessionConfig,
    pub server: ServerConfig,
}

/// Windowing of the incoming frame stream
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Frames per window (N).
    pub frames: usize,
    /// Informational pairing with `capture_fps`.
    pub target_duration_ms: u64,
    pub capture_fps: f32,
}

/// Signing detector gate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    /// Average per-pair centroid motion (pixels/frame) that must be exceeded.
    pub motion_threshold: f32,
}

/// Feature normalization constants
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FeatureConfig {
    pub frame_width: f32,
    pub frame_height: f32,
    pub motion_scale: f32,
    pub speed_scale: f32,
}

/// One reference vector for a phrase token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrototypeEntry {
    pub token: PhraseToken,
    pub vector: [f32; 4],
}

/// Prototype classifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub distance_scale: f32,
    /// Calibrated prototypes. Empty means the built-in table.
    pub prototypes: Vec<PrototypeEntry>,
}

/// Temporal smoothing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SmoothingConfig {
    /// History capacity (K).
    pub history: usize,
    pub boost: f32,
    pub debounce_factor: f32,
}

/// Confidence gate thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    pub conf_high: f32,
    pub conf_med: f32,
}

/// External caption polishing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolishConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_ms: u64,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Caption style preference
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CaptionStyle {
    #[default]
    Concise,
    Detailed,
}

impl CaptionStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            CaptionStyle::Concise => "concise",
            CaptionStyle::Detailed => "detailed",
        }
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SessionConfig {
    pub idle_timeout_secs: u64,
    /// Completed windows allowed to queue behind the one in flight.
    pub queue_depth: usize,
    pub default_style: CaptionStyle,
}

/// Network server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            frames: defaults::WINDOW_FRAMES,
            target_duration_ms: defaults::WINDOW_TARGET_MS,
            capture_fps: defaults::CAPTURE_FPS,
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            motion_threshold: defaults::MOTION_THRESHOLD,
        }
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            frame_width: defaults::FRAME_WIDTH,
            frame_height: defaults::FRAME_HEIGHT,
            motion_scale: defaults::MOTION_SCALE,
            speed_scale: defaults::SPEED_SCALE,
        }
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            distance_scale: defaults::DISTANCE_SCALE,
            prototypes: Vec::new(),
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            history: defaults::SMOOTHING_HISTORY,
            boost: defaults::SMOOTHING_BOOST,
            debounce_factor: defaults::DEBOUNCE_FACTOR,
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            conf_high: defaults::CONF_HIGH,
            conf_med: defaults::CONF_MED,
        }
    }
}

impl Default for PolishConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: defaults::POLISH_ENDPOINT.to_string(),
            model: defaults::POLISH_MODEL.to_string(),
            api_key_env: defaults::POLISH_API_KEY_ENV.to_string(),
            timeout_ms: defaults::POLISH_TIMEOUT_MS,
            temperature: 0.2,
            max_tokens: 50,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: defaults::SESSION_IDLE_TIMEOUT_SECS,
            queue_depth: defaults::SESSION_QUEUE_DEPTH,
            default_style: CaptionStyle::Concise,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: defaults::LISTEN_ADDR.to_string(),
        }
    }
}

fn invalid(key: &str, message: impl Into<String>) -> SigncapError {
    SigncapError::ConfigInvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing fields use default values. The result is validated.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SigncapError::ConfigFileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                SigncapError::Io(e)
            }
        })?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if the file doesn't exist
    ///
    /// Invalid TOML or invalid values are still errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(SigncapError::ConfigFileNotFound { .. }) => Ok(Self::default()),
            other => other,
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - SIGNCAP_CONF_HIGH → gate.conf_high
    /// - SIGNCAP_CONF_MED → gate.conf_med
    /// - SIGNCAP_WINDOW_FRAMES → window.frames
    /// - SIGNCAP_DEBUG_TOKENS → debug_tokens (1/true/yes)
    /// - SIGNCAP_LLM_MODEL → polish.model
    /// - SIGNCAP_LISTEN → server.listen
    ///
    /// Unparseable numeric values are ignored.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_parse::<f32>("SIGNCAP_CONF_HIGH") {
            self.gate.conf_high = v;
        }
        if let Some(v) = env_parse::<f32>("SIGNCAP_CONF_MED") {
            self.gate.conf_med = v;
        }
        if let Some(v) = env_parse::<usize>("SIGNCAP_WINDOW_FRAMES") {
            self.window.frames = v;
        }
        if let Some(v) = env_nonempty("SIGNCAP_DEBUG_TOKENS") {
            self.debug_tokens = matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }
        if let Some(v) = env_nonempty("SIGNCAP_LLM_MODEL") {
            self.polish.model = v;
        }
        if let Some(v) = env_nonempty("SIGNCAP_LISTEN") {
            self.server.listen = v;
        }
        self
    }

    /// Check cross-field invariants.
    pub fn validate(&self) -> Result<()> {
        if self.window.frames < 2 {
            return Err(invalid("window.frames", "must be at least 2"));
        }
        for (key, value) in [
            ("gate.conf_high", self.gate.conf_high),
            ("gate.conf_med", self.gate.conf_med),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(key, "must be within [0, 1]"));
            }
        }
        if self.gate.conf_med > self.gate.conf_high {
            return Err(invalid("gate.conf_med", "must not exceed gate.conf_high"));
        }
        if self.smoothing.history == 0 {
            return Err(invalid("smoothing.history", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.smoothing.debounce_factor) {
            return Err(invalid("smoothing.debounce_factor", "must be within [0, 1]"));
        }
        if self.smoothing.boost < 0.0 {
            return Err(invalid("smoothing.boost", "must not be negative"));
        }
        for (key, value) in [
            ("features.frame_width", self.features.frame_width),
            ("features.frame_height", self.features.frame_height),
            ("features.motion_scale", self.features.motion_scale),
            ("features.speed_scale", self.features.speed_scale),
            ("classifier.distance_scale", self.classifier.distance_scale),
        ] {
            if value <= 0.0 || !value.is_finite() {
                return Err(invalid(key, "must be positive"));
            }
        }
        if self.polish.timeout_ms == 0 || self.polish.timeout_ms > defaults::MAX_POLISH_TIMEOUT_MS {
            return Err(invalid(
                "polish.timeout_ms",
                format!("must be within 1..={}", defaults::MAX_POLISH_TIMEOUT_MS),
            ));
        }
        if self.session.queue_depth == 0 {
            return Err(invalid("session.queue_depth", "must be at least 1"));
        }
        if !self.classifier.prototypes.is_empty() && self.classifier.prototypes.len() < 2 {
            return Err(invalid(
                "classifier.prototypes",
                "needs at least two entries to rank a runner-up",
            ));
        }
        Ok(())
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/signcap/config.toml on Linux, or a relative
    /// `signcap.toml` when no config directory is known.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("signcap").join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("signcap.toml"))
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env_nonempty(key).and_then(|v| v.trim().parse().ok())
}
