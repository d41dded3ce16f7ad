//! signcap - Real-time sign-language captions
//!
//! Turns per-session streams of hand landmarks into captions: fixed windows,
//! a motion gate, prototype classification, temporal smoothing and a
//! confidence-gated translator with optional external polishing.

#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
#![warn(clippy::let_underscore_must_use)]

pub mod app;
pub mod caption;
#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod ipc;
pub mod landmarks;
pub mod pipeline;
pub mod recognition;
pub mod session;

// Core traits
pub use caption::Polisher;

// Pipeline
pub use caption::{CaptionMode, CaptionResult, ConfidenceGate, Translator};
pub use pipeline::{CaptionPipeline, CaptionService};
pub use recognition::{PhraseToken, PrototypeClassifier, TemporalSmoother};
pub use session::{SessionKey, SessionRegistry};

// Wire types
pub use ipc::{CaptionServer, InboundMessage, OutboundMessage};
pub use landmarks::{Hand, Handedness, LandmarkFrame, LandmarkWindow};

// Error handling
pub use error::{Result, SigncapError};

// Config
pub use config::{CaptionStyle, Config};

/// Build version string with optional git commit hash.
///
/// Returns `"0.1.0+abc1234"` when git hash is available, `"0.1.0"` otherwise.
pub fn version_string() -> String {
    let version = env!("CARGO_PKG_VERSION");
    match option_env!("GIT_HASH") {
        Some(hash) if !hash.is_empty() => format!("{}+{}", version, hash),
        _ => version.to_string(),
    }
}
