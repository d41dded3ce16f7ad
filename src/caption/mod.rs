//! Caption generation: confidence gating, templates and external polishing.

pub mod gate;
pub mod polish;
pub mod templates;

pub use gate::{CaptionMode, CaptionResult, ConfidenceGate, GateDecision, Translator};
pub use polish::{DisabledPolisher, MockPolisher, PolishError, Polisher, polisher_from_config};
