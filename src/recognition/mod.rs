//! Sign recognition: motion gate, features, prototype matching and smoothing.

pub mod classifier;
pub mod debug_tokens;
pub mod detector;
pub mod features;
pub mod smoother;
pub mod token;

pub use classifier::{Prototype, PrototypeClassifier, RawPrediction, SmoothedPrediction};
pub use debug_tokens::DebugTokenSource;
pub use detector::is_signing;
pub use features::{FeatureVector, extract_features};
pub use smoother::{SmoothingHistory, TemporalSmoother};
pub use token::PhraseToken;
