//! Per-session state: windowing, caption profile and the registry owning both.

pub mod buffer;
pub mod profile;
pub mod registry;

pub use buffer::WindowBuffer;
pub use profile::{BiasMap, Profile, SharedProfile};
pub use registry::{SessionKey, SessionRegistry};
