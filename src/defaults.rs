//! Default configuration constants for signcap.
//!
//! Shared by the configuration types and the recognition stages so that a
//! default lives in exactly one place.

/// Frames per recognition window (N).
pub const WINDOW_FRAMES: usize = 10;

/// Target wall-clock duration of one window in milliseconds.
///
/// Informational only: windows are cut by frame count, never by time.
pub const WINDOW_TARGET_MS: u64 = 900;

/// Capture rate the client is expected to sample at.
pub const CAPTURE_FPS: f32 = 8.0;

/// Average per-transition centroid motion (pixels) above which hands count as signing.
pub const MOTION_THRESHOLD: f32 = 5.0;

/// Capture frame width in pixels.
pub const FRAME_WIDTH: f32 = 640.0;

/// Capture frame height in pixels.
pub const FRAME_HEIGHT: f32 = 480.0;

/// Total window motion (pixels) that saturates the `motion_magnitude` feature.
pub const MOTION_SCALE: f32 = 300.0;

/// Per-transition motion (pixels) that saturates the `hand_speed` feature.
pub const SPEED_SCALE: f32 = 40.0;

/// Prototype distance at which classifier confidence reaches zero before clamping.
pub const DISTANCE_SCALE: f32 = 1.0;

/// Classifier confidence floor.
pub const CONFIDENCE_FLOOR: f32 = 0.1;

/// Confidence ceiling shared by classifier and smoother.
pub const CONFIDENCE_CEILING: f32 = 0.99;

/// Prototype distances closer than this are treated as ties.
pub const DISTANCE_TIE_EPSILON: f32 = 1e-6;

/// Smoothing history capacity (K).
pub const SMOOTHING_HISTORY: usize = 4;

/// Confidence added when a prediction agrees with the majority.
pub const SMOOTHING_BOOST: f32 = 0.2;

/// Confidence multiplier when a prediction disagrees with the majority.
pub const DEBOUNCE_FACTOR: f32 = 0.6;

/// At or above this confidence the caption is polished externally.
pub const CONF_HIGH: f32 = 0.80;

/// At or above this confidence a template caption is used; below it, clarification.
pub const CONF_MED: f32 = 0.55;

/// Polish call timeout in milliseconds. Kept under one window cadence.
pub const POLISH_TIMEOUT_MS: u64 = 800;

/// Upper bound accepted for the polish timeout, about three windows.
pub const MAX_POLISH_TIMEOUT_MS: u64 = 3_000;

/// Default polishing model.
pub const POLISH_MODEL: &str = "gpt-4.1-mini";

/// Default OpenAI-compatible endpoint.
pub const POLISH_ENDPOINT: &str = "https://api.openai.com/v1";

/// Environment variable holding the polishing API key.
pub const POLISH_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Sessions silent for this long are ended by the idle sweep.
pub const SESSION_IDLE_TIMEOUT_SECS: u64 = 60;

/// Completed windows allowed to wait behind the one being processed.
pub const SESSION_QUEUE_DEPTH: usize = 2;

/// Default server listen address.
pub const LISTEN_ADDR: &str = "127.0.0.1:8765";

/// Caption emitted when a window shows no signing.
pub const NO_SIGNING_CAPTION: &str = "No signing detected";

/// How often a connection sweeps for idle sessions.
pub const IDLE_SWEEP_INTERVAL_SECS: u64 = 5;

/// Captions buffered per connection before workers wait on the writer.
pub const OUTBOUND_BUFFER: usize = 64;
