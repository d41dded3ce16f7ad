//! Hand-landmark input types and the geometry computed over them.

pub mod geometry;
pub mod types;

pub use geometry::{WindowMotion, slot_centroids, window_motion};
pub use types::{Hand, Handedness, LandmarkFrame, LandmarkWindow, Point};
