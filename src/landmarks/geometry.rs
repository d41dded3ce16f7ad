//! Hand-slot geometry shared by the signing detector and the feature extractor.
//!
//! Each frame is mapped onto two fixed slots, left (0) and right (1). A hand
//! labeled `Left` or `Right` takes its own slot; unlabeled hands fill the
//! remaining free slots in arrival order. Motion is then measured per slot
//! between consecutive frames, so a hand is only ever compared with itself.

use crate::landmarks::types::{Handedness, LandmarkFrame, LandmarkWindow, MAX_HANDS, Point};

pub const LEFT_SLOT: usize = 0;
pub const RIGHT_SLOT: usize = 1;

/// Per-slot hand centroids of one frame.
pub type SlotCentroids = [Option<Point>; MAX_HANDS];

/// Assigns the frame's hands to slots and returns their centroids.
pub fn slot_centroids(frame: &LandmarkFrame) -> SlotCentroids {
    let mut slots: SlotCentroids = [None; MAX_HANDS];
    let mut unlabeled = Vec::new();

    for hand in &frame.hands {
        let preferred = match hand.handedness {
            Handedness::Left => Some(LEFT_SLOT),
            Handedness::Right => Some(RIGHT_SLOT),
            Handedness::Unknown => None,
        };
        match preferred {
            Some(slot) if slots[slot].is_none() => slots[slot] = Some(hand.centroid()),
            _ => unlabeled.push(hand.centroid()),
        }
    }

    for centroid in unlabeled {
        if let Some(free) = slots.iter_mut().find(|s| s.is_none()) {
            *free = Some(centroid);
        }
    }

    slots
}

/// Motion between two consecutive frames.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransitionMotion {
    /// Sum of per-slot centroid displacements (pixels).
    pub displacement: f32,
    /// Hand pairs this transition contributes to an average.
    ///
    /// Counts every slot occupied in either frame; a slot with the hand
    /// missing on one side adds zero displacement but still counts.
    pub pairs: usize,
}

/// Measures per-slot centroid displacement between `prev` and `next`.
pub fn transition_motion(prev: &SlotCentroids, next: &SlotCentroids) -> TransitionMotion {
    let mut motion = TransitionMotion::default();
    for (a, b) in prev.iter().zip(next.iter()) {
        match (a, b) {
            (Some(a), Some(b)) => {
                motion.displacement += a.distance(*b);
                motion.pairs += 1;
            }
            (Some(_), None) | (None, Some(_)) => motion.pairs += 1,
            (None, None) => {}
        }
    }
    motion
}

/// Aggregate motion over a whole window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WindowMotion {
    /// Sum of all displacements across all transitions (pixels).
    pub total: f32,
    /// Hand pairs counted across all transitions.
    pub pairs: usize,
    /// Number of consecutive-frame transitions (`size - 1`).
    pub transitions: usize,
}

impl WindowMotion {
    /// Mean displacement per hand pair; zero when no hand was ever seen.
    pub fn average_per_pair(&self) -> f32 {
        if self.pairs == 0 {
            0.0
        } else {
            self.total / self.pairs as f32
        }
    }

    /// Mean displacement per transition.
    pub fn average_per_transition(&self) -> f32 {
        if self.transitions == 0 {
            0.0
        } else {
            self.total / self.transitions as f32
        }
    }
}

/// Sums slot motion over every consecutive frame pair of the window.
pub fn window_motion(window: &LandmarkWindow) -> WindowMotion {
    let slots: Vec<SlotCentroids> = window.frames().iter().map(slot_centroids).collect();
    slots
        .windows(2)
        .map(|pair| transition_motion(&pair[0], &pair[1]))
        .fold(
            WindowMotion {
                transitions: slots.len().saturating_sub(1),
                ..WindowMotion::default()
            },
            |mut acc, t| {
                acc.total += t.displacement;
                acc.pairs += t.pairs;
                acc
            },
        )
}
