//! Motion gate that decides whether a window is worth classifying.

use crate::config::DetectorConfig;
use crate::landmarks::{LandmarkWindow, window_motion};

/// Returns true when the hands in `window` are actively signing.
///
/// Requires both:
/// - average per-pair centroid motion strictly above the threshold, where a
///   hand missing from one side of a transition adds zero motion but still
///   counts toward the average;
/// - at least one hand present in a strict majority of frames.
pub fn is_signing(window: &LandmarkWindow, config: &DetectorConfig) -> bool {
    if window.size() < 2 {
        return false;
    }

    let present_in_majority = window.frames_with_hands() * 2 > window.size();
    if !present_in_majority {
        return false;
    }

    window_motion(window).average_per_pair() > config.motion_threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::Handedness;
    use crate::landmarks::types::test_support::*;

    fn default_config() -> DetectorConfig {
        DetectorConfig::default()
    }

    #[test]
    fn test_still_hands_are_not_signing() {
        let w = moving_window(10, 0.0, 200.0);
        assert!(!is_signing(&w, &default_config()));
    }

    #[test]
    fn test_fast_hands_are_signing() {
        let w = moving_window(10, 12.0, 200.0);
        assert!(is_signing(&w, &default_config()));
    }

    #[test]
    fn test_motion_exactly_at_threshold_is_not_signing() {
        let w = moving_window(10, 5.0, 200.0);
        assert!(!is_signing(&w, &default_config()));
    }

    #[test]
    fn test_hands_in_minority_of_frames_are_not_signing() {
        let frames = (0..10)
            .map(|i| {
                if i < 5 {
                    frame(i, vec![hand_at(i as f32 * 50.0, 10.0, Handedness::Left)])
                } else {
                    frame(i, vec![])
                }
            })
            .collect();
        assert!(!is_signing(&window(frames), &default_config()));
    }

    #[test]
    fn test_absent_hand_dilutes_average_motion() {
        // Right hand moves 8 px per transition; left hand only in frame 0.
        // Nine moving pairs plus one zero pair: (9 * 8) / 10 = 7.2.
        let frames = (0..10)
            .map(|i| {
                let mut hands = vec![hand_at(100.0 + 8.0 * i as f32, 50.0, Handedness::Right)];
                if i == 0 {
                    hands.push(hand_at(10.0, 10.0, Handedness::Left));
                }
                frame(i, hands)
            })
            .collect();
        let w = window(frames);
        assert!(is_signing(&w, &default_config()));
        assert!(!is_signing(
            &w,
            &DetectorConfig {
                motion_threshold: 7.5
            }
        ));
    }

    #[test]
    fn test_no_hands_at_all_is_not_signing() {
        let w = window((0..10).map(|i| frame(i, vec![])).collect());
        assert!(!is_signing(&w, &default_config()));
    }
}
