//! Non-overlapping fixed-size windowing of a frame stream.

use crate::landmarks::{LandmarkFrame, LandmarkWindow};

/// Accumulates frames in arrival order and cuts a window every N frames.
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    frames: Vec<LandmarkFrame>,
    size: usize,
}

impl WindowBuffer {
    /// `size` is clamped to at least 2 so a window always has a transition.
    pub fn new(size: usize) -> Self {
        let size = size.max(2);
        Self {
            frames: Vec::with_capacity(size),
            size,
        }
    }

    /// Appends `frame`; when the buffer fills, returns the window and starts empty.
    pub fn push(&mut self, frame: LandmarkFrame) -> Option<LandmarkWindow> {
        self.frames.push(frame);
        if self.frames.len() < self.size {
            return None;
        }
        let full = std::mem::replace(&mut self.frames, Vec::with_capacity(self.size));
        Some(LandmarkWindow::from_full_buffer(full))
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn window_size(&self) -> usize {
        self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emits_every_n_frames_and_resets() {
        let mut buffer = WindowBuffer::new(3);
        assert!(buffer.push(LandmarkFrame::empty(0)).is_none());
        assert!(buffer.push(LandmarkFrame::empty(1)).is_none());
        let window = buffer.push(LandmarkFrame::empty(2)).unwrap();
        assert_eq!(window.size(), 3);
        assert_eq!((window.ts_start, window.ts_end), (0, 2));
        assert!(buffer.is_empty());

        assert!(buffer.push(LandmarkFrame::empty(3)).is_none());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_keeps_arrival_order_for_out_of_order_timestamps() {
        let mut buffer = WindowBuffer::new(3);
        buffer.push(LandmarkFrame::empty(30));
        buffer.push(LandmarkFrame::empty(10));
        let window = buffer.push(LandmarkFrame::empty(10)).unwrap();
        let ts: Vec<i64> = window.frames().iter().map(|f| f.ts).collect();
        assert_eq!(ts, vec![30, 10, 10]);
    }

    #[test]
    fn test_windows_never_overlap() {
        let mut buffer = WindowBuffer::new(4);
        let windows: Vec<_> = (0..12)
            .filter_map(|ts| buffer.push(LandmarkFrame::empty(ts)))
            .collect();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[1].ts_start, 4);
        assert_eq!(windows[2].ts_end, 11);
    }

    #[test]
    fn test_tiny_size_is_raised_to_two() {
        let buffer = WindowBuffer::new(0);
        assert_eq!(buffer.window_size(), 2);
    }
}
