//! Bounded sliding window of pose keypoint frames for one track.

use std::collections::VecDeque;

use ndarray::{Array2, Array3, Axis};

/// Fixed-capacity FIFO of (N, 3) keypoint frames (x, y, joint score).
///
/// Pushing at capacity evicts the oldest frame, so the window always
/// holds the most recent `capacity` observations in arrival order. The
/// action classifier consumes the window only once it is full.
#[derive(Debug, Clone)]
pub struct PoseHistory {
    frames: VecDeque<Array2<f32>>,
    capacity: usize,
}

impl PoseHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a keypoint frame, returning the evicted frame if the
    /// window was full.
    pub fn push(&mut self, keypoints: Array2<f32>) -> Option<Array2<f32>> {
        let evicted = if self.frames.len() == self.capacity {
            self.frames.pop_front()
        } else {
            None
        };
        self.frames.push_back(keypoints);
        evicted
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.frames.len() == self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Most recent frame.
    #[inline]
    pub fn latest(&self) -> Option<&Array2<f32>> {
        self.frames.back()
    }

    /// Oldest-to-newest iteration.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Array2<f32>> {
        self.frames.iter()
    }

    /// Stack the window into a (len, N, 3) array, oldest first, for the
    /// action classifier.
    pub fn to_array(&self) -> Array3<f32> {
        let views: Vec<_> = self.frames.iter().map(|f| f.view()).collect();
        ndarray::stack(Axis(0), &views).expect("history frames share one keypoint layout")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn frame(tag: f32) -> Array2<f32> {
        Array2::from_elem((13, 3), tag)
    }

    #[test]
    fn test_window_never_exceeds_capacity() {
        let mut history = PoseHistory::with_capacity(30);
        for i in 0..45 {
            history.push(frame(i as f32));
            assert!(history.len() <= 30);
        }
        assert!(history.is_full());
    }

    #[test]
    fn test_eviction_is_fifo() {
        let mut history = PoseHistory::with_capacity(30);
        for i in 0..30 {
            assert!(history.push(frame(i as f32)).is_none());
        }
        // 31st push evicts the oldest frame (tag 0).
        let evicted = history.push(frame(30.0)).unwrap();
        assert_eq!(evicted[[0, 0]], 0.0);

        let tags: Vec<f32> = history.iter().map(|f| f[[0, 0]]).collect();
        let expected: Vec<f32> = (1..=30).map(|i| i as f32).collect();
        assert_eq!(tags, expected);
    }

    #[test]
    fn test_to_array_is_oldest_first() {
        let mut history = PoseHistory::with_capacity(3);
        for i in 0..3 {
            history.push(frame(i as f32));
        }
        let arr = history.to_array();
        assert_eq!(arr.dim(), (3, 13, 3));
        assert_eq!(arr[[0, 0, 0]], 0.0);
        assert_eq!(arr[[2, 0, 0]], 2.0);
    }
}
