#![forbid(unsafe_code)]

//! Horizontal swipe recognition.

use vitrine_core::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    /// Finger moved left: advance.
    Next,
    /// Finger moved right: go back.
    Prev,
}

/// Classify a net touch displacement. A swipe needs `|dx| > |dy|` and
/// `|dx| > threshold`.
#[must_use]
pub fn classify(dx: f64, dy: f64, threshold: f64) -> Option<SwipeDirection> {
    if dx.abs() > dy.abs() && dx.abs() > threshold {
        Some(if dx < 0.0 {
            SwipeDirection::Next
        } else {
            SwipeDirection::Prev
        })
    } else {
        None
    }
}

/// Pairs a touch start with its touch end.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeTracker {
    origin: Option<Point>,
    threshold: f64,
}

impl SwipeTracker {
    #[must_use]
    pub const fn new(threshold: f64) -> Self {
        Self {
            origin: None,
            threshold,
        }
    }

    pub fn begin(&mut self, at: Point) {
        self.origin = Some(at);
    }

    /// Finish the gesture. A touch end without a start is ignored.
    pub fn finish(&mut self, at: Point) -> Option<SwipeDirection> {
        let origin = self.origin.take()?;
        classify(at.x - origin.x, at.y - origin.y, self.threshold)
    }

    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.origin.is_some()
    }
}
