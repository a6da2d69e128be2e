#![forbid(unsafe_code)]

//! Stack of open overlays with z-ordering and key routing.
//!
//! The `OverlayStack` keeps open overlays in LIFO order. Only the topmost
//! overlay receives Escape and Tab.
//!
//! # Invariants
//!
//! - Z-order is strictly increasing: later overlays are always on top.
//! - Only the top overlay receives key events.
//! - Close ordering is LIFO by default; `remove()` removes from any position.
//!
//! # Failure Modes
//!
//! - `pop()` on empty stack returns `None` (no panic).
//! - `remove()` for an id that is not open returns `None`.

use super::OverlayId;

/// Base z-index for the overlay layer.
pub const BASE_OVERLAY_Z: u32 = 1000;

/// Z-index increment between overlays.
const Z_INCREMENT: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OpenOverlay {
    id: OverlayId,
    z_index: u32,
}

/// Open overlays in z-order (bottom to top).
#[derive(Debug, Clone, Default)]
pub struct OverlayStack {
    open: Vec<OpenOverlay>,
    next_z: u32,
}

impl OverlayStack {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `id` on top. Returns its z-index.
    pub fn push(&mut self, id: OverlayId) -> u32 {
        if self.open.is_empty() {
            self.next_z = 0;
        }
        let z_index = BASE_OVERLAY_Z + self.next_z;
        self.next_z += Z_INCREMENT;
        self.open.push(OpenOverlay { id, z_index });
        z_index
    }

    /// Pop the top overlay.
    pub fn pop(&mut self) -> Option<OverlayId> {
        self.open.pop().map(|o| o.id)
    }

    /// Remove `id` from anywhere in the stack.
    pub fn remove(&mut self, id: OverlayId) -> Option<OverlayId> {
        let idx = self.open.iter().position(|o| o.id == id)?;
        Some(self.open.remove(idx).id)
    }

    #[inline]
    pub fn top(&self) -> Option<OverlayId> {
        self.open.last().map(|o| o.id)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    pub fn contains(&self, id: OverlayId) -> bool {
        self.open.iter().any(|o| o.id == id)
    }

    pub fn z_index(&self, id: OverlayId) -> Option<u32> {
        self.open.iter().find(|o| o.id == id).map(|o| o.z_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stack() {
        let stack = OverlayStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.depth(), 0);
        assert!(stack.top().is_none());
    }

    #[test]
    fn pop_lifo_order() {
        let mut stack = OverlayStack::new();
        stack.push(OverlayId(1));
        stack.push(OverlayId(2));
        stack.push(OverlayId(3));
        assert_eq!(stack.pop(), Some(OverlayId(3)));
        assert_eq!(stack.pop(), Some(OverlayId(2)));
        assert_eq!(stack.pop(), Some(OverlayId(1)));
        assert_eq!(stack.pop(), None);
    }

    #[test]
    fn remove_from_middle() {
        let mut stack = OverlayStack::new();
        stack.push(OverlayId(1));
        stack.push(OverlayId(2));
        assert_eq!(stack.remove(OverlayId(1)), Some(OverlayId(1)));
        assert_eq!(stack.remove(OverlayId(1)), None);
        assert_eq!(stack.top(), Some(OverlayId(2)));
        assert!(!stack.contains(OverlayId(1)));
    }

    #[test]
    fn z_order_increasing() {
        let mut stack = OverlayStack::new();
        let z1 = stack.push(OverlayId(1));
        let z2 = stack.push(OverlayId(2));
        stack.remove(OverlayId(1));
        let z3 = stack.push(OverlayId(3));
        assert_eq!(z1, BASE_OVERLAY_Z);
        assert!(z2 > z1);
        assert!(z3 > z2);
        assert_eq!(stack.z_index(OverlayId(3)), Some(z3));
    }

    #[test]
    fn z_resets_once_stack_empties() {
        let mut stack = OverlayStack::new();
        stack.push(OverlayId(1));
        stack.pop();
        assert_eq!(stack.push(OverlayId(1)), BASE_OVERLAY_Z);
    }
}
