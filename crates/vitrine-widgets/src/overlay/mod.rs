#![forbid(unsafe_code)]

//! Accessible overlays: the navigation drawer and the detail modal.
//!
//! # Lifecycle
//!
//! - **Open**: captures the focused element, takes a scroll-lock hold,
//!   computes the focusable set, focuses its first element (or the trigger),
//!   sets `aria-expanded`, and registers the keydown listener.
//! - **Close**: releases the hold and the listener, restores focus to the
//!   captured element if still attached (else the trigger), and hides the
//!   container from assistive tech after the close transition window. The
//!   deferred hide re-checks the open flag, so a rapid close then reopen is
//!   never hidden.
//!
//! Open overlays form a LIFO [`OverlayStack`]; Escape and Tab go to the top.

mod controller;
mod detail;
mod stack;

pub use controller::{BACKDROP_SHOW_CLASS, OPEN_CLASS, OverlayController, OverlayParts};
pub use detail::DetailModal;
pub use stack::{BASE_OVERLAY_Z, OverlayStack};

/// Handle for a registered overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayId(u32);

impl OverlayId {
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OverlayKind {
    /// Navigation drawer with a fixed toggle.
    Drawer,
    /// Dialog opened from content triggers.
    Modal,
}
