//! Input events delivered by the host.
//!
//! The host forwards a deliberately small event vocabulary: only what the
//! interaction surfaces consume. Targets are the deepest element the browser
//! reported; subsystems resolve ownership with [`Dom::contains`].
//!
//! [`Dom::contains`]: crate::dom::Dom::contains

use bitflags::bitflags;

use crate::dom::NodeId;
use crate::geometry::Point;

bitflags! {
    /// Keyboard modifier state.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// Keys the interaction layer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Tab,
    Enter,
    /// Anything else. Never consumed.
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    #[must_use]
    pub fn from_dom_key(key: &str) -> Self {
        match key {
            "Escape" | "Esc" => Self::Escape,
            "Tab" => Self::Tab,
            "Enter" => Self::Enter,
            _ => Self::Other,
        }
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    #[inline]
    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }
}

/// One `IntersectionObserverEntry`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    /// `intersectionRatio` in `[0, 1]`.
    pub ratio: f64,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    /// Whether this entry qualifies under `threshold`.
    #[inline]
    pub fn passes(&self, threshold: f64) -> bool {
        self.is_intersecting && self.ratio >= threshold
    }
}

/// Host input.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Click { target: NodeId },
    Key(KeyEvent),
    /// Pointer moved anywhere in the document.
    PointerMove { position: Point },
    /// Pointer left `target`, or the document when `None`.
    PointerLeave { target: Option<NodeId> },
    TouchStart { position: Point },
    TouchEnd { position: Point },
    Intersection(IntersectionEntry),
    /// Viewport resized to `width` CSS pixels.
    Resize { width: f64 },
    /// A form control's value changed.
    Change { target: NodeId },
    Submit { target: NodeId },
    /// The captcha widget reported a successful response.
    CaptchaCompleted,
    /// The captcha response expired.
    CaptchaExpired,
}

/// What the host should do with the native event after dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventOutcome {
    pub prevent_default: bool,
}

impl EventOutcome {
    pub const IGNORED: Self = Self {
        prevent_default: false,
    };
    pub const PREVENTED: Self = Self {
        prevent_default: true,
    };

    /// Combine outcomes from several handlers.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            prevent_default: self.prevent_default || other.prevent_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_key_mapping() {
        assert_eq!(Key::from_dom_key("Escape"), Key::Escape);
        assert_eq!(Key::from_dom_key("Esc"), Key::Escape);
        assert_eq!(Key::from_dom_key("Tab"), Key::Tab);
        assert_eq!(Key::from_dom_key("a"), Key::Other);
    }

    #[test]
    fn shift_detection() {
        let ev = KeyEvent::new(Key::Tab).with_modifiers(Modifiers::SHIFT | Modifiers::CTRL);
        assert!(ev.shift());
        assert!(!KeyEvent::new(Key::Tab).shift());
    }

    #[test]
    fn intersection_threshold() {
        let entry = IntersectionEntry {
            target: NodeId::from_raw(1),
            ratio: 0.1,
            is_intersecting: true,
        };
        assert!(entry.passes(0.1));
        assert!(!entry.passes(0.5));
        let leaving = IntersectionEntry {
            is_intersecting: false,
            ratio: 1.0,
            ..entry
        };
        assert!(!leaving.passes(0.0));
    }

    #[test]
    fn outcome_merge() {
        assert_eq!(
            EventOutcome::IGNORED.merge(EventOutcome::PREVENTED),
            EventOutcome::PREVENTED
        );
        assert_eq!(
            EventOutcome::IGNORED.merge(EventOutcome::IGNORED),
            EventOutcome::IGNORED
        );
    }
}
