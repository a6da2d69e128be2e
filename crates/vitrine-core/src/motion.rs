//! Startup-read media preferences.
//!
//! The reduced-motion flag and pointer capabilities are read once, when the
//! host builds the [`Environment`], and never change for the session. Every
//! animating subsystem consults them through the application context instead
//! of querying media features on its own.

use serde::Deserialize;

/// `prefers-reduced-motion: reduce`, frozen for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReducedMotion(bool);

impl ReducedMotion {
    #[must_use]
    pub const fn new(reduce: bool) -> Self {
        Self(reduce)
    }

    #[inline]
    pub const fn is_set(self) -> bool {
        self.0
    }
}

/// `(pointer: fine)` and `(hover: hover)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerCapabilities {
    pub fine: bool,
    pub hover: bool,
}

impl PointerCapabilities {
    /// Touch-primary device.
    pub const COARSE: Self = Self {
        fine: false,
        hover: false,
    };
    /// Mouse or trackpad.
    pub const FINE: Self = Self {
        fine: true,
        hover: true,
    };

    /// Whether pointer-driven transforms make sense at all.
    #[inline]
    pub const fn supports_hover_effects(self) -> bool {
        self.fine && self.hover
    }
}

impl Default for PointerCapabilities {
    fn default() -> Self {
        Self::FINE
    }
}

/// Everything the host reports about the user's environment at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Environment {
    pub reduced_motion: bool,
    pub pointer_fine: bool,
    pub hover: bool,
    /// BCP 47 tag or POSIX locale string; normalized by the runtime.
    pub locale: String,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            pointer_fine: true,
            hover: true,
            locale: "en".to_string(),
        }
    }
}

impl Environment {
    #[must_use]
    pub fn reduced_motion(&self) -> ReducedMotion {
        ReducedMotion::new(self.reduced_motion)
    }

    #[must_use]
    pub fn pointer(&self) -> PointerCapabilities {
        PointerCapabilities {
            fine: self.pointer_fine,
            hover: self.hover,
        }
    }

    #[must_use]
    pub fn with_reduced_motion(mut self, reduce: bool) -> Self {
        self.reduced_motion = reduce;
        self
    }

    #[must_use]
    pub fn with_pointer(mut self, caps: PointerCapabilities) -> Self {
        self.pointer_fine = caps.fine;
        self.hover = caps.hover;
        self
    }

    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }
}
