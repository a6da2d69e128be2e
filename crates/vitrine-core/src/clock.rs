//! Monotonic time source.
//!
//! All timing in Vitrine is expressed as milliseconds since an arbitrary
//! origin, matching `performance.now()`. [`MonotonicClock`] reads the
//! platform clock through `web-time` (native and wasm); [`ManualClock`] is
//! settable and shared, for tests and for hosts that feed timestamps in.

use std::cell::Cell;
use std::rc::Rc;

use web_time::Instant;

/// Milliseconds on a monotonic timeline.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Timestamp(f64);

impl Timestamp {
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub const fn from_millis(ms: f64) -> Self {
        Self(ms)
    }

    #[inline]
    pub const fn as_millis(self) -> f64 {
        self.0
    }

    /// Milliseconds elapsed since `earlier`, never negative.
    #[inline]
    pub fn since(self, earlier: Timestamp) -> f64 {
        (self.0 - earlier.0).max(0.0)
    }

    #[inline]
    pub fn add_millis(self, ms: f64) -> Self {
        Self(self.0 + ms)
    }
}

/// A monotonic clock.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Platform clock anchored at construction time.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.origin.elapsed().as_secs_f64() * 1000.0)
    }
}

/// Shared, manually driven clock. Clones observe the same time.
///
/// Time never moves backwards: [`set`](Self::set) ignores earlier values.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn starting_at(ms: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(ms)),
        }
    }

    pub fn set(&self, ms: f64) {
        if ms > self.now.get() {
            self.now.set(ms);
        }
    }

    pub fn advance(&self, ms: f64) {
        self.set(self.now.get() + ms.max(0.0));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp(self.now.get())
    }
}
