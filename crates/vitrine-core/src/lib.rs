#![forbid(unsafe_code)]

//! Core contracts for Vitrine.
//!
//! Vitrine is host-driven: the browser (or a test harness) owns the real DOM
//! and the event loop. This crate defines the narrow surface the interaction
//! state machines talk through:
//!
//! - [`dom::Dom`]: the host DOM trait, addressed by opaque [`dom::NodeId`]s.
//! - [`event::PageEvent`]: input delivered by the host.
//! - [`clock::Clock`]: monotonic milliseconds.
//! - [`motion::Environment`]: media preferences read once at startup.
//! - [`config::PageConfig`]: selectors and timings for every subsystem.
//! - [`error::InteractionError`]: the failure taxonomy.

pub mod clock;
pub mod config;
pub mod dom;
pub mod error;
pub mod event;
pub mod geometry;
#[cfg(feature = "tracing-json")]
pub mod logging;
pub mod motion;

pub use clock::{Clock, ManualClock, MonotonicClock, Timestamp};
pub use dom::{Dom, DomHandle, ElementInfo, NodeId, ObserveOptions};
pub use error::{InteractionError, Result};
pub use event::{EventOutcome, IntersectionEntry, Key, KeyEvent, Modifiers, PageEvent};
pub use geometry::{Point, Rect};
pub use motion::{Environment, PointerCapabilities, ReducedMotion};
