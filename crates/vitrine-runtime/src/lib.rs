#![forbid(unsafe_code)]

//! Single-threaded runtime services for Vitrine.
//!
//! # Role in Vitrine
//! `vitrine-runtime` holds the shared, mutable pieces every interaction
//! subsystem leans on: the host-pumped [`Scheduler`], reactive
//! [`Observable`] state, the reference-counted [`ScrollLock`], the global
//! [`ListenerRegistry`], and the session [`LocaleContext`]. They are bundled
//! into one [`AppContext`] built at startup.
//!
//! # How it fits in the system
//! The host owns the event loop and calls [`Scheduler::run_frame`] once per
//! animation frame. Nothing here spawns threads or touches globals.

pub mod context;
pub mod listeners;
pub mod locale;
pub mod reactive;
pub mod scheduler;
pub mod scroll_lock;

pub use context::AppContext;
pub use listeners::{ListenerGuard, ListenerKind, ListenerRegistry};
pub use locale::{LocaleContext, Message, NumberFormat};
pub use reactive::{Observable, Subscription};
pub use scheduler::{FrameId, Scheduler, TimerId};
pub use scroll_lock::{SCROLL_LOCK_CLASS, ScrollLock, ScrollLockGuard};
