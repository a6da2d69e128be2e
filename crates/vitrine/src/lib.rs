#![forbid(unsafe_code)]

//! Vitrine: accessible interaction layer for a static marketing page.
//!
//! This facade re-exports the member crates so a host needs one dependency:
//!
//! - [`core`]: DOM contract, events, clock, configuration, errors.
//! - [`runtime`]: scheduler, reactive state, scroll lock, listeners, locale.
//! - [`widgets`]: overlays, carousel, reveal, counters, pointer effects, form gate.
//! - [`web`] (feature `web`): JSON session and the browser bindings.
//!
//! ```ignore
//! use vitrine::prelude::*;
//!
//! let ctx = AppContext::new(dom, Rc::new(MonotonicClock::new()), &Environment::default());
//! let mut page = Page::mount(&ctx, &PageConfig::default(), Rc::new(NoCaptcha));
//! page.dispatch(&PageEvent::Click { target });
//! page.frame();
//! ```

pub use vitrine_core as core;
pub use vitrine_runtime as runtime;
#[cfg(feature = "web")]
pub use vitrine_web as web;
pub use vitrine_widgets as widgets;

pub use vitrine_core::{InteractionError, Result};

/// Common imports for hosts and tests.
pub mod prelude {
    pub use vitrine_core::config::PageConfig;
    pub use vitrine_core::{
        Clock, Dom, DomHandle, Environment, EventOutcome, InteractionError, Key, KeyEvent,
        ManualClock, MonotonicClock, NodeId, PageEvent, Timestamp,
    };
    pub use vitrine_runtime::{AppContext, Observable, Scheduler};
    pub use vitrine_widgets::{Captcha, NoCaptcha, Page, SubmitDecision};
}
