#![forbid(unsafe_code)]

//! Browser entry point for Vitrine.
//!
//! The page script forwards DOM events to a [`WebSession`] as small JSON
//! objects and calls `frame()` from `requestAnimationFrame`. Everything
//! else (focus, classes, styles, observers) flows back through the
//! `web-sys` backed [`vitrine_core::Dom`] implementation.
//!
//! | Module | Targets | Contents |
//! |--------|---------|----------|
//! | [`input`] | all | JSON wire events, config and environment loading |
//! | [`session`] | all | Mounted page plus JSON dispatch |
//! | `host` | wasm32 | `WebDom` |
//! | `bindings` | wasm32 | `WebSession`, reCAPTCHA bridge |
//!
//! The non-wasm modules are what the tests in this crate exercise; the
//! wasm32 glue only converts between `web-sys` values and those types.

pub mod input;
pub mod session;

#[cfg(target_arch = "wasm32")]
mod bindings;
#[cfg(target_arch = "wasm32")]
mod host;

pub use input::{WireEvent, load_config, load_environment, parse_batch, parse_event};
pub use session::Session;

#[cfg(target_arch = "wasm32")]
pub use bindings::WebSession;
#[cfg(target_arch = "wasm32")]
pub use host::WebDom;
