#![forbid(unsafe_code)]

//! Interaction state machines for Vitrine.
//!
//! Every subsystem mounts from a [`PageConfig`](vitrine_core::config::PageConfig)
//! section against an [`AppContext`](vitrine_runtime::AppContext), talks to
//! the page only through the host [`Dom`](vitrine_core::Dom), and is driven
//! by [`PageEvent`](vitrine_core::PageEvent)s routed through [`Page`].
//!
//! | Module | Surface |
//! |--------|---------|
//! | [`focus_trap`] | Tab cycling inside a container |
//! | [`overlay`] | drawer and detail modal lifecycle, overlay stack |
//! | [`carousel`] | active slide, autoplay, progress bar, swipe |
//! | [`reveal`] | one-shot scroll reveal, catch-copy priming |
//! | [`counter`] | one-shot count-up numbers |
//! | [`pointer`] | parallax and tilt |
//! | [`form`] | submit gating |

pub mod carousel;
pub mod counter;
pub mod focus_trap;
pub mod form;
pub mod overlay;
pub mod page;
pub mod pointer;
pub mod reveal;

pub use carousel::{Carousel, CarouselState, TransitionOrigin};
pub use counter::{CounterAnimator, CounterEntry};
pub use focus_trap::{FocusTrap, TabOutcome};
pub use form::{Captcha, FormGate, NoCaptcha, SubmitDecision};
pub use overlay::{DetailModal, OverlayController, OverlayId, OverlayKind, OverlayStack};
pub use page::Page;
pub use pointer::PointerLayer;
pub use reveal::{RevealEngine, RevealEntry};
