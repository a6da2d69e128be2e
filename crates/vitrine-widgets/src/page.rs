#![forbid(unsafe_code)]

//! Composition root.
//!
//! [`Page::mount`] brings up every subsystem independently: a page that
//! omits a feature's markup simply runs without it. [`Page::dispatch`]
//! routes host events, and [`Page::frame`] pumps the scheduler once per
//! animation frame.

use std::rc::Rc;

use tracing::{debug, warn};
use vitrine_core::config::PageConfig;
use vitrine_core::{EventOutcome, InteractionError, PageEvent};
use vitrine_runtime::{AppContext, ListenerKind};

use crate::carousel::Carousel;
use crate::counter::CounterAnimator;
use crate::form::{Captcha, FormGate};
use crate::overlay::{DetailModal, OverlayController, OverlayId};
use crate::pointer::PointerLayer;
use crate::reveal::{RevealEngine, prime_catch_copy};

fn optional<T>(feature: &'static str, mounted: Result<T, InteractionError>) -> Option<T> {
    match mounted {
        Ok(value) => Some(value),
        Err(err) if err.is_missing_element() => {
            debug!(feature, %err, "feature not on this page");
            None
        }
        Err(err) => {
            warn!(feature, %err, "feature failed to mount");
            None
        }
    }
}

#[derive(Debug)]
pub struct Page {
    ctx: AppContext,
    overlays: OverlayController,
    drawer: Option<OverlayId>,
    detail: Option<DetailModal>,
    carousel: Option<Carousel>,
    pointer: PointerLayer,
    reveal: Option<RevealEngine>,
    counters: Option<CounterAnimator>,
    form: Option<FormGate>,
}

impl Page {
    pub fn mount(ctx: &AppContext, cfg: &PageConfig, captcha: Rc<dyn Captcha>) -> Self {
        let mut overlays = OverlayController::new(ctx.clone());
        let drawer = optional("menu", overlays.register_drawer(&cfg.menu));
        let detail = optional("modal", DetailModal::mount(ctx, &mut overlays, &cfg.modal));
        let carousel = optional("carousel", Carousel::mount(ctx, &cfg.carousel));
        let pointer = PointerLayer::mount(ctx, &cfg.carousel, &cfg.tilt, &cfg.parallax);
        let reveal = optional("reveal", RevealEngine::mount(ctx, &cfg.reveal));
        let _ = optional("catch copy", prime_catch_copy(ctx, &cfg.catch_copy));
        let counters = optional("counter", CounterAnimator::mount(ctx, &cfg.counter));
        let form = optional("form", FormGate::mount(ctx, &cfg.form, captcha));

        debug!(
            drawer = drawer.is_some(),
            modal = detail.is_some(),
            carousel = carousel.is_some(),
            pointer = pointer.is_active(),
            reveal = reveal.is_some(),
            counters = counters.is_some(),
            form = form.is_some(),
            "page mounted"
        );
        Self {
            ctx: ctx.clone(),
            overlays,
            drawer,
            detail,
            carousel,
            pointer,
            reveal,
            counters,
            form,
        }
    }

    /// Route one host event.
    pub fn dispatch(&mut self, event: &PageEvent) -> EventOutcome {
        match event {
            PageEvent::Click { target } => {
                let mut outcome = self.overlays.handle_click(*target);
                if let Some(detail) = &self.detail {
                    outcome = outcome.merge(detail.handle_click(&mut self.overlays, *target));
                }
                if let Some(carousel) = &self.carousel {
                    outcome = outcome.merge(carousel.handle_click(*target));
                }
                outcome
            }
            PageEvent::Key(key) => {
                if self.ctx.listeners().is_active(ListenerKind::Keydown) {
                    self.overlays.handle_key(key)
                } else {
                    EventOutcome::IGNORED
                }
            }
            PageEvent::PointerMove { position } => {
                self.pointer.pointer_move(*position);
                EventOutcome::IGNORED
            }
            PageEvent::PointerLeave { target } => {
                self.pointer.pointer_leave(*target);
                EventOutcome::IGNORED
            }
            PageEvent::TouchStart { position } => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.handle_touch_start(*position);
                }
                EventOutcome::IGNORED
            }
            PageEvent::TouchEnd { position } => {
                if let Some(carousel) = self.carousel.as_mut() {
                    carousel.handle_touch_end(*position);
                }
                EventOutcome::IGNORED
            }
            PageEvent::Intersection(entry) => {
                if let Some(carousel) = &self.carousel {
                    carousel.handle_intersection(entry);
                }
                if let Some(reveal) = self.reveal.as_mut() {
                    reveal.handle_intersection(entry);
                }
                if let Some(counters) = self.counters.as_mut() {
                    counters.handle_intersection(entry);
                }
                EventOutcome::IGNORED
            }
            PageEvent::Resize { width } => {
                self.overlays.handle_resize(*width);
                EventOutcome::IGNORED
            }
            PageEvent::Change { target } => {
                if let Some(form) = &self.form {
                    form.handle_change(*target);
                }
                EventOutcome::IGNORED
            }
            PageEvent::Submit { target } => self
                .form
                .as_ref()
                .and_then(|form| form.submit(*target))
                .map_or(EventOutcome::IGNORED, |decision| EventOutcome {
                    prevent_default: decision.prevents_default(),
                }),
            PageEvent::CaptchaCompleted => {
                if let Some(form) = &self.form {
                    form.handle_captcha_completed();
                }
                EventOutcome::IGNORED
            }
            PageEvent::CaptchaExpired => {
                if let Some(form) = &self.form {
                    form.handle_captcha_expired();
                }
                EventOutcome::IGNORED
            }
        }
    }

    /// Pump due timers and queued frame callbacks. Returns how many ran.
    pub fn frame(&self) -> usize {
        self.ctx.scheduler().run_frame(self.ctx.now())
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn overlays(&self) -> &OverlayController {
        &self.overlays
    }

    pub fn overlays_mut(&mut self) -> &mut OverlayController {
        &mut self.overlays
    }

    pub fn drawer(&self) -> Option<OverlayId> {
        self.drawer
    }

    pub fn detail(&self) -> Option<&DetailModal> {
        self.detail.as_ref()
    }

    pub fn carousel(&self) -> Option<&Carousel> {
        self.carousel.as_ref()
    }

    pub fn pointer(&self) -> &PointerLayer {
        &self.pointer
    }

    pub fn reveal(&self) -> Option<&RevealEngine> {
        self.reveal.as_ref()
    }

    pub fn counters(&self) -> Option<&CounterAnimator> {
        self.counters.as_ref()
    }

    pub fn form(&self) -> Option<&FormGate> {
        self.form.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::NoCaptcha;
    use vitrine_core::dom::memory::MemoryDom;
    use vitrine_core::{Environment, Key, KeyEvent, ManualClock};

    #[test]
    fn empty_page_mounts_nothing() {
        let dom = Rc::new(MemoryDom::new());
        let ctx = AppContext::new(dom, Rc::new(ManualClock::new()), &Environment::default());
        let mut page = Page::mount(&ctx, &PageConfig::default(), Rc::new(NoCaptcha));
        assert!(page.drawer().is_none());
        assert!(page.carousel().is_none());
        assert!(page.form().is_none());
        assert!(!page.pointer().is_active());
        assert_eq!(
            page.dispatch(&PageEvent::Key(KeyEvent::new(Key::Escape))),
            EventOutcome::IGNORED
        );
        assert_eq!(page.frame(), 0);
    }

    #[tracing_test::traced_test]
    #[test]
    fn missing_features_are_logged() {
        let dom = Rc::new(MemoryDom::new());
        let ctx = AppContext::new(dom, Rc::new(ManualClock::new()), &Environment::default());
        let _page = Page::mount(&ctx, &PageConfig::default(), Rc::new(NoCaptcha));
        assert!(logs_contain("feature not on this page"));
        assert!(logs_contain("page mounted"));
    }
}
