#![forbid(unsafe_code)]

//! Application context shared by every subsystem.
//!
//! Built once at startup from the host DOM, a clock and the [`Environment`].
//! Cloning is cheap; all clones share the same scheduler, scroll lock and
//! listener registry.

use std::rc::Rc;

use vitrine_core::{Clock, DomHandle, Environment, PointerCapabilities, ReducedMotion, Timestamp};

use crate::listeners::ListenerRegistry;
use crate::locale::LocaleContext;
use crate::scheduler::Scheduler;
use crate::scroll_lock::ScrollLock;

#[derive(Clone)]
pub struct AppContext {
    dom: DomHandle,
    clock: Rc<dyn Clock>,
    scheduler: Scheduler,
    listeners: ListenerRegistry,
    scroll_lock: ScrollLock,
    reduced_motion: ReducedMotion,
    pointer: PointerCapabilities,
    locale: Rc<LocaleContext>,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("scheduler", &self.scheduler)
            .field("listeners", &self.listeners)
            .field("scroll_lock", &self.scroll_lock)
            .field("reduced_motion", &self.reduced_motion)
            .field("pointer", &self.pointer)
            .field("locale", &self.locale.current_locale())
            .finish_non_exhaustive()
    }
}

impl AppContext {
    #[must_use]
    pub fn new(dom: DomHandle, clock: Rc<dyn Clock>, env: &Environment) -> Self {
        Self {
            scroll_lock: ScrollLock::new(Rc::clone(&dom)),
            dom,
            clock,
            scheduler: Scheduler::new(),
            listeners: ListenerRegistry::new(),
            reduced_motion: env.reduced_motion(),
            pointer: env.pointer(),
            locale: Rc::new(LocaleContext::new(&env.locale)),
        }
    }

    #[inline]
    pub fn dom(&self) -> &DomHandle {
        &self.dom
    }

    #[inline]
    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    #[inline]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    #[inline]
    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    #[inline]
    pub fn scroll_lock(&self) -> &ScrollLock {
        &self.scroll_lock
    }

    #[inline]
    pub fn reduced_motion(&self) -> bool {
        self.reduced_motion.is_set()
    }

    #[inline]
    pub fn pointer(&self) -> PointerCapabilities {
        self.pointer
    }

    #[inline]
    pub fn locale(&self) -> &LocaleContext {
        &self.locale
    }

    /// Queue `task` for a later frame.
    pub fn request_frame(&self, task: impl FnOnce(Timestamp) + 'static) -> crate::FrameId {
        self.scheduler.request_frame(task)
    }

    /// Run `task` once `delay_ms` have elapsed from now.
    pub fn set_timeout(&self, delay_ms: f64, task: impl FnOnce() + 'static) -> crate::TimerId {
        self.scheduler.set_timeout(self.now(), delay_ms, task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use vitrine_core::ManualClock;
    use vitrine_core::dom::memory::MemoryDom;

    #[test]
    fn reads_environment_once() {
        let env = Environment::default()
            .with_reduced_motion(true)
            .with_pointer(PointerCapabilities::COARSE)
            .with_locale("ja_JP.UTF-8");
        let ctx = AppContext::new(Rc::new(MemoryDom::new()), Rc::new(ManualClock::new()), &env);
        assert!(ctx.reduced_motion());
        assert!(!ctx.pointer().supports_hover_effects());
        assert_eq!(ctx.locale().current_locale(), "ja-JP");
    }

    #[test]
    fn timeout_is_relative_to_clock() {
        let clock = ManualClock::starting_at(1000.0);
        let ctx = AppContext::new(
            Rc::new(MemoryDom::new()),
            Rc::new(clock.clone()),
            &Environment::default(),
        );
        let fired = Rc::new(Cell::new(false));
        let flag = Rc::clone(&fired);
        ctx.set_timeout(200.0, move || flag.set(true));

        ctx.scheduler().run_frame(Timestamp::from_millis(1100.0));
        assert!(!fired.get());
        ctx.scheduler().run_frame(Timestamp::from_millis(1200.0));
        assert!(fired.get());
    }
}
