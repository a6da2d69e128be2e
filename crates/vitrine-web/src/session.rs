#![forbid(unsafe_code)]

//! Host-agnostic session: a mounted [`Page`] fed with JSON events.

use std::rc::Rc;

use tracing::{debug, warn};
use vitrine_core::PageEvent;
use vitrine_core::config::PageConfig;
use vitrine_core::error::Result;
use vitrine_runtime::AppContext;
use vitrine_widgets::{Captcha, Page};

use crate::input::{load_config, parse_batch, parse_event};

/// A mounted page plus the JSON plumbing around it.
#[derive(Debug)]
pub struct Session {
    page: Page,
}

impl Session {
    /// Mount with `config_json`. A malformed document is logged and the
    /// defaults are used, so a bad deploy never leaves the page inert.
    pub fn new(ctx: &AppContext, config_json: &str, captcha: Rc<dyn Captcha>) -> Self {
        let cfg = load_config(config_json).unwrap_or_else(|err| {
            warn!(%err, "page configuration rejected, using defaults");
            PageConfig::default()
        });
        Self {
            page: Page::mount(ctx, &cfg, captcha),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Dispatch one JSON event. Returns whether the host must call
    /// `preventDefault()`.
    pub fn dispatch_json(&mut self, json: &str) -> Result<bool> {
        let event = parse_event(json)?;
        Ok(self.page.dispatch(&event).prevent_default)
    }

    /// Dispatch a JSON array of events in order. Returns whether any of
    /// them asked for `preventDefault()`.
    pub fn dispatch_batch_json(&mut self, json: &str) -> Result<bool> {
        let events = parse_batch(json)?;
        Ok(self.dispatch_all(events))
    }

    /// Dispatch already-decoded events in order.
    pub fn dispatch_all(&mut self, events: impl IntoIterator<Item = PageEvent>) -> bool {
        events.into_iter().fold(false, |prevented, event| {
            self.page.dispatch(&event).prevent_default || prevented
        })
    }

    /// One animation frame: deliver `pending` host notifications (such as
    /// queued intersection entries), then pump the scheduler.
    pub fn frame(&mut self, pending: impl IntoIterator<Item = PageEvent>) -> usize {
        let mut delivered = 0usize;
        for event in pending {
            self.page.dispatch(&event);
            delivered += 1;
        }
        let ran = self.page.frame();
        if delivered > 0 {
            debug!(delivered, ran, "frame");
        }
        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vitrine_core::dom::memory::MemoryDom;
    use vitrine_core::{Dom, Environment, InteractionError, IntersectionEntry, ManualClock};
    use vitrine_widgets::NoCaptcha;

    fn rig(config: &str) -> (Rc<MemoryDom>, Rc<ManualClock>, Session) {
        let dom = Rc::new(MemoryDom::new());
        let toggle = dom.append_with(dom.body(), "button", &[("class", "menu-toggle")]);
        let menu = dom.append_with(dom.body(), "nav", &[("id", "menu")]);
        dom.append_with(menu, "a", &[("href", "#top")]);
        dom.append_with(dom.body(), "span", &[("data-count-to", "40"), ("data-duration", "100")]);
        assert_eq!(toggle.raw(), 1);

        let clock = Rc::new(ManualClock::new());
        let ctx = AppContext::new(dom.clone(), clock.clone(), &Environment::default());
        let session = Session::new(&ctx, config, Rc::new(NoCaptcha));
        (dom, clock, session)
    }

    #[test]
    fn click_then_escape_over_json() {
        let (dom, _clock, mut session) = rig("");
        let menu = dom.query(None, "#menu").unwrap();

        assert!(!session.dispatch_json(r#"{"type":"click","target":1}"#).unwrap());
        assert!(dom.has_class(menu, "open"));
        assert!(session.dispatch_json(r#"{"type":"key","key":"Escape"}"#).unwrap());
        assert!(!dom.has_class(menu, "open"));
    }

    #[test]
    fn batch_reports_any_prevented() {
        let (_dom, _clock, mut session) = rig("{}");
        let prevented = session
            .dispatch_batch_json(r#"[{"type":"click","target":1},{"type":"key","key":"Tab"}]"#)
            .unwrap();
        assert!(prevented);
    }

    #[test]
    fn malformed_event_is_an_error() {
        let (_dom, _clock, mut session) = rig("");
        assert!(matches!(
            session.dispatch_json("{\"type\":\"click\"}"),
            Err(InteractionError::Input(_))
        ));
    }

    #[test]
    fn bad_config_falls_back_to_defaults() {
        let (_dom, _clock, session) = rig("{not json");
        assert!(session.page().drawer().is_some());
    }

    #[test]
    fn unusable_timing_falls_back_to_defaults() {
        let config = r##"{"carousel":{"cycle_ms":0},"menu":{"toggle":"#nope"}}"##;
        let (dom, _clock, mut session) = rig(config);
        assert!(session.page().drawer().is_some());
        session.frame([]);
        assert!(session.dispatch_json(r#"{"type":"click","target":1}"#).is_ok());
        assert!(dom.has_class(dom.query(None, "#menu").unwrap(), "open"));
    }

    #[test]
    fn frame_delivers_pending_notifications() {
        let (dom, clock, mut session) = rig("");
        let counter = dom.query(None, "[data-count-to]").unwrap();
        let seen = PageEvent::Intersection(IntersectionEntry {
            target: counter,
            ratio: 1.0,
            is_intersecting: true,
        });

        session.frame([seen]);
        for _ in 0..10 {
            clock.advance(16.0);
            session.frame([]);
        }
        assert_eq!(dom.text(counter), "40");
    }
}
