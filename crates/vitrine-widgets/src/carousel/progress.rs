#![forbid(unsafe_code)]

//! Progress bar for the active slide.
//!
//! Restarts use two frames: the first writes `transition: none` and the start
//! width synchronously, the second (queued on the scheduler) starts the
//! linear transition to 100%. Writing both in one frame would let the browser
//! coalesce them and animate from the old width.

use tracing::trace;
use vitrine_core::{DomHandle, NodeId};
use vitrine_runtime::{AppContext, FrameId, Scheduler};

/// Width percent `elapsed_ms` into a cycle: `clamp(t / cycle, 0, 1) × 100`.
#[must_use]
pub fn progress_percent(elapsed_ms: f64, cycle_ms: f64) -> f64 {
    if cycle_ms <= 0.0 {
        return 100.0;
    }
    (elapsed_ms / cycle_ms).clamp(0.0, 1.0) * 100.0
}

/// CSS number with at most two decimals and no trailing zeros.
#[must_use]
pub fn css_number(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" { "0".to_string() } else { text.to_string() }
}

/// Binding between the carousel and its width-bearing progress element.
pub struct ProgressBar {
    dom: DomHandle,
    scheduler: Scheduler,
    bar: NodeId,
    cycle_ms: f64,
    reduced_motion: bool,
    in_view: bool,
    pending: Option<FrameId>,
}

impl std::fmt::Debug for ProgressBar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressBar")
            .field("bar", &self.bar)
            .field("cycle_ms", &self.cycle_ms)
            .field("in_view", &self.in_view)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl ProgressBar {
    #[must_use]
    pub fn new(ctx: &AppContext, bar: NodeId, cycle_ms: f64) -> Self {
        Self {
            dom: ctx.dom().clone(),
            scheduler: ctx.scheduler().clone(),
            bar,
            cycle_ms,
            reduced_motion: ctx.reduced_motion(),
            in_view: true,
            pending: None,
        }
    }

    #[inline]
    pub fn element(&self) -> NodeId {
        self.bar
    }

    #[inline]
    pub fn is_in_view(&self) -> bool {
        self.in_view
    }

    fn cancel_pending(&mut self) {
        if let Some(frame) = self.pending.take() {
            self.scheduler.cancel_frame(frame);
        }
    }

    fn pin(&self, percent: f64) {
        self.dom.set_style(self.bar, "transition", "none");
        self.dom
            .set_style(self.bar, "width", &format!("{}%", css_number(percent)));
    }

    /// Restart the fill as if `elapsed_ms` of the cycle had already passed.
    /// Ignored while out of view; [`resume`](Self::resume) catches up.
    pub fn restart_from(&mut self, elapsed_ms: f64) {
        self.cancel_pending();
        if self.reduced_motion {
            self.pin(0.0);
            return;
        }
        if !self.in_view {
            return;
        }

        let start = progress_percent(elapsed_ms, self.cycle_ms);
        let rest = (self.cycle_ms - elapsed_ms).max(0.0);
        self.pin(start);

        let dom = self.dom.clone();
        let bar = self.bar;
        let transition = format!("width {}ms linear", css_number(rest));
        self.pending = Some(self.scheduler.request_frame(move |_| {
            dom.set_style(bar, "transition", &transition);
            dom.set_style(bar, "width", "100%");
        }));
        trace!(start, rest, "progress restarted");
    }

    /// Restart from 0% over the full cycle.
    pub fn restart(&mut self) {
        self.restart_from(0.0);
    }

    /// Leave the viewport: pin the bar where it is.
    pub fn freeze(&mut self, elapsed_ms: f64) {
        self.in_view = false;
        self.cancel_pending();
        if self.reduced_motion {
            return;
        }
        self.pin(progress_percent(elapsed_ms, self.cycle_ms));
        trace!(elapsed_ms, "progress frozen");
    }

    /// Re-enter the viewport: continue with the remaining cycle time.
    pub fn resume(&mut self, elapsed_ms: f64) {
        self.in_view = true;
        self.restart_from(elapsed_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::rc::Rc;
    use vitrine_core::dom::memory::MemoryDom;
    use vitrine_core::{Dom, Environment, ManualClock, Timestamp};

    fn rig(reduce: bool) -> (Rc<MemoryDom>, AppContext, NodeId) {
        let dom = Rc::new(MemoryDom::new());
        let bar = dom.append(dom.body(), "span");
        let env = Environment::default().with_reduced_motion(reduce);
        let ctx = AppContext::new(dom.clone(), Rc::new(ManualClock::new()), &env);
        (dom, ctx, bar)
    }

    fn writes(dom: &MemoryDom, bar: NodeId) -> Vec<(String, String)> {
        let out = dom.style_writes(bar);
        dom.clear_style_log();
        out
    }

    fn pair(a: &str, b: &str) -> (String, String) {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn debug_reports_state_without_the_dom() {
        let (_dom, ctx, bar) = rig(false);
        let progress = ProgressBar::new(&ctx, bar, 4000.0);
        let shown = format!("{progress:?}");
        assert!(shown.starts_with("ProgressBar"));
        assert!(shown.contains("cycle_ms: 4000.0"));
        assert!(shown.contains("in_view"));
    }

    #[test]
    fn percent_formula() {
        assert_eq!(progress_percent(0.0, 4000.0), 0.0);
        assert_eq!(progress_percent(1000.0, 4000.0), 25.0);
        assert_eq!(progress_percent(9000.0, 4000.0), 100.0);
        assert_eq!(progress_percent(-5.0, 4000.0), 0.0);
        assert_eq!(css_number(12.5), "12.5");
        assert_eq!(css_number(100.0), "100");
        assert_eq!(css_number(33.3333), "33.33");
    }

    #[test]
    fn restart_spans_two_frames() {
        let (dom, ctx, bar) = rig(false);
        let mut progress = ProgressBar::new(&ctx, bar, 4000.0);
        progress.restart();
        assert_eq!(
            writes(&dom, bar),
            vec![pair("transition", "none"), pair("width", "0%")]
        );

        ctx.scheduler().run_frame(Timestamp::from_millis(16.0));
        assert_eq!(
            writes(&dom, bar),
            vec![pair("transition", "width 4000ms linear"), pair("width", "100%")]
        );
    }

    #[test]
    fn second_restart_cancels_stale_frame() {
        let (dom, ctx, bar) = rig(false);
        let mut progress = ProgressBar::new(&ctx, bar, 4000.0);
        progress.restart();
        progress.restart_from(1000.0);
        dom.clear_style_log();
        ctx.scheduler().run_frame(Timestamp::from_millis(16.0));
        assert_eq!(
            writes(&dom, bar),
            vec![pair("transition", "width 3000ms linear"), pair("width", "100%")]
        );
    }

    #[test]
    fn freeze_pins_and_resume_continues() {
        let (dom, ctx, bar) = rig(false);
        let mut progress = ProgressBar::new(&ctx, bar, 4000.0);
        progress.restart();
        ctx.scheduler().run_frame(Timestamp::from_millis(16.0));
        dom.clear_style_log();

        progress.freeze(1000.0);
        assert!(!progress.is_in_view());
        assert_eq!(
            writes(&dom, bar),
            vec![pair("transition", "none"), pair("width", "25%")]
        );

        progress.restart();
        assert!(writes(&dom, bar).is_empty());
        assert_eq!(ctx.scheduler().pending_frames(), 0);

        progress.resume(2500.0);
        assert_eq!(
            writes(&dom, bar),
            vec![pair("transition", "none"), pair("width", "62.5%")]
        );
        ctx.scheduler().run_frame(Timestamp::from_millis(32.0));
        assert_eq!(
            writes(&dom, bar),
            vec![pair("transition", "width 1500ms linear"), pair("width", "100%")]
        );
    }

    #[test]
    fn resume_after_full_cycle_has_zero_rest() {
        let (dom, ctx, bar) = rig(false);
        let mut progress = ProgressBar::new(&ctx, bar, 4000.0);
        progress.freeze(0.0);
        dom.clear_style_log();
        progress.resume(6000.0);
        ctx.scheduler().run_frame(Timestamp::from_millis(16.0));
        assert_eq!(
            dom.style(bar, "transition").as_deref(),
            Some("width 0ms linear")
        );
    }

    #[test]
    fn reduced_motion_stays_at_zero() {
        let (dom, ctx, bar) = rig(true);
        let mut progress = ProgressBar::new(&ctx, bar, 4000.0);
        progress.restart();
        assert_eq!(ctx.scheduler().pending_frames(), 0);
        assert_eq!(dom.style(bar, "width").as_deref(), Some("0%"));
        assert_eq!(dom.style(bar, "transition").as_deref(), Some("none"));
        assert!(dom.is_attached(bar));
    }

    proptest! {
        #[test]
        fn percent_is_monotone_and_bounded(a in 0.0f64..20_000.0, b in 0.0f64..20_000.0, cycle in 1.0f64..10_000.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let p_lo = progress_percent(lo, cycle);
            let p_hi = progress_percent(hi, cycle);
            prop_assert!((0.0..=100.0).contains(&p_lo));
            prop_assert!(p_lo <= p_hi);
        }
    }
}
