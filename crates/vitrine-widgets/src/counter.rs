#![forbid(unsafe_code)]

//! One-shot count-up numbers.
//!
//! Elements opt in with `data-count-to`. The first intersection past the
//! configured threshold starts a frame-driven count from zero to the target
//! along an ease-out-cubic curve; the last frame renders the exact target.
//!
//! # Invariants
//!
//! - `counted` flips once; later intersections are ignored.
//! - Rendered values never decrease during a count.
//! - The final text is the target formatted at the element's precision.

use std::rc::Rc;

use ahash::AHashMap;
use tracing::{debug, trace, warn};
use vitrine_core::config::CounterConfig;
use vitrine_core::{
    Dom, DomHandle, InteractionError, IntersectionEntry, NodeId, ObserveOptions, Timestamp,
};
use vitrine_runtime::{AppContext, NumberFormat, Scheduler};

/// `1 - (1 - t)^3` for `t` clamped to `[0, 1]`.
#[must_use]
pub fn ease_out_cubic(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Fraction digits written in a numeric attribute (`"1234.50"` -> 2).
fn written_decimals(raw: &str) -> u32 {
    raw.trim()
        .split_once('.')
        .map_or(0, |(_, frac)| frac.chars().take_while(char::is_ascii_digit).count() as u32)
}

#[derive(Debug, Clone, PartialEq)]
pub struct CounterEntry {
    pub element: NodeId,
    pub target: f64,
    pub decimals: u32,
    pub duration_ms: f64,
    pub prefix: String,
    pub suffix: String,
    pub counted: bool,
}

impl CounterEntry {
    fn parse(dom: &dyn Dom, element: NodeId, default_duration_ms: f64) -> Option<Self> {
        let raw = dom.attribute(element, "data-count-to")?;
        let target = match raw.trim().parse::<f64>() {
            Ok(v) if v.is_finite() => v,
            _ => {
                warn!(?element, raw = %raw, "counter target is not a number");
                return None;
            }
        };
        let decimals = dom
            .attribute(element, "data-decimals")
            .and_then(|d| d.trim().parse::<u32>().ok())
            .unwrap_or_else(|| written_decimals(&raw));
        let duration_ms = dom
            .attribute(element, "data-duration")
            .and_then(|d| d.trim().parse::<f64>().ok())
            .filter(|d| d.is_finite() && *d >= 0.0)
            .unwrap_or(default_duration_ms);

        Some(Self {
            element,
            target,
            decimals,
            duration_ms,
            prefix: dom.attribute(element, "data-prefix").unwrap_or_default(),
            suffix: dom.attribute(element, "data-suffix").unwrap_or_default(),
            counted: false,
        })
    }

    fn text(&self, format: &NumberFormat, value: f64) -> String {
        format!(
            "{}{}{}",
            self.prefix,
            format.format(value, self.decimals),
            self.suffix
        )
    }
}

/// A count in flight. Each frame renders and, until done, queues the next.
struct CountUp {
    dom: DomHandle,
    scheduler: Scheduler,
    format: NumberFormat,
    entry: CounterEntry,
    started: Timestamp,
}

impl CountUp {
    fn schedule_tick(run: Rc<Self>) {
        let next = Rc::clone(&run);
        run.scheduler.request_frame(move |now| next.tick(now));
    }

    fn tick(self: Rc<Self>, now: Timestamp) {
        let elapsed = now.since(self.started);
        let entry = &self.entry;
        if elapsed >= entry.duration_ms {
            self.dom
                .set_text(entry.element, &entry.text(&self.format, entry.target));
            trace!(element = ?entry.element, "count finished");
            return;
        }
        let value = entry.target * ease_out_cubic(elapsed / entry.duration_ms);
        self.dom
            .set_text(entry.element, &entry.text(&self.format, value));
        Self::schedule_tick(self);
    }
}

#[derive(Debug)]
pub struct CounterAnimator {
    ctx: AppContext,
    entries: Vec<CounterEntry>,
    by_node: AHashMap<NodeId, usize>,
    threshold: f64,
}

impl CounterAnimator {
    pub fn mount(ctx: &AppContext, cfg: &CounterConfig) -> Result<Self, InteractionError> {
        let dom = ctx.dom();
        let candidates = dom.query_all(None, &cfg.selector);
        if candidates.is_empty() {
            return Err(InteractionError::missing("counter", &cfg.selector));
        }
        let format = ctx.locale().number_format();
        let reduced = ctx.reduced_motion();

        let mut entries = Vec::with_capacity(candidates.len());
        let mut by_node = AHashMap::with_capacity(candidates.len());
        for element in candidates {
            let Some(mut entry) = CounterEntry::parse(dom.as_ref(), element, cfg.duration_ms)
            else {
                continue;
            };
            if reduced {
                dom.set_text(element, &entry.text(format, entry.target));
                entry.counted = true;
            } else {
                dom.set_text(element, &entry.text(format, 0.0));
                dom.observe(element, ObserveOptions::threshold(cfg.threshold));
            }
            by_node.insert(element, entries.len());
            entries.push(entry);
        }

        debug!(count = entries.len(), reduced, "counters mounted");
        Ok(Self {
            ctx: ctx.clone(),
            entries,
            by_node,
            threshold: cfg.threshold,
        })
    }

    pub fn entries(&self) -> &[CounterEntry] {
        &self.entries
    }

    pub fn entry(&self, element: NodeId) -> Option<&CounterEntry> {
        self.by_node.get(&element).map(|&i| &self.entries[i])
    }

    /// Start counting on the first qualifying intersection. Returns `true`
    /// only for the notification that started the count.
    pub fn handle_intersection(&mut self, entry: &IntersectionEntry) -> bool {
        let Some(&index) = self.by_node.get(&entry.target) else {
            return false;
        };
        let item = &mut self.entries[index];
        if item.counted || !entry.passes(self.threshold) {
            return false;
        }
        item.counted = true;

        let dom = self.ctx.dom();
        dom.unobserve(item.element);
        let run = Rc::new(CountUp {
            dom: Rc::clone(dom),
            scheduler: self.ctx.scheduler().clone(),
            format: self.ctx.locale().number_format().clone(),
            entry: item.clone(),
            started: self.ctx.now(),
        });
        debug!(element = ?item.element, target = item.target, "count started");
        CountUp::schedule_tick(run);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use vitrine_core::dom::memory::MemoryDom;
    use vitrine_core::{Environment, ManualClock};

    fn rig(env: &Environment) -> (Rc<MemoryDom>, Rc<ManualClock>, AppContext) {
        let dom = Rc::new(MemoryDom::new());
        let clock = Rc::new(ManualClock::new());
        let ctx = AppContext::new(dom.clone(), clock.clone(), env);
        (dom, clock, ctx)
    }

    fn visible(target: NodeId) -> IntersectionEntry {
        IntersectionEntry {
            target,
            ratio: 0.75,
            is_intersecting: true,
        }
    }

    #[test]
    fn easing_endpoints() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
        assert_eq!(ease_out_cubic(0.5), 0.875);
        assert_eq!(ease_out_cubic(7.0), 1.0);
    }

    #[test]
    fn decimals_from_attribute_text() {
        assert_eq!(written_decimals("1234.50"), 2);
        assert_eq!(written_decimals("98"), 0);
        assert_eq!(written_decimals(" 3.1 "), 1);
    }

    #[test]
    fn mount_parses_attributes_and_shows_zero() {
        let (dom, _clock, ctx) = rig(&Environment::default());
        let node = dom.append_with(
            dom.body(),
            "span",
            &[
                ("data-count-to", "2500"),
                ("data-prefix", "$"),
                ("data-suffix", "+"),
                ("data-duration", "800"),
            ],
        );
        let bad = dom.append_with(dom.body(), "span", &[("data-count-to", "lots")]);

        let counters = CounterAnimator::mount(&ctx, &CounterConfig::default()).unwrap();
        let entry = counters.entry(node).unwrap();
        assert_eq!(entry.duration_ms, 800.0);
        assert_eq!(entry.decimals, 0);
        assert!(counters.entry(bad).is_none());
        assert_eq!(dom.text(node), "$0+");
        assert_eq!(dom.observe_options(node).unwrap().threshold, 0.5);
    }

    #[test]
    fn counts_once_to_exact_target() {
        let (dom, clock, ctx) = rig(&Environment::default());
        let node = dom.append_with(
            dom.body(),
            "span",
            &[("data-count-to", "120"), ("data-duration", "300")],
        );
        let mut counters = CounterAnimator::mount(&ctx, &CounterConfig::default()).unwrap();

        assert!(counters.handle_intersection(&visible(node)));
        assert!(!counters.handle_intersection(&visible(node)));
        assert!(!dom.is_observed(node));

        for _ in 0..30 {
            clock.advance(16.0);
            ctx.scheduler().run_frame(ctx.now());
        }
        assert_eq!(dom.text(node), "120");
        assert_eq!(ctx.scheduler().pending_frames(), 0);
    }

    #[test]
    fn shallow_intersection_does_not_start() {
        let (dom, _clock, ctx) = rig(&Environment::default());
        let node = dom.append_with(dom.body(), "span", &[("data-count-to", "5")]);
        let mut counters = CounterAnimator::mount(&ctx, &CounterConfig::default()).unwrap();
        let glance = IntersectionEntry {
            ratio: 0.2,
            ..visible(node)
        };
        assert!(!counters.handle_intersection(&glance));
        assert!(!counters.entry(node).unwrap().counted);
        assert_eq!(ctx.scheduler().pending_frames(), 0);
    }

    #[test]
    fn reduced_motion_renders_target() {
        let env = Environment::default().with_reduced_motion(true);
        let (dom, _clock, ctx) = rig(&env);
        let node = dom.append_with(dom.body(), "span", &[("data-count-to", "1234.5")]);
        let mut counters = CounterAnimator::mount(&ctx, &CounterConfig::default()).unwrap();
        assert_eq!(dom.text(node), "1,234.5");
        assert!(!dom.is_observed(node));
        assert!(!counters.handle_intersection(&visible(node)));
    }

    #[test]
    fn locale_separators_apply() {
        let env = Environment::default().with_locale("de-DE");
        let (dom, _clock, ctx) = rig(&env.with_reduced_motion(true));
        let node = dom.append_with(
            dom.body(),
            "span",
            &[("data-count-to", "1234.5"), ("data-decimals", "2")],
        );
        CounterAnimator::mount(&ctx, &CounterConfig::default()).unwrap();
        assert_eq!(dom.text(node), "1.234,50");
    }

    proptest! {
        #[test]
        fn easing_is_monotone(a in 0.0f64..1.0, b in 0.0f64..1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(ease_out_cubic(lo) <= ease_out_cubic(hi));
        }
    }
}
