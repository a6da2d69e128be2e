#![forbid(unsafe_code)]

//! One-shot scroll reveal.
//!
//! Each `[data-reveal]` element registers once. Its first qualifying
//! intersection adds [`REVEALED_CLASS`] with a stagger delay of
//! `min(index_in_group × step, max_delay)` and stops observing it. Groups
//! are the nearest ancestor matching a container role; elements without one
//! share a page-level group.
//!
//! Under reduced motion every element gets its final state at registration
//! and nothing is observed.

mod catch_copy;

pub use catch_copy::{READY_CLASS, prime_catch_copy};

use ahash::AHashMap;
use tracing::{debug, trace};
use vitrine_core::config::RevealConfig;
use vitrine_core::{InteractionError, IntersectionEntry, NodeId, ObserveOptions};
use vitrine_runtime::AppContext;

/// Class that plays the entrance animation.
pub const REVEALED_CLASS: &str = "is-revealed";

/// Stagger delay for the `index`th element of a group.
#[must_use]
pub fn stagger_delay(index: usize, step_ms: f64, max_ms: f64) -> f64 {
    (index as f64 * step_ms).min(max_ms)
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevealEntry {
    pub element: NodeId,
    /// Grouping ancestor; `None` is the page-level group.
    pub group: Option<NodeId>,
    pub stagger_delay_ms: f64,
    pub revealed: bool,
}

#[derive(Debug)]
pub struct RevealEngine {
    ctx: AppContext,
    entries: Vec<RevealEntry>,
    by_node: AHashMap<NodeId, usize>,
    threshold: f64,
}

impl RevealEngine {
    pub fn mount(ctx: &AppContext, cfg: &RevealConfig) -> Result<Self, InteractionError> {
        let dom = ctx.dom();
        let candidates = dom.query_all(None, &cfg.selector);
        if candidates.is_empty() {
            return Err(InteractionError::missing("reveal", &cfg.selector));
        }

        let roles = cfg.group_roles.join(", ");
        let reduced = ctx.reduced_motion();
        let mut group_sizes: AHashMap<Option<NodeId>, usize> = AHashMap::new();
        let mut entries = Vec::with_capacity(candidates.len());
        let mut by_node = AHashMap::with_capacity(candidates.len());

        for element in candidates {
            if by_node.contains_key(&element) {
                continue;
            }
            let group = if roles.is_empty() {
                None
            } else {
                dom.parent(element).and_then(|p| dom.closest(p, &roles))
            };
            let slot = group_sizes.entry(group).or_insert(0);
            let delay = stagger_delay(*slot, cfg.step_ms, cfg.max_delay_ms);
            *slot += 1;

            let variant = dom
                .attribute(element, "data-reveal")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| cfg.default_variant.clone());
            dom.add_class(element, &format!("reveal-{variant}"));

            if reduced {
                dom.set_style(element, "animation-delay", "0ms");
                dom.set_style(element, "animation-duration", "0ms");
                dom.add_class(element, REVEALED_CLASS);
            } else {
                dom.observe(
                    element,
                    ObserveOptions::threshold(cfg.threshold).root_margin(cfg.root_margin.clone()),
                );
            }

            by_node.insert(element, entries.len());
            entries.push(RevealEntry {
                element,
                group,
                stagger_delay_ms: delay,
                revealed: reduced,
            });
        }

        debug!(count = entries.len(), groups = group_sizes.len(), reduced, "reveal mounted");
        Ok(Self {
            ctx: ctx.clone(),
            entries,
            by_node,
            threshold: cfg.threshold,
        })
    }

    pub fn entries(&self) -> &[RevealEntry] {
        &self.entries
    }

    pub fn entry(&self, element: NodeId) -> Option<&RevealEntry> {
        self.by_node.get(&element).map(|&i| &self.entries[i])
    }

    /// Reveal on the first qualifying intersection. Returns `true` only for
    /// the notification that performed the reveal.
    pub fn handle_intersection(&mut self, entry: &IntersectionEntry) -> bool {
        let Some(&index) = self.by_node.get(&entry.target) else {
            return false;
        };
        let item = &mut self.entries[index];
        if item.revealed {
            trace!(element = ?item.element, "reveal already done");
            return false;
        }
        if !entry.passes(self.threshold) {
            return false;
        }
        item.revealed = true;

        let dom = self.ctx.dom();
        dom.set_style(
            item.element,
            "animation-delay",
            &format!("{}ms", crate::carousel::css_number(item.stagger_delay_ms)),
        );
        dom.add_class(item.element, REVEALED_CLASS);
        dom.unobserve(item.element);
        trace!(element = ?item.element, delay = item.stagger_delay_ms, "revealed");
        true
    }
}
