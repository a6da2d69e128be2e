#![forbid(unsafe_code)]

//! Focus trapping for open overlays.
//!
//! A [`FocusTrap`] snapshots the focusable descendants of a container and
//! keeps Tab navigation inside them: Tab on the last element wraps to the
//! first, Shift+Tab on the first wraps to the last, everything else is left
//! to the browser.
//!
//! # Invariants
//!
//! - The focusable set is in document order and never contains disabled
//!   controls, negative-tabindex elements or non-rendered elements.
//! - An empty set contains Tab entirely: default prevented, focus unchanged.
//! - Focus that has escaped the container is pulled back to the first
//!   element (last with Shift).

use vitrine_core::{Dom, ElementInfo, NodeId};

/// Result of routing a Tab press through a trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabOutcome {
    /// Focus moved to the given element; the default action must be prevented.
    Wrapped(NodeId),
    /// Browser default Tab handling applies.
    PassThrough,
    /// Nothing to focus; default prevented, focus unchanged.
    Contained,
}

impl TabOutcome {
    #[inline]
    pub fn prevents_default(self) -> bool {
        !matches!(self, Self::PassThrough)
    }
}

/// Whether an element is interactive in its own right.
#[must_use]
pub fn is_focusable(info: &ElementInfo) -> bool {
    if info.tab_index.is_some_and(|t| t < 0) {
        return false;
    }
    match info.tag.as_str() {
        "a" | "area" => info.has_href || info.tab_index.is_some(),
        "button" | "select" | "textarea" => !info.disabled,
        "input" => !info.disabled && info.input_type.as_deref() != Some("hidden"),
        _ => info.content_editable || info.tab_index.is_some(),
    }
}

/// Rendered, focusable descendants of `container` in document order.
#[must_use]
pub fn compute_focusable(dom: &dyn Dom, container: NodeId) -> Vec<NodeId> {
    dom.descendants(container)
        .into_iter()
        .filter(|&node| {
            dom.element(node)
                .is_some_and(|info| info.rendered && is_focusable(&info))
        })
        .collect()
}

/// Tab cycling scoped to one container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusTrap {
    container: NodeId,
    focusable: Vec<NodeId>,
}

impl FocusTrap {
    /// Snapshot the focusable set of `container`.
    #[must_use]
    pub fn capture(dom: &dyn Dom, container: NodeId) -> Self {
        Self {
            container,
            focusable: compute_focusable(dom, container),
        }
    }

    #[inline]
    pub fn container(&self) -> NodeId {
        self.container
    }

    #[inline]
    pub fn focusable(&self) -> &[NodeId] {
        &self.focusable
    }

    #[inline]
    pub fn first(&self) -> Option<NodeId> {
        self.focusable.first().copied()
    }

    #[inline]
    pub fn last(&self) -> Option<NodeId> {
        self.focusable.last().copied()
    }

    /// Route a Tab press. Wrapping moves focus through `dom`.
    pub fn handle_tab(&self, dom: &dyn Dom, shift: bool) -> TabOutcome {
        let (Some(first), Some(last)) = (self.first(), self.last()) else {
            return TabOutcome::Contained;
        };

        let active = dom
            .active_element()
            .filter(|&node| dom.contains(self.container, node));

        let target = match active {
            None if shift => last,
            None => first,
            Some(node) if shift && node == first => last,
            Some(node) if !shift && node == last => first,
            Some(_) => return TabOutcome::PassThrough,
        };

        dom.focus(target);
        TabOutcome::Wrapped(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use vitrine_core::dom::memory::MemoryDom;

    fn dialog_with(dom: &MemoryDom, links: usize) -> (NodeId, Vec<NodeId>) {
        let dialog = dom.append(dom.body(), "div");
        let ids = (0..links)
            .map(|_| dom.append_with(dialog, "a", &[("href", "#")]))
            .collect();
        (dialog, ids)
    }

    #[test]
    fn excludes_disabled_negative_and_hidden() {
        let dom = MemoryDom::new();
        let dialog = dom.append(dom.body(), "div");
        let link = dom.append_with(dialog, "a", &[("href", "/x")]);
        let _anchor = dom.append(dialog, "a");
        let _disabled = dom.append_with(dialog, "button", &[("disabled", "")]);
        let _skipped = dom.append_with(dialog, "button", &[("tabindex", "-1")]);
        let _hidden_input = dom.append_with(dialog, "input", &[("type", "hidden")]);
        let hidden_wrap = dom.append_with(dialog, "div", &[("hidden", "")]);
        let _invisible = dom.append(hidden_wrap, "button");
        let text = dom.append_with(dialog, "input", &[("type", "text")]);
        let editable = dom.append_with(dialog, "div", &[("contenteditable", "true")]);
        let tabbable = dom.append_with(dialog, "span", &[("tabindex", "0")]);

        assert_eq!(
            compute_focusable(&dom, dialog),
            vec![link, text, editable, tabbable]
        );
    }

    #[test]
    fn tab_wraps_last_to_first_and_back() {
        let dom = MemoryDom::new();
        let (dialog, links) = dialog_with(&dom, 3);
        let trap = FocusTrap::capture(&dom, dialog);

        dom.focus(links[2]);
        assert_eq!(trap.handle_tab(&dom, false), TabOutcome::Wrapped(links[0]));
        assert_eq!(dom.active_element(), Some(links[0]));

        assert_eq!(trap.handle_tab(&dom, true), TabOutcome::Wrapped(links[2]));
        assert_eq!(dom.active_element(), Some(links[2]));
    }

    #[test]
    fn middle_presses_pass_through() {
        let dom = MemoryDom::new();
        let (dialog, links) = dialog_with(&dom, 3);
        let trap = FocusTrap::capture(&dom, dialog);
        dom.focus(links[1]);
        assert_eq!(trap.handle_tab(&dom, false), TabOutcome::PassThrough);
        assert_eq!(trap.handle_tab(&dom, true), TabOutcome::PassThrough);
        dom.focus(links[0]);
        assert_eq!(trap.handle_tab(&dom, false), TabOutcome::PassThrough);
    }

    #[test]
    fn empty_set_is_contained() {
        let dom = MemoryDom::new();
        let (dialog, _) = dialog_with(&dom, 0);
        let outside = dom.append_with(dom.body(), "button", &[]);
        dom.focus(outside);
        let trap = FocusTrap::capture(&dom, dialog);
        let outcome = trap.handle_tab(&dom, false);
        assert_eq!(outcome, TabOutcome::Contained);
        assert!(outcome.prevents_default());
        assert_eq!(dom.active_element(), Some(outside));
    }

    #[test]
    fn escaped_focus_is_pulled_back() {
        let dom = MemoryDom::new();
        let (dialog, links) = dialog_with(&dom, 2);
        let outside = dom.append(dom.body(), "button");
        let trap = FocusTrap::capture(&dom, dialog);

        dom.focus(outside);
        assert_eq!(trap.handle_tab(&dom, false), TabOutcome::Wrapped(links[0]));
        dom.focus(outside);
        assert_eq!(trap.handle_tab(&dom, true), TabOutcome::Wrapped(links[1]));
    }

    proptest! {
        // Tab presses driven through the trap (with the browser default for
        // pass-through presses) never leave the container and visit every
        // element once per lap.
        #[test]
        fn tab_cycles_within_container(count in 1usize..8, presses in 1usize..24, shift in any::<bool>()) {
            let dom = MemoryDom::new();
            let (dialog, links) = dialog_with(&dom, count);
            let _after = dom.append_with(dom.body(), "button", &[]);
            let trap = FocusTrap::capture(&dom, dialog);
            dom.focus(links[0]);

            let mut position = 0usize;
            for _ in 0..presses {
                if trap.handle_tab(&dom, shift) == TabOutcome::PassThrough {
                    dom.simulate_tab(shift);
                }
                position = if shift { (position + count - 1) % count } else { (position + 1) % count };
                prop_assert_eq!(dom.active_element(), Some(links[position]));
            }
        }
    }
}
