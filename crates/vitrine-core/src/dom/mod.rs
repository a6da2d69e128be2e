//! Host DOM contract.
//!
//! Every subsystem reads and writes the page through [`Dom`]. Methods take
//! `&self`: the DOM is a shared, interior-mutable resource on every host, and
//! subsystems hold it behind a [`DomHandle`].
//!
//! # Invariants
//!
//! - [`NodeId`]s are stable for the lifetime of the element on the host side.
//! - Queries only return attached elements, in document order.
//! - Writes to detached or unknown nodes are ignored by the host, never fatal.
//!
//! # Failure Modes
//!
//! | Failure | Behavior |
//! |---------|----------|
//! | Unknown `NodeId` | Reads return `None`/`false`/empty, writes are no-ops |
//! | Unsupported selector | Host returns no matches |

#[cfg(any(test, feature = "test-helpers"))]
pub mod memory;
#[cfg(any(test, feature = "test-helpers"))]
mod selector;

use std::rc::Rc;

use crate::geometry::Rect;

/// Opaque handle to a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Shared handle to the host DOM.
pub type DomHandle = Rc<dyn Dom>;

/// The facts about an element that decide focusability.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementInfo {
    /// Lowercase tag name.
    pub tag: String,
    /// `disabled` attribute present.
    pub disabled: bool,
    /// Parsed `tabindex`, if present and numeric.
    pub tab_index: Option<i32>,
    /// `href` attribute present.
    pub has_href: bool,
    /// Lowercase `type` attribute for inputs.
    pub input_type: Option<String>,
    pub content_editable: bool,
    /// Element currently produces layout boxes.
    pub rendered: bool,
}

/// Options for intersection observation of one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ObserveOptions {
    pub threshold: f64,
    /// CSS margin string applied to the root (viewport).
    pub root_margin: String,
}

impl ObserveOptions {
    #[must_use]
    pub fn threshold(threshold: f64) -> Self {
        Self {
            threshold,
            root_margin: "0px".to_string(),
        }
    }

    #[must_use]
    pub fn root_margin(mut self, margin: impl Into<String>) -> Self {
        self.root_margin = margin.into();
        self
    }
}

/// Host DOM operations used by the interaction layer.
pub trait Dom {
    // --- Queries ---

    /// First attached element matching `selector` inside `scope`
    /// (the whole document when `None`). The scope itself never matches.
    fn query(&self, scope: Option<NodeId>, selector: &str) -> Option<NodeId>;

    /// All attached elements matching `selector` inside `scope`, in document order.
    fn query_all(&self, scope: Option<NodeId>, selector: &str) -> Vec<NodeId>;

    /// Whether `node` matches `selector`.
    fn matches(&self, node: NodeId, selector: &str) -> bool;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Element descendants of `root` in document order, excluding `root`.
    fn descendants(&self, root: NodeId) -> Vec<NodeId>;

    fn element(&self, node: NodeId) -> Option<ElementInfo>;

    fn is_attached(&self, node: NodeId) -> bool;

    /// The document `<body>`.
    fn document_body(&self) -> Option<NodeId>;

    /// Whether `node` is `ancestor` or one of its descendants.
    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Nearest inclusive ancestor of `node` matching `selector`.
    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.matches(current, selector) {
                return Some(current);
            }
            cursor = self.parent(current);
        }
        None
    }

    // --- Classes, attributes, visibility ---

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&self, node: NodeId, class: &str);
    fn remove_class(&self, node: NodeId, class: &str);

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;
    fn set_attribute(&self, node: NodeId, name: &str, value: &str);
    fn remove_attribute(&self, node: NodeId, name: &str);

    /// The `hidden` property.
    fn set_hidden(&self, node: NodeId, hidden: bool);
    fn is_hidden(&self, node: NodeId) -> bool;

    /// Checked state of a checkbox or radio (the property, not the attribute).
    fn is_checked(&self, node: NodeId) -> bool;

    // --- Rendering ---

    /// Inline style write; `value` is a CSS value string.
    fn set_style(&self, node: NodeId, property: &str, value: &str);
    fn set_text(&self, node: NodeId, text: &str);
    fn bounding_rect(&self, node: NodeId) -> Rect;

    /// Append a new element under `parent`.
    fn create_element(&self, parent: NodeId, tag: &str) -> Option<NodeId>;

    // --- Focus and scrolling ---

    /// Focus without scrolling the page.
    fn focus(&self, node: NodeId);
    fn active_element(&self) -> Option<NodeId>;
    fn scroll_into_view(&self, node: NodeId);

    // --- Observation and validation ---

    fn observe(&self, node: NodeId, options: ObserveOptions);
    fn unobserve(&self, node: NodeId);

    /// First form control inside `form` failing native constraint validation.
    fn first_invalid(&self, form: NodeId) -> Option<NodeId>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::memory::MemoryDom;

    #[test]
    fn node_id_round_trips_raw() {
        assert_eq!(NodeId::from_raw(42).raw(), 42);
    }

    #[test]
    fn contains_walks_ancestors() {
        let dom = MemoryDom::new();
        let button = dom.append(dom.body(), "button");
        let icon = dom.append(button, "span");
        let other = dom.append(dom.body(), "div");
        assert!(dom.contains(button, icon));
        assert!(dom.contains(button, button));
        assert!(!dom.contains(button, other));
    }

    #[test]
    fn closest_is_inclusive() {
        let dom = MemoryDom::new();
        let card = dom.append_with(dom.body(), "article", &[("data-modal-card", "")]);
        let img = dom.append(card, "img");
        assert_eq!(dom.closest(img, "[data-modal-card]"), Some(card));
        assert_eq!(dom.closest(card, "[data-modal-card]"), Some(card));
        assert_eq!(dom.closest(img, "section"), None);
    }

    #[test]
    fn observe_options_builder() {
        let opts = ObserveOptions::threshold(0.1).root_margin("0px 0px -10% 0px");
        assert_eq!(opts.threshold, 0.1);
        assert_eq!(opts.root_margin, "0px 0px -10% 0px");
    }
}
