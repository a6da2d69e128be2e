//! In-memory [`Dom`] for tests and headless hosts.
//!
//! Mirrors the browser behaviors the interaction layer depends on: document
//! order, `hidden` hiding a subtree from rendering, focus, and a style write
//! log so multi-frame protocols can be asserted step by step.

use std::cell::RefCell;

use super::selector::{SelectorList, Subject};
use super::{Dom, ElementInfo, NodeId, ObserveOptions};
use crate::geometry::Rect;

#[derive(Debug, Clone, Default)]
struct NodeData {
    tag: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    classes: Vec<String>,
    attributes: Vec<(String, String)>,
    hidden: bool,
    styles: Vec<(String, String)>,
    text: String,
    rect: Rect,
    display_none: bool,
    attached: bool,
    checked: bool,
    invalid: bool,
}

impl Subject for NodeData {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attr(&self, name: &str) -> Option<&str> {
        if name == "class" {
            return None;
        }
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }
}

#[derive(Debug, Default)]
struct Tree {
    nodes: Vec<NodeData>,
    focused: Option<NodeId>,
    observed: Vec<(NodeId, ObserveOptions)>,
    scrolled: Vec<NodeId>,
    style_log: Vec<(NodeId, String, String)>,
}

impl Tree {
    fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.raw() as usize)
    }

    fn get_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.raw() as usize)
    }

    fn attached(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.attached)
    }

    fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.get(id).and_then(|n| n.parent);
        while let Some(current) = cursor {
            out.push(current);
            cursor = self.get(current).and_then(|n| n.parent);
        }
        out
    }

    fn walk(&self, root: NodeId, out: &mut Vec<NodeId>) {
        if let Some(node) = self.get(root) {
            for &child in &node.children {
                out.push(child);
                self.walk(child, out);
            }
        }
    }

    fn matches(&self, id: NodeId, selector: &SelectorList) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        let ancestors: Vec<&dyn Subject> = self
            .ancestors(id)
            .into_iter()
            .filter_map(|a| self.get(a))
            .map(|n| n as &dyn Subject)
            .collect();
        selector.matches(node, &ancestors)
    }

    fn rendered(&self, id: NodeId) -> bool {
        let Some(node) = self.get(id) else {
            return false;
        };
        if !node.attached || node.hidden || node.display_none {
            return false;
        }
        self.ancestors(id)
            .into_iter()
            .filter_map(|a| self.get(a))
            .all(|a| !a.hidden && !a.display_none)
    }

    fn set_attached(&mut self, id: NodeId, attached: bool) {
        let mut subtree = vec![id];
        self.walk(id, &mut subtree);
        for node in subtree {
            if let Some(data) = self.get_mut(node) {
                data.attached = attached;
            }
        }
    }
}

/// A small, single-threaded DOM.
///
/// Node 0 is `<body>`. Elements are created with [`append`](Self::append)
/// or [`append_with`](Self::append_with); `class` and `id` attributes are
/// understood by selectors.
#[derive(Debug)]
pub struct MemoryDom {
    tree: RefCell<Tree>,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    #[must_use]
    pub fn new() -> Self {
        let body = NodeData {
            tag: "body".to_string(),
            attached: true,
            rect: Rect::new(0.0, 0.0, 1280.0, 800.0),
            ..NodeData::default()
        };
        Self {
            tree: RefCell::new(Tree {
                nodes: vec![body],
                ..Tree::default()
            }),
        }
    }

    #[must_use]
    pub fn body(&self) -> NodeId {
        NodeId::from_raw(0)
    }

    /// Append an element with no attributes.
    pub fn append(&self, parent: NodeId, tag: &str) -> NodeId {
        self.append_with(parent, tag, &[])
    }

    /// Append an element with attributes. `class` is split on whitespace.
    pub fn append_with(&self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut tree = self.tree.borrow_mut();
        let id = NodeId::from_raw(tree.nodes.len() as u64);
        let attached = tree.attached(parent);
        let mut node = NodeData {
            tag: tag.to_ascii_lowercase(),
            parent: Some(parent),
            attached,
            rect: Rect::new(0.0, 0.0, 100.0, 20.0),
            ..NodeData::default()
        };
        for (name, value) in attrs {
            match *name {
                "class" => node
                    .classes
                    .extend(value.split_whitespace().map(str::to_string)),
                "hidden" => node.hidden = true,
                "checked" => node.checked = true,
                _ => node.attributes.push(((*name).to_string(), (*value).to_string())),
            }
        }
        tree.nodes.push(node);
        if let Some(p) = tree.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    /// Remove `node` (and its subtree) from the document.
    pub fn detach(&self, node: NodeId) {
        let mut tree = self.tree.borrow_mut();
        let parent = tree.get(node).and_then(|n| n.parent);
        if let Some(parent) = parent
            && let Some(p) = tree.get_mut(parent)
        {
            p.children.retain(|c| *c != node);
        }
        tree.set_attached(node, false);
        if tree.focused.is_some_and(|f| !tree.attached(f)) {
            tree.focused = None;
        }
    }

    pub fn set_rect(&self, node: NodeId, rect: Rect) {
        if let Some(n) = self.tree.borrow_mut().get_mut(node) {
            n.rect = rect;
        }
    }

    /// Simulate `display: none` from a stylesheet.
    pub fn set_display_none(&self, node: NodeId, none: bool) {
        if let Some(n) = self.tree.borrow_mut().get_mut(node) {
            n.display_none = none;
        }
    }

    pub fn set_checked(&self, node: NodeId, checked: bool) {
        if let Some(n) = self.tree.borrow_mut().get_mut(node) {
            n.checked = checked;
        }
    }

    /// Mark a control as failing native validation.
    pub fn set_invalid(&self, node: NodeId, invalid: bool) {
        if let Some(n) = self.tree.borrow_mut().get_mut(node) {
            n.invalid = invalid;
        }
    }

    /// Current inline style value.
    #[must_use]
    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.tree.borrow().get(node).and_then(|n| {
            n.styles
                .iter()
                .find(|(k, _)| k == property)
                .map(|(_, v)| v.clone())
        })
    }

    /// Every style write to `node`, oldest first.
    #[must_use]
    pub fn style_writes(&self, node: NodeId) -> Vec<(String, String)> {
        self.tree
            .borrow()
            .style_log
            .iter()
            .filter(|(n, _, _)| *n == node)
            .map(|(_, k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn clear_style_log(&self) {
        self.tree.borrow_mut().style_log.clear();
    }

    #[must_use]
    pub fn text(&self, node: NodeId) -> String {
        self.tree
            .borrow()
            .get(node)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .borrow()
            .get(node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_observed(&self, node: NodeId) -> bool {
        self.tree.borrow().observed.iter().any(|(n, _)| *n == node)
    }

    #[must_use]
    pub fn observe_options(&self, node: NodeId) -> Option<ObserveOptions> {
        self.tree
            .borrow()
            .observed
            .iter()
            .find(|(n, _)| *n == node)
            .map(|(_, o)| o.clone())
    }

    #[must_use]
    pub fn scrolled_into_view(&self) -> Vec<NodeId> {
        self.tree.borrow().scrolled.clone()
    }

    /// The browser's default Tab behavior: move focus to the next (or
    /// previous) focusable, rendered element in document order, wrapping.
    pub fn simulate_tab(&self, shift: bool) -> Option<NodeId> {
        let order: Vec<NodeId> = self
            .descendants(self.body())
            .into_iter()
            .filter(|&n| {
                self.element(n)
                    .is_some_and(|info| info.rendered && default_tab_stop(&info))
            })
            .collect();
        if order.is_empty() {
            return None;
        }
        let current = self
            .active_element()
            .and_then(|a| order.iter().position(|n| *n == a));
        let next = match (current, shift) {
            (None, false) => 0,
            (None, true) => order.len() - 1,
            (Some(i), false) => (i + 1) % order.len(),
            (Some(i), true) => (i + order.len() - 1) % order.len(),
        };
        let target = order[next];
        self.focus(target);
        Some(target)
    }
}

fn default_tab_stop(info: &ElementInfo) -> bool {
    if info.tab_index.is_some_and(|t| t < 0) {
        return false;
    }
    match info.tag.as_str() {
        "a" | "area" => info.has_href,
        "button" | "select" | "textarea" => !info.disabled,
        "input" => !info.disabled && info.input_type.as_deref() != Some("hidden"),
        _ => info.content_editable || info.tab_index.is_some(),
    }
}

impl Dom for MemoryDom {
    fn query(&self, scope: Option<NodeId>, selector: &str) -> Option<NodeId> {
        self.query_all(scope, selector).into_iter().next()
    }

    fn query_all(&self, scope: Option<NodeId>, selector: &str) -> Vec<NodeId> {
        let Some(list) = SelectorList::parse(selector) else {
            return Vec::new();
        };
        let tree = self.tree.borrow();
        let root = scope.unwrap_or(NodeId::from_raw(0));
        if !tree.attached(root) {
            return Vec::new();
        }
        let mut candidates = Vec::new();
        tree.walk(root, &mut candidates);
        candidates
            .into_iter()
            .filter(|&n| tree.matches(n, &list))
            .collect()
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        SelectorList::parse(selector).is_some_and(|list| self.tree.borrow().matches(node, &list))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.tree.borrow().get(node).and_then(|n| n.parent)
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let tree = self.tree.borrow();
        let mut out = Vec::new();
        tree.walk(root, &mut out);
        out
    }

    fn element(&self, node: NodeId) -> Option<ElementInfo> {
        let tree = self.tree.borrow();
        let data = tree.get(node)?;
        Some(ElementInfo {
            tag: data.tag.clone(),
            disabled: data.attr("disabled").is_some(),
            tab_index: data.attr("tabindex").and_then(|v| v.trim().parse().ok()),
            has_href: data.attr("href").is_some(),
            input_type: data.attr("type").map(str::to_ascii_lowercase),
            content_editable: data
                .attr("contenteditable")
                .is_some_and(|v| !v.eq_ignore_ascii_case("false")),
            rendered: tree.rendered(node),
        })
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.tree.borrow().attached(node)
    }

    fn document_body(&self) -> Option<NodeId> {
        Some(self.body())
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree
            .borrow()
            .get(node)
            .is_some_and(|n| Subject::has_class(n, class))
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if let Some(n) = self.tree.borrow_mut().get_mut(node)
            && !n.classes.iter().any(|c| c == class)
        {
            n.classes.push(class.to_string());
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(n) = self.tree.borrow_mut().get_mut(node) {
            n.classes.retain(|c| c != class);
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree
            .borrow()
            .get(node)
            .and_then(|n| n.attr(name).map(str::to_string))
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(n) = self.tree.borrow_mut().get_mut(node) {
            match n.attributes.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value.to_string(),
                None => n.attributes.push((name.to_string(), value.to_string())),
            }
        }
    }

    fn remove_attribute(&self, node: NodeId, name: &str) {
        if let Some(n) = self.tree.borrow_mut().get_mut(node) {
            n.attributes.retain(|(k, _)| k != name);
        }
    }

    fn set_hidden(&self, node: NodeId, hidden: bool) {
        if let Some(n) = self.tree.borrow_mut().get_mut(node) {
            n.hidden = hidden;
        }
    }

    fn is_hidden(&self, node: NodeId) -> bool {
        self.tree.borrow().get(node).is_some_and(|n| n.hidden)
    }

    fn is_checked(&self, node: NodeId) -> bool {
        self.tree.borrow().get(node).is_some_and(|n| n.checked)
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        let mut tree = self.tree.borrow_mut();
        let Some(n) = tree.get_mut(node) else {
            return;
        };
        match n.styles.iter_mut().find(|(k, _)| k == property) {
            Some(slot) => slot.1 = value.to_string(),
            None => n.styles.push((property.to_string(), value.to_string())),
        }
        tree.style_log
            .push((node, property.to_string(), value.to_string()));
    }

    fn set_text(&self, node: NodeId, text: &str) {
        if let Some(n) = self.tree.borrow_mut().get_mut(node) {
            n.text = text.to_string();
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        let tree = self.tree.borrow();
        if !tree.rendered(node) {
            return Rect::default();
        }
        tree.get(node).map(|n| n.rect).unwrap_or_default()
    }

    fn create_element(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        if !self.is_attached(parent) {
            return None;
        }
        Some(self.append(parent, tag))
    }

    fn focus(&self, node: NodeId) {
        let mut tree = self.tree.borrow_mut();
        if tree.attached(node) {
            tree.focused = Some(node);
        }
    }

    fn active_element(&self) -> Option<NodeId> {
        self.tree.borrow().focused
    }

    fn scroll_into_view(&self, node: NodeId) {
        self.tree.borrow_mut().scrolled.push(node);
    }

    fn observe(&self, node: NodeId, options: ObserveOptions) {
        let mut tree = self.tree.borrow_mut();
        tree.observed.retain(|(n, _)| *n != node);
        tree.observed.push((node, options));
    }

    fn unobserve(&self, node: NodeId) {
        self.tree.borrow_mut().observed.retain(|(n, _)| *n != node);
    }

    fn first_invalid(&self, form: NodeId) -> Option<NodeId> {
        let tree = self.tree.borrow();
        let mut subtree = Vec::new();
        tree.walk(form, &mut subtree);
        subtree
            .into_iter()
            .find(|&n| tree.get(n).is_some_and(|d| d.invalid && d.attached))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_respects_scope_and_order() {
        let dom = MemoryDom::new();
        let nav = dom.append_with(dom.body(), "nav", &[("id", "menu")]);
        let a1 = dom.append_with(nav, "a", &[("href", "#a")]);
        let a2 = dom.append_with(nav, "a", &[("href", "#b")]);
        let outside = dom.append_with(dom.body(), "a", &[("href", "#c")]);

        assert_eq!(dom.query(None, "#menu"), Some(nav));
        assert_eq!(dom.query_all(Some(nav), "a"), vec![a1, a2]);
        assert_eq!(dom.query_all(None, "a"), vec![a1, a2, outside]);
        assert!(dom.query(Some(nav), "#menu").is_none());
    }

    #[test]
    fn detached_nodes_are_not_queried_or_focused() {
        let dom = MemoryDom::new();
        let div = dom.append_with(dom.body(), "div", &[("class", "x")]);
        let link = dom.append_with(div, "a", &[("href", "#")]);
        dom.focus(link);
        dom.detach(div);
        assert!(!dom.is_attached(link));
        assert!(dom.query(None, ".x").is_none());
        assert_eq!(dom.active_element(), None);
        dom.focus(link);
        assert_eq!(dom.active_element(), None);
    }

    #[test]
    fn hidden_ancestor_stops_rendering() {
        let dom = MemoryDom::new();
        let wrap = dom.append(dom.body(), "div");
        let button = dom.append(wrap, "button");
        assert!(dom.element(button).unwrap().rendered);
        dom.set_hidden(wrap, true);
        assert!(!dom.element(button).unwrap().rendered);
        assert!(dom.bounding_rect(button).is_empty());
    }

    #[test]
    fn style_log_records_every_write() {
        let dom = MemoryDom::new();
        let bar = dom.append(dom.body(), "span");
        dom.set_style(bar, "width", "0%");
        dom.set_style(bar, "width", "100%");
        assert_eq!(dom.style(bar, "width").as_deref(), Some("100%"));
        assert_eq!(
            dom.style_writes(bar),
            vec![
                ("width".to_string(), "0%".to_string()),
                ("width".to_string(), "100%".to_string())
            ]
        );
    }

    #[test]
    fn simulate_tab_wraps_document_order() {
        let dom = MemoryDom::new();
        let a = dom.append_with(dom.body(), "a", &[("href", "#")]);
        let _skipped = dom.append_with(dom.body(), "button", &[("disabled", "")]);
        let b = dom.append(dom.body(), "button");
        assert_eq!(dom.simulate_tab(false), Some(a));
        assert_eq!(dom.simulate_tab(false), Some(b));
        assert_eq!(dom.simulate_tab(false), Some(a));
        assert_eq!(dom.simulate_tab(true), Some(b));
    }

    #[test]
    fn first_invalid_in_form() {
        let dom = MemoryDom::new();
        let form = dom.append(dom.body(), "form");
        let name = dom.append(form, "input");
        let email = dom.append(form, "input");
        assert_eq!(dom.first_invalid(form), None);
        dom.set_invalid(email, true);
        dom.set_invalid(name, true);
        assert_eq!(dom.first_invalid(form), Some(name));
    }
}
