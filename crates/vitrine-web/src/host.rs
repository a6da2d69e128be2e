#![forbid(unsafe_code)]

//! Browser [`Dom`] backed by `web-sys`.
//!
//! Elements get a [`NodeId`] the first time the interaction layer (or the
//! JavaScript host, through [`WebDom::node_id`]) sees them. Ids are never
//! recycled. Intersection notifications arrive asynchronously from the
//! browser; they are queued and handed to the session on the next frame.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use js_sys::Array;
use tracing::{trace, warn};
use vitrine_core::{Dom, ElementInfo, IntersectionEntry, NodeId, ObserveOptions, PageEvent, Rect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, FocusOptions, HtmlElement, HtmlInputElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

const INVALID_CONTROLS: &str = "input:invalid, select:invalid, textarea:invalid";

#[derive(Debug, Default)]
struct Registry {
    elements: Vec<Element>,
}

impl Registry {
    fn id_of(&mut self, element: &Element) -> NodeId {
        let index = match self.elements.iter().position(|e| e == element) {
            Some(index) => index,
            None => {
                self.elements.push(element.clone());
                self.elements.len() - 1
            }
        };
        NodeId::from_raw(index as u64)
    }

    fn get(&self, id: NodeId) -> Option<&Element> {
        self.elements.get(id.raw() as usize)
    }
}

type ObserverCallback = Closure<dyn FnMut(Array, IntersectionObserver)>;

struct Observer {
    threshold_bits: u64,
    root_margin: String,
    observer: IntersectionObserver,
    _callback: ObserverCallback,
}

pub struct WebDom {
    document: Document,
    registry: Rc<RefCell<Registry>>,
    observers: RefCell<Vec<Observer>>,
    inbox: Rc<RefCell<VecDeque<PageEvent>>>,
}

impl std::fmt::Debug for WebDom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebDom")
            .field("nodes", &self.registry.borrow().elements.len())
            .field("observers", &self.observers.borrow().len())
            .field("queued", &self.inbox.borrow().len())
            .finish()
    }
}

impl WebDom {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            registry: Rc::new(RefCell::new(Registry::default())),
            observers: RefCell::new(Vec::new()),
            inbox: Rc::new(RefCell::new(VecDeque::new())),
        }
    }

    /// Id for `element`, registering it when new.
    pub fn node_id(&self, element: &Element) -> NodeId {
        self.registry.borrow_mut().id_of(element)
    }

    /// Intersection notifications queued since the last call.
    pub fn drain_notifications(&self) -> Vec<PageEvent> {
        self.inbox.borrow_mut().drain(..).collect()
    }

    fn get(&self, node: NodeId) -> Option<Element> {
        self.registry.borrow().get(node).cloned()
    }

    fn html(&self, node: NodeId) -> Option<HtmlElement> {
        self.get(node)?.dyn_into::<HtmlElement>().ok()
    }

    fn id(&self, element: &Element) -> NodeId {
        self.node_id(element)
    }

    fn collect(&self, list: web_sys::NodeList) -> Vec<NodeId> {
        (0..list.length())
            .filter_map(|i| list.item(i))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .map(|element| self.id(&element))
            .collect()
    }

    fn observer_for(&self, options: &ObserveOptions) -> Option<IntersectionObserver> {
        let bits = options.threshold.to_bits();
        if let Some(existing) = self
            .observers
            .borrow()
            .iter()
            .find(|o| o.threshold_bits == bits && o.root_margin == options.root_margin)
        {
            return Some(existing.observer.clone());
        }

        let registry = Rc::clone(&self.registry);
        let inbox = Rc::clone(&self.inbox);
        let callback: ObserverCallback = Closure::new(move |entries: Array, _: IntersectionObserver| {
            let mut inbox = inbox.borrow_mut();
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                let target = registry.borrow_mut().id_of(&entry.target());
                inbox.push_back(PageEvent::Intersection(IntersectionEntry {
                    target,
                    ratio: entry.intersection_ratio(),
                    is_intersecting: entry.is_intersecting(),
                }));
            }
        });

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin);
        let observer =
            match IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init) {
                Ok(observer) => observer,
                Err(err) => {
                    warn!(?err, margin = %options.root_margin, "IntersectionObserver rejected options");
                    return None;
                }
            };
        self.observers.borrow_mut().push(Observer {
            threshold_bits: bits,
            root_margin: options.root_margin.clone(),
            observer: observer.clone(),
            _callback: callback,
        });
        trace!(threshold = options.threshold, margin = %options.root_margin, "observer created");
        Some(observer)
    }
}

impl Drop for WebDom {
    fn drop(&mut self) {
        for observer in self.observers.borrow().iter() {
            observer.observer.disconnect();
        }
    }
}

impl Dom for WebDom {
    fn query(&self, scope: Option<NodeId>, selector: &str) -> Option<NodeId> {
        let found = match scope {
            Some(scope) => self.get(scope)?.query_selector(selector),
            None => self.document.query_selector(selector),
        };
        found.ok().flatten().map(|e| self.id(&e))
    }

    fn query_all(&self, scope: Option<NodeId>, selector: &str) -> Vec<NodeId> {
        let found = match scope {
            Some(scope) => match self.get(scope) {
                Some(scope) => scope.query_selector_all(selector),
                None => return Vec::new(),
            },
            None => self.document.query_selector_all(selector),
        };
        found.map(|list| self.collect(list)).unwrap_or_default()
    }

    fn matches(&self, node: NodeId, selector: &str) -> bool {
        self.get(node)
            .is_some_and(|e| e.matches(selector).unwrap_or(false))
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.get(node)?.parent_element()?;
        Some(self.id(&parent))
    }

    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        self.query_all(Some(root), "*")
    }

    fn element(&self, node: NodeId) -> Option<ElementInfo> {
        let e = self.get(node)?;
        let tag = e.tag_name().to_ascii_lowercase();
        let input_type = (tag == "input").then(|| {
            e.get_attribute("type")
                .map_or_else(|| "text".to_string(), |t| t.to_ascii_lowercase())
        });
        Some(ElementInfo {
            disabled: e.has_attribute("disabled"),
            tab_index: e
                .get_attribute("tabindex")
                .and_then(|t| t.trim().parse().ok()),
            has_href: e.has_attribute("href"),
            input_type,
            content_editable: e
                .get_attribute("contenteditable")
                .is_some_and(|v| !v.eq_ignore_ascii_case("false")),
            rendered: e.get_client_rects().length() > 0,
            tag,
        })
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|e| e.is_connected())
    }

    fn document_body(&self) -> Option<NodeId> {
        let body: Element = self.document.body()?.into();
        Some(self.id(&body))
    }

    fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        match (self.get(ancestor), self.get(node)) {
            (Some(a), Some(n)) => a.contains(Some(n.as_ref())),
            _ => false,
        }
    }

    fn closest(&self, node: NodeId, selector: &str) -> Option<NodeId> {
        let found = self.get(node)?.closest(selector).ok().flatten()?;
        Some(self.id(&found))
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.get(node).is_some_and(|e| e.class_list().contains(class))
    }

    fn add_class(&self, node: NodeId, class: &str) {
        if let Some(e) = self.get(node) {
            let _ = e.class_list().add_1(class);
        }
    }

    fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(e) = self.get(node) {
            let _ = e.class_list().remove_1(class);
        }
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.get(node)?.get_attribute(name)
    }

    fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        if let Some(e) = self.get(node) {
            let _ = e.set_attribute(name, value);
        }
    }

    fn remove_attribute(&self, node: NodeId, name: &str) {
        if let Some(e) = self.get(node) {
            let _ = e.remove_attribute(name);
        }
    }

    fn set_hidden(&self, node: NodeId, hidden: bool) {
        match self.html(node) {
            Some(html) => html.set_hidden(hidden),
            None if hidden => self.set_attribute(node, "hidden", ""),
            None => self.remove_attribute(node, "hidden"),
        }
    }

    fn is_hidden(&self, node: NodeId) -> bool {
        self.get(node).is_some_and(|e| e.has_attribute("hidden"))
    }

    fn is_checked(&self, node: NodeId) -> bool {
        self.get(node)
            .and_then(|e| e.dyn_into::<HtmlInputElement>().ok())
            .is_some_and(|input| input.checked())
    }

    fn set_style(&self, node: NodeId, property: &str, value: &str) {
        if let Some(html) = self.html(node) {
            let _ = html.style().set_property(property, value);
        }
    }

    fn set_text(&self, node: NodeId, text: &str) {
        if let Some(e) = self.get(node) {
            e.set_text_content(Some(text));
        }
    }

    fn bounding_rect(&self, node: NodeId) -> Rect {
        self.get(node).map_or_else(Rect::default, |e| {
            let r = e.get_bounding_client_rect();
            Rect::new(r.x(), r.y(), r.width(), r.height())
        })
    }

    fn create_element(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        let parent = self.get(parent)?;
        let child = self.document.create_element(tag).ok()?;
        parent.append_child(&child).ok()?;
        Some(self.id(&child))
    }

    fn focus(&self, node: NodeId) {
        if let Some(html) = self.html(node) {
            let options = FocusOptions::new();
            options.set_prevent_scroll(true);
            let _ = html.focus_with_options(&options);
        }
    }

    fn active_element(&self) -> Option<NodeId> {
        let active = self.document.active_element()?;
        let body: Option<Element> = self.document.body().map(Into::into);
        if body.as_ref() == Some(&active) {
            return None;
        }
        Some(self.id(&active))
    }

    fn scroll_into_view(&self, node: NodeId) {
        if let Some(e) = self.get(node) {
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Center);
            e.scroll_into_view_with_scroll_into_view_options(&options);
        }
    }

    fn observe(&self, node: NodeId, options: ObserveOptions) {
        let Some(element) = self.get(node) else {
            return;
        };
        if let Some(observer) = self.observer_for(&options) {
            observer.observe(&element);
        }
    }

    fn unobserve(&self, node: NodeId) {
        let Some(element) = self.get(node) else {
            return;
        };
        for observer in self.observers.borrow().iter() {
            observer.observer.unobserve(&element);
        }
    }

    fn first_invalid(&self, form: NodeId) -> Option<NodeId> {
        self.query(Some(form), INVALID_CONTROLS)
    }
}
