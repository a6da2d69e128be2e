#![forbid(unsafe_code)]

//! Open/close lifecycle for drawers and modals.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, trace};
use vitrine_core::config::{MenuConfig, ModalConfig};
use vitrine_core::{EventOutcome, InteractionError, Key, KeyEvent, NodeId};
use vitrine_runtime::{AppContext, ListenerGuard, ListenerKind, ScrollLockGuard, TimerId};

use super::stack::OverlayStack;
use super::{OverlayId, OverlayKind};
use crate::focus_trap::{FocusTrap, TabOutcome};

/// Container class while open.
pub const OPEN_CLASS: &str = "open";
/// Backdrop class while open.
pub const BACKDROP_SHOW_CLASS: &str = "show";

/// The elements one overlay is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayParts {
    pub container: NodeId,
    /// Fixed toggle control. Modals opened from cards pass their trigger at
    /// open time instead.
    pub trigger: Option<NodeId>,
    pub backdrop: Option<NodeId>,
    pub close: Option<NodeId>,
    /// Links matching this selector inside the container close the overlay.
    pub close_on_link: Option<String>,
}

struct OverlayState {
    id: OverlayId,
    kind: OverlayKind,
    parts: OverlayParts,
    hide_delay_ms: f64,
    is_open: Rc<Cell<bool>>,
    trigger: Option<NodeId>,
    last_focused: Option<NodeId>,
    trap: Option<FocusTrap>,
    scroll_hold: Option<ScrollLockGuard>,
    keydown: Option<ListenerGuard>,
    pending_hide: Option<TimerId>,
}

/// Owns every registered overlay and the stack of open ones.
pub struct OverlayController {
    ctx: AppContext,
    overlays: Vec<OverlayState>,
    stack: OverlayStack,
    close_above_width: f64,
}

impl std::fmt::Debug for OverlayController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayController")
            .field("registered", &self.overlays.len())
            .field("stack", &self.stack)
            .finish_non_exhaustive()
    }
}

impl OverlayController {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            overlays: Vec::new(),
            stack: OverlayStack::new(),
            close_above_width: MenuConfig::default().close_above_width,
        }
    }

    /// Register an overlay in its closed state.
    pub fn register(
        &mut self,
        kind: OverlayKind,
        parts: OverlayParts,
        hide_delay_ms: f64,
    ) -> OverlayId {
        let id = OverlayId(self.overlays.len() as u32);
        let dom = self.ctx.dom();
        dom.set_attribute(parts.container, "aria-hidden", "true");
        if let Some(trigger) = parts.trigger {
            dom.set_attribute(trigger, "aria-expanded", "false");
        }
        if let Some(backdrop) = parts.backdrop {
            dom.set_hidden(backdrop, true);
        }
        debug!(?id, ?kind, "overlay registered");
        self.overlays.push(OverlayState {
            id,
            kind,
            trigger: parts.trigger,
            parts,
            hide_delay_ms,
            is_open: Rc::new(Cell::new(false)),
            last_focused: None,
            trap: None,
            scroll_hold: None,
            keydown: None,
            pending_hide: None,
        });
        id
    }

    /// Register the navigation drawer. Needs both the toggle and the container.
    pub fn register_drawer(&mut self, cfg: &MenuConfig) -> Result<OverlayId, InteractionError> {
        let dom = self.ctx.dom();
        let trigger = dom
            .query(None, &cfg.toggle)
            .ok_or_else(|| InteractionError::missing("menu", &cfg.toggle))?;
        let container = dom
            .query(None, &cfg.container)
            .ok_or_else(|| InteractionError::missing("menu", &cfg.container))?;
        let parts = OverlayParts {
            container,
            trigger: Some(trigger),
            backdrop: dom.query(None, &cfg.backdrop),
            close: None,
            close_on_link: Some(cfg.link.clone()),
        };
        self.close_above_width = cfg.close_above_width;
        Ok(self.register(OverlayKind::Drawer, parts, cfg.hide_delay_ms))
    }

    /// Register the detail modal container.
    pub fn register_modal(&mut self, cfg: &ModalConfig) -> Result<OverlayId, InteractionError> {
        let dom = self.ctx.dom();
        let container = dom
            .query(None, &cfg.container)
            .ok_or_else(|| InteractionError::missing("modal", &cfg.container))?;
        let parts = OverlayParts {
            container,
            trigger: None,
            backdrop: dom
                .query(Some(container), &cfg.backdrop)
                .or_else(|| dom.query(None, &cfg.backdrop)),
            close: dom.query(Some(container), &cfg.close),
            close_on_link: None,
        };
        Ok(self.register(OverlayKind::Modal, parts, cfg.hide_delay_ms))
    }

    fn state(&self, id: OverlayId) -> Option<&OverlayState> {
        self.overlays.get(id.0 as usize)
    }

    pub fn is_open(&self, id: OverlayId) -> bool {
        self.state(id).is_some_and(|s| s.is_open.get())
    }

    pub fn kind(&self, id: OverlayId) -> Option<OverlayKind> {
        self.state(id).map(|s| s.kind)
    }

    pub fn container(&self, id: OverlayId) -> Option<NodeId> {
        self.state(id).map(|s| s.parts.container)
    }

    /// Focusable set computed at the last open.
    pub fn focusable(&self, id: OverlayId) -> &[NodeId] {
        self.state(id)
            .and_then(|s| s.trap.as_ref())
            .map(FocusTrap::focusable)
            .unwrap_or(&[])
    }

    /// Top of the open stack.
    pub fn top(&self) -> Option<OverlayId> {
        self.stack.top()
    }

    pub fn open_count(&self) -> usize {
        self.stack.depth()
    }

    pub fn open(&mut self, id: OverlayId) -> bool {
        self.open_with_trigger(id, None)
    }

    /// Open `id`, remembering `trigger` as the focus fallback when given.
    /// Returns `false` when it was already open or is unknown.
    pub fn open_with_trigger(&mut self, id: OverlayId, trigger: Option<NodeId>) -> bool {
        let ctx = self.ctx.clone();
        let dom = ctx.dom();
        let Some(state) = self.overlays.get_mut(id.0 as usize) else {
            return false;
        };
        if state.is_open.get() {
            return false;
        }

        state.last_focused = dom.active_element();
        if let Some(trigger) = trigger {
            state.trigger = Some(trigger);
        }
        if let Some(timer) = state.pending_hide.take() {
            ctx.scheduler().clear_timeout(timer);
        }
        state.is_open.set(true);
        state.scroll_hold = Some(ctx.scroll_lock().acquire());

        let container = state.parts.container;
        dom.add_class(container, OPEN_CLASS);
        dom.remove_attribute(container, "aria-hidden");
        if let Some(backdrop) = state.parts.backdrop {
            dom.set_hidden(backdrop, false);
            dom.add_class(backdrop, BACKDROP_SHOW_CLASS);
        }
        if let Some(trigger) = state.trigger {
            dom.set_attribute(trigger, "aria-expanded", "true");
        }

        let trap = FocusTrap::capture(dom.as_ref(), container);
        if let Some(target) = trap.first().or(state.trigger) {
            dom.focus(target);
        }
        state.trap = Some(trap);
        state.keydown = Some(ctx.listeners().register(ListenerKind::Keydown));

        let z_index = self.stack.push(id);
        dom.set_style(container, "z-index", &z_index.to_string());
        debug!(?id, z_index, depth = self.stack.depth(), "overlay opened");
        true
    }

    /// Close `id`. Returns `false` when it was not open.
    pub fn close(&mut self, id: OverlayId) -> bool {
        let ctx = self.ctx.clone();
        let dom = ctx.dom();
        let Some(state) = self.overlays.get_mut(id.0 as usize) else {
            return false;
        };
        if !state.is_open.get() {
            return false;
        }

        state.is_open.set(false);
        state.scroll_hold = None;
        state.keydown = None;
        state.trap = None;

        let container = state.parts.container;
        dom.remove_class(container, OPEN_CLASS);
        if let Some(backdrop) = state.parts.backdrop {
            dom.remove_class(backdrop, BACKDROP_SHOW_CLASS);
        }
        if let Some(trigger) = state.trigger {
            dom.set_attribute(trigger, "aria-expanded", "false");
        }

        let restore = state
            .last_focused
            .take()
            .filter(|&node| dom.is_attached(node))
            .or(state.trigger);
        if let Some(target) = restore {
            dom.focus(target);
        }

        // Hide from assistive tech once the close transition has run, unless
        // the overlay was reopened in the meantime.
        let is_open = Rc::clone(&state.is_open);
        let backdrop = state.parts.backdrop;
        let hide_dom = Rc::clone(dom);
        state.pending_hide = Some(ctx.set_timeout(state.hide_delay_ms, move || {
            if is_open.get() {
                trace!("deferred hide skipped, overlay reopened");
                return;
            }
            hide_dom.set_attribute(container, "aria-hidden", "true");
            if let Some(backdrop) = backdrop {
                hide_dom.set_hidden(backdrop, true);
            }
        }));

        self.stack.remove(id);
        debug!(?id, depth = self.stack.depth(), "overlay closed");
        true
    }

    pub fn toggle(&mut self, id: OverlayId) -> bool {
        if self.is_open(id) {
            self.close(id)
        } else {
            self.open(id)
        }
    }

    /// Escape closes the top overlay; Tab cycles inside it.
    pub fn handle_key(&mut self, key: &KeyEvent) -> EventOutcome {
        let Some(top) = self.stack.top() else {
            return EventOutcome::IGNORED;
        };
        match key.key {
            Key::Escape => {
                self.close(top);
                EventOutcome::PREVENTED
            }
            Key::Tab => {
                let dom = Rc::clone(self.ctx.dom());
                let outcome = self
                    .state(top)
                    .and_then(|s| s.trap.as_ref())
                    .map_or(TabOutcome::PassThrough, |trap| {
                        trap.handle_tab(dom.as_ref(), key.shift())
                    });
                trace!(?top, ?outcome, "tab routed");
                if outcome.prevents_default() {
                    EventOutcome::PREVENTED
                } else {
                    EventOutcome::IGNORED
                }
            }
            _ => EventOutcome::IGNORED,
        }
    }

    /// Toggle controls, backdrops, close controls and drawer links.
    pub fn handle_click(&mut self, target: NodeId) -> EventOutcome {
        let dom = Rc::clone(self.ctx.dom());
        let hits = |node: Option<NodeId>| node.is_some_and(|n| dom.contains(n, target));

        let mut action = None;
        for state in &self.overlays {
            let open = state.is_open.get();
            if state.kind == OverlayKind::Drawer && hits(state.parts.trigger) {
                action = Some((state.id, !open));
                break;
            }
            if !open {
                continue;
            }
            if hits(state.parts.backdrop) || hits(state.parts.close) {
                action = Some((state.id, false));
                break;
            }
            if let Some(selector) = &state.parts.close_on_link
                && dom.contains(state.parts.container, target)
                && dom.closest(target, selector).is_some()
            {
                action = Some((state.id, false));
                break;
            }
        }

        match action {
            Some((id, true)) => {
                self.open(id);
            }
            Some((id, false)) => {
                self.close(id);
            }
            None => {}
        }
        EventOutcome::IGNORED
    }

    /// Close open drawers once the viewport is wider than the breakpoint.
    pub fn handle_resize(&mut self, width: f64) {
        if width <= self.close_above_width {
            return;
        }
        let open_drawers: Vec<OverlayId> = self
            .overlays
            .iter()
            .filter(|s| s.kind == OverlayKind::Drawer && s.is_open.get())
            .map(|s| s.id)
            .collect();
        for id in open_drawers {
            debug!(?id, width, "closing drawer above breakpoint");
            self.close(id);
        }
    }
}
