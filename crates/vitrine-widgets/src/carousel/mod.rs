#![forbid(unsafe_code)]

//! Hero carousel synchronizer.
//!
//! The active slide lives in a shared [`Observable`] deck. User navigation
//! (arrows, dots, swipes) goes through [`Carousel::set_active`]; the autoplay
//! driver, or any other component holding the deck, writes the deck
//! directly. Either way the synchronizer applies the same transition: one
//! `active` slide, a fresh transition timestamp, synced dots, and a progress
//! restart.
//!
//! # Invariants
//!
//! - Exactly one slide carries `active`; `active_index < slide_count`.
//! - The deck always reads the active index. A deck write past the end
//!   wraps modulo the slide count.
//! - Setting the current index is a no-op: no writes, no timestamp reset.
//! - `last_transition` updates on every index change regardless of origin.

mod autoplay;
mod progress;
mod swipe;

pub use autoplay::Autoplay;
pub use progress::{ProgressBar, css_number, progress_percent};
pub use swipe::{SwipeDirection, SwipeTracker, classify};

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;
use vitrine_core::config::CarouselConfig;
use vitrine_core::{
    Dom, EventOutcome, InteractionError, IntersectionEntry, NodeId, ObserveOptions, Point,
    Timestamp,
};
use vitrine_runtime::{AppContext, Observable, Subscription};

/// Class marking the visible slide and the selected dot.
pub const ACTIVE_CLASS: &str = "active";

/// Where a slide change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOrigin {
    /// Arrow, dot or swipe.
    User,
    /// A deck write by another component (autoplay).
    External,
}

/// Snapshot of the synchronizer's state.
#[derive(Debug, Clone, PartialEq)]
pub struct CarouselState {
    pub slides: Vec<NodeId>,
    pub active: usize,
    pub cycle_ms: f64,
    pub last_transition: Timestamp,
}

struct Shared {
    ctx: AppContext,
    state: RefCell<CarouselState>,
    dots: Vec<NodeId>,
    progress: RefCell<Option<ProgressBar>>,
}

impl Shared {
    /// Apply a transition to `index`. Returns whether anything changed.
    fn apply(&self, index: usize, origin: TransitionOrigin) -> bool {
        let dom = self.ctx.dom();
        {
            let mut state = self.state.borrow_mut();
            if index >= state.slides.len() || index == state.active {
                return false;
            }
            dom.remove_class(state.slides[state.active], ACTIVE_CLASS);
            dom.add_class(state.slides[index], ACTIVE_CLASS);
            state.active = index;
            state.last_transition = self.ctx.now();
        }
        self.sync_dots(index);
        if let Some(progress) = self.progress.borrow_mut().as_mut() {
            progress.restart();
        }
        debug!(index, ?origin, "slide transition");
        true
    }

    fn sync_dots(&self, index: usize) {
        let dom = self.ctx.dom();
        for (k, &dot) in self.dots.iter().enumerate() {
            let selected = k == index;
            dom.set_attribute(dot, "aria-selected", if selected { "true" } else { "false" });
            if selected {
                dom.add_class(dot, ACTIVE_CLASS);
            } else {
                dom.remove_class(dot, ACTIVE_CLASS);
            }
        }
    }
}

pub struct Carousel {
    shared: Rc<Shared>,
    root: NodeId,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    deck: Observable<usize>,
    swipe: SwipeTracker,
    visibility_threshold: f64,
    autoplay: Option<Autoplay>,
    _sync: Subscription,
}

impl std::fmt::Debug for Carousel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Carousel")
            .field("root", &self.root)
            .field("state", &*self.shared.state.borrow())
            .field("autoplay", &self.autoplay)
            .finish_non_exhaustive()
    }
}

fn create_dots(dom: &dyn Dom, container: NodeId, count: usize) -> Vec<NodeId> {
    (0..count)
        .filter_map(|i| {
            let dot = dom.create_element(container, "button")?;
            dom.set_attribute(dot, "type", "button");
            dom.set_attribute(dot, "role", "tab");
            dom.set_attribute(dot, "aria-label", &format!("Slide {}", i + 1));
            dom.set_attribute(dot, "aria-selected", "false");
            Some(dot)
        })
        .collect()
}

impl Carousel {
    pub fn mount(ctx: &AppContext, cfg: &CarouselConfig) -> Result<Self, InteractionError> {
        let dom = ctx.dom();
        let root = dom
            .query(None, &cfg.root)
            .ok_or_else(|| InteractionError::missing("carousel", &cfg.root))?;
        let slides = dom.query_all(Some(root), &cfg.slide);
        if slides.is_empty() {
            return Err(InteractionError::missing("carousel", &cfg.slide));
        }

        let active = slides
            .iter()
            .position(|&s| dom.has_class(s, ACTIVE_CLASS))
            .unwrap_or(0);
        for (i, &slide) in slides.iter().enumerate() {
            if i == active {
                dom.add_class(slide, ACTIVE_CLASS);
            } else {
                dom.remove_class(slide, ACTIVE_CLASS);
            }
        }

        let dots = dom
            .query(Some(root), &cfg.dots)
            .map(|container| create_dots(dom.as_ref(), container, slides.len()))
            .unwrap_or_default();
        let progress = dom
            .query(Some(root), &cfg.progress)
            .map(|bar| ProgressBar::new(ctx, bar, cfg.cycle_ms));

        let slide_count = slides.len();
        let shared = Rc::new(Shared {
            ctx: ctx.clone(),
            state: RefCell::new(CarouselState {
                slides,
                active,
                cycle_ms: cfg.cycle_ms,
                last_transition: ctx.now(),
            }),
            dots,
            progress: RefCell::new(progress),
        });
        shared.sync_dots(active);
        if let Some(progress) = shared.progress.borrow_mut().as_mut() {
            progress.restart();
        }

        // Out-of-range writes wrap, and the wrapped index is written back so
        // the deck never disagrees with the active slide.
        let deck = Observable::new(active);
        let sync = {
            let shared = Rc::clone(&shared);
            let handle = deck.clone();
            deck.subscribe(move |&written| {
                let index = written % slide_count;
                shared.apply(index, TransitionOrigin::External);
                if index != written {
                    handle.set(index);
                }
            })
        };

        let autoplay = if cfg.autoplay && !ctx.reduced_motion() {
            Autoplay::start(ctx, &deck, slide_count, cfg.cycle_ms)
        } else {
            None
        };

        dom.observe(root, ObserveOptions::threshold(cfg.visibility_threshold));
        debug!(slides = slide_count, active, autoplay = autoplay.is_some(), "carousel mounted");

        Ok(Self {
            shared,
            root,
            prev: dom.query(Some(root), &cfg.prev),
            next: dom.query(Some(root), &cfg.next),
            deck,
            swipe: SwipeTracker::new(cfg.swipe_threshold_px),
            visibility_threshold: cfg.visibility_threshold,
            autoplay,
            _sync: sync,
        })
    }

    /// The shared slide deck. Writing it is an external transition.
    #[inline]
    pub fn deck(&self) -> &Observable<usize> {
        &self.deck
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn active_index(&self) -> usize {
        self.shared.state.borrow().active
    }

    pub fn slide_count(&self) -> usize {
        self.shared.state.borrow().slides.len()
    }

    pub fn last_transition(&self) -> Timestamp {
        self.shared.state.borrow().last_transition
    }

    pub fn state(&self) -> CarouselState {
        self.shared.state.borrow().clone()
    }

    pub fn has_autoplay(&self) -> bool {
        self.autoplay.is_some()
    }

    pub fn progress_in_view(&self) -> bool {
        self.shared
            .progress
            .borrow()
            .as_ref()
            .is_some_and(ProgressBar::is_in_view)
    }

    /// Move to `index`. Out-of-range and current indices are ignored.
    pub fn set_active(&self, index: usize, origin: TransitionOrigin) -> bool {
        if !self.shared.apply(index, origin) {
            return false;
        }
        self.deck.set(index);
        true
    }

    pub fn next(&self) -> bool {
        let len = self.slide_count();
        self.set_active((self.active_index() + 1) % len, TransitionOrigin::User)
    }

    pub fn prev(&self) -> bool {
        let len = self.slide_count();
        self.set_active((self.active_index() + len - 1) % len, TransitionOrigin::User)
    }

    /// Arrow and dot clicks.
    pub fn handle_click(&self, target: NodeId) -> EventOutcome {
        let dom = self.shared.ctx.dom();
        let hits = |node: Option<NodeId>| node.is_some_and(|n| dom.contains(n, target));
        if hits(self.prev) {
            self.prev();
        } else if hits(self.next) {
            self.next();
        } else if let Some(index) = self.shared.dots.iter().position(|&d| dom.contains(d, target)) {
            self.set_active(index, TransitionOrigin::User);
        }
        EventOutcome::IGNORED
    }

    /// Touch start inside the carousel begins a swipe.
    pub fn handle_touch_start(&mut self, at: Point) {
        if self.shared.ctx.dom().bounding_rect(self.root).contains(at) {
            self.swipe.begin(at);
        }
    }

    pub fn handle_touch_end(&mut self, at: Point) {
        match self.swipe.finish(at) {
            Some(SwipeDirection::Next) => {
                self.next();
            }
            Some(SwipeDirection::Prev) => {
                self.prev();
            }
            None => {}
        }
    }

    /// Freeze or resume the progress bar as the carousel leaves or enters
    /// the viewport.
    pub fn handle_intersection(&self, entry: &IntersectionEntry) -> bool {
        if entry.target != self.root {
            return false;
        }
        let visible = entry.passes(self.visibility_threshold);
        let elapsed = self.shared.ctx.now().since(self.last_transition());
        let mut progress = self.shared.progress.borrow_mut();
        let Some(progress) = progress.as_mut() else {
            return true;
        };
        match (visible, progress.is_in_view()) {
            (true, false) => progress.resume(elapsed),
            (false, true) => progress.freeze(elapsed),
            _ => {}
        }
        true
    }
}
