#![forbid(unsafe_code)]

//! Autoplay driver.
//!
//! Autoplay does not know about slides or the progress bar. It only writes
//! the shared deck index, and re-arms its timer whenever the deck changes,
//! whoever changed it. The next advance is therefore always one cycle after
//! the last transition.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{trace, warn};
use vitrine_runtime::{AppContext, Observable, Subscription, TimerId};

pub struct Autoplay {
    ctx: AppContext,
    timer: Rc<Cell<Option<TimerId>>>,
    _on_change: Subscription,
}

impl std::fmt::Debug for Autoplay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autoplay")
            .field("armed", &self.timer.get().is_some())
            .finish()
    }
}

fn arm(
    ctx: &AppContext,
    deck: &Observable<usize>,
    len: usize,
    cycle_ms: f64,
    timer: &Rc<Cell<Option<TimerId>>>,
) {
    if let Some(previous) = timer.take() {
        ctx.scheduler().clear_timeout(previous);
    }
    let deck = deck.clone();
    let fired = Rc::clone(timer);
    let id = ctx.set_timeout(cycle_ms, move || {
        fired.set(None);
        let next = (deck.get() + 1) % len;
        trace!(next, "autoplay advance");
        deck.set(next);
    });
    timer.set(Some(id));
}

impl Autoplay {
    /// Start cycling `deck` through `len` slides. Returns `None` when there
    /// is nothing to cycle or `cycle_ms` is not a positive, finite delay.
    pub fn start(
        ctx: &AppContext,
        deck: &Observable<usize>,
        len: usize,
        cycle_ms: f64,
    ) -> Option<Self> {
        if len < 2 {
            return None;
        }
        if !(cycle_ms.is_finite() && cycle_ms > 0.0) {
            warn!(cycle_ms, "autoplay disabled: cycle must be a positive delay");
            return None;
        }
        let timer = Rc::new(Cell::new(None));
        arm(ctx, deck, len, cycle_ms, &timer);

        let on_change = {
            let ctx = ctx.clone();
            let deck_handle = deck.clone();
            let timer = Rc::clone(&timer);
            deck.subscribe(move |_| arm(&ctx, &deck_handle, len, cycle_ms, &timer))
        };

        Some(Self {
            ctx: ctx.clone(),
            timer,
            _on_change: on_change,
        })
    }

    #[inline]
    pub fn is_armed(&self) -> bool {
        self.timer.get().is_some()
    }
}

impl Drop for Autoplay {
    fn drop(&mut self) {
        if let Some(timer) = self.timer.take() {
            self.ctx.scheduler().clear_timeout(timer);
        }
    }
}
