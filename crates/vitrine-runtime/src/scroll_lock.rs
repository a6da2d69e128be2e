#![forbid(unsafe_code)]

//! Reference-counted page scroll lock.
//!
//! The body carries [`SCROLL_LOCK_CLASS`] while at least one
//! [`ScrollLockGuard`] is alive. Overlays of different kinds each hold their
//! own guard, so closing one never unlocks the page under another.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use tracing::debug;
use vitrine_core::DomHandle;

/// Body class applied while scrolling is locked.
pub const SCROLL_LOCK_CLASS: &str = "no-scroll";

struct Inner {
    dom: DomHandle,
    holders: Cell<usize>,
}

impl Inner {
    fn write(&self, locked: bool) {
        let Some(body) = self.dom.document_body() else {
            return;
        };
        if locked {
            self.dom.add_class(body, SCROLL_LOCK_CLASS);
        } else {
            self.dom.remove_class(body, SCROLL_LOCK_CLASS);
        }
        debug!(locked, "page scroll lock");
    }
}

/// Shared lock. Clones share the holder count.
#[derive(Clone)]
pub struct ScrollLock {
    inner: Rc<Inner>,
}

impl fmt::Debug for ScrollLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLock")
            .field("holders", &self.inner.holders.get())
            .finish()
    }
}

impl ScrollLock {
    #[must_use]
    pub fn new(dom: DomHandle) -> Self {
        Self {
            inner: Rc::new(Inner {
                dom,
                holders: Cell::new(0),
            }),
        }
    }

    /// Take a hold on the lock; the first holder locks the page.
    #[must_use = "dropping the guard releases the lock"]
    pub fn acquire(&self) -> ScrollLockGuard {
        let holders = self.inner.holders.get() + 1;
        self.inner.holders.set(holders);
        if holders == 1 {
            self.inner.write(true);
        }
        ScrollLockGuard {
            inner: Rc::clone(&self.inner),
        }
    }

    #[must_use]
    pub fn holders(&self) -> usize {
        self.inner.holders.get()
    }

    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.holders() > 0
    }
}

/// One hold on a [`ScrollLock`]. The last guard dropped unlocks the page.
#[must_use = "dropping the guard releases the lock"]
pub struct ScrollLockGuard {
    inner: Rc<Inner>,
}

impl fmt::Debug for ScrollLockGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScrollLockGuard").finish_non_exhaustive()
    }
}

impl Drop for ScrollLockGuard {
    fn drop(&mut self) {
        let holders = self.inner.holders.get().saturating_sub(1);
        self.inner.holders.set(holders);
        if holders == 0 {
            self.inner.write(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::Dom;
    use tracing_test::traced_test;
    use vitrine_core::dom::memory::MemoryDom;

    #[test]
    fn two_holders_compose() {
        let dom = Rc::new(MemoryDom::new());
        let body = dom.body();
        let lock = ScrollLock::new(dom.clone());

        let drawer = lock.acquire();
        let modal = lock.acquire();
        assert!(dom.has_class(body, SCROLL_LOCK_CLASS));

        drop(drawer);
        assert!(lock.is_locked());
        assert!(dom.has_class(body, SCROLL_LOCK_CLASS));

        drop(modal);
        assert!(!lock.is_locked());
        assert!(!dom.has_class(body, SCROLL_LOCK_CLASS));
    }

    #[test]
    #[traced_test]
    fn lock_transitions_are_logged() {
        let dom = Rc::new(MemoryDom::new());
        let lock = ScrollLock::new(dom);
        drop(lock.acquire());
        assert!(logs_contain("page scroll lock"));
        assert!(logs_contain("locked=false"));
    }
}
