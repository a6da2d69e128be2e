#![forbid(unsafe_code)]

//! Registry of page-global listeners the host must keep attached.
//!
//! Subsystems hold a [`ListenerGuard`] for as long as they need a global
//! listener (for example keydown while an overlay is open). The host asks
//! [`ListenerRegistry::is_active`] before routing the event, and tooling can
//! assert that counts return to zero after open/close cycles.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;
use tracing::trace;

/// Kind of page-global listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerKind {
    /// Document keydown (Escape / Tab handling).
    Keydown,
}

/// Shared listener counts. Clones share state.
#[derive(Clone, Default)]
pub struct ListenerRegistry {
    counts: Rc<RefCell<AHashMap<ListenerKind, usize>>>,
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("counts", &*self.counts.borrow())
            .finish()
    }
}

impl ListenerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener of `kind`. Dropping the guard deregisters it.
    #[must_use = "dropping the guard deregisters the listener"]
    pub fn register(&self, kind: ListenerKind) -> ListenerGuard {
        let count = {
            let mut counts = self.counts.borrow_mut();
            let entry = counts.entry(kind).or_insert(0);
            *entry += 1;
            *entry
        };
        trace!(?kind, count, "listener registered");
        ListenerGuard {
            counts: Rc::clone(&self.counts),
            kind,
        }
    }

    /// Live registrations of `kind`.
    #[must_use]
    pub fn count(&self, kind: ListenerKind) -> usize {
        self.counts.borrow().get(&kind).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_active(&self, kind: ListenerKind) -> bool {
        self.count(kind) > 0
    }
}

/// RAII registration.
#[must_use = "dropping the guard deregisters the listener"]
pub struct ListenerGuard {
    counts: Rc<RefCell<AHashMap<ListenerKind, usize>>>,
    kind: ListenerKind,
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("kind", &self.kind)
            .finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        let mut counts = self.counts.borrow_mut();
        if let Some(count) = counts.get_mut(&self.kind) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                counts.remove(&self.kind);
            }
        }
        trace!(kind = ?self.kind, "listener deregistered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_counts_and_releases() {
        let registry = ListenerRegistry::new();
        assert!(!registry.is_active(ListenerKind::Keydown));
        let a = registry.register(ListenerKind::Keydown);
        let b = registry.register(ListenerKind::Keydown);
        assert_eq!(registry.count(ListenerKind::Keydown), 2);
        drop(a);
        assert_eq!(registry.count(ListenerKind::Keydown), 1);
        drop(b);
        assert_eq!(registry.count(ListenerKind::Keydown), 0);
    }

    #[test]
    fn repeated_cycles_do_not_accumulate() {
        let registry = ListenerRegistry::new();
        for _ in 0..100 {
            let _guard = registry.register(ListenerKind::Keydown);
        }
        assert_eq!(registry.count(ListenerKind::Keydown), 0);
    }
}
