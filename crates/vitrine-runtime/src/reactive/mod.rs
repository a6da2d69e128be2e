#![forbid(unsafe_code)]

//! Reactive state for Vitrine.
//!
//! - [`Observable`]: a shared, version-tracked value wrapper with change
//!   notification via subscriber callbacks.
//! - [`Subscription`]: RAII guard that automatically unsubscribes on drop.
//!
//! # Architecture
//!
//! `Observable<T>` uses `Rc<RefCell<..>>` for single-threaded shared ownership.
//! Subscribers are stored as `Weak` function pointers and cleaned up lazily
//! during notification.
//!
//! Observables are how components that do not own each other stay in sync:
//! the carousel's slide deck is one, written by whoever changes the slide and
//! observed by everyone who must react.
//!
//! # Invariants
//!
//! 1. Version increments exactly once per mutation that changes the value.
//! 2. Subscribers are notified in registration order.
//! 3. Setting a value equal to the current value is a no-op (no version bump,
//!    no notifications).
//! 4. Dropping a [`Subscription`] removes the callback before the next
//!    notification cycle.
//! 5. No internal borrow is held while subscribers run, so a subscriber may
//!    read or write the observable that notified it.

pub mod observable;

pub use observable::{Observable, Subscription};
