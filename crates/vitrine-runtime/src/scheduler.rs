#![forbid(unsafe_code)]

//! Host-pumped frame and timer queue.
//!
//! The host calls [`Scheduler::run_frame`] once per animation frame with the
//! current timestamp. Each pump:
//!
//! 1. fires every timer armed *before* the pump started whose deadline has
//!    passed, in deadline order (ties in insertion order);
//! 2. runs the frame callbacks that were queued *before* the pump started.
//!
//! Timers and frame callbacks queued while a pump is running wait for the
//! next pump. That is what lets a caller write a style reset now and be sure
//! the follow-up write lands on a later frame, and it bounds every pump: a
//! timer that re-arms itself with a zero delay runs once per pump.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;
use vitrine_core::Timestamp;

type FrameTask = Box<dyn FnOnce(Timestamp)>;
type TimerTask = Box<dyn FnOnce()>;

/// Handle for a queued frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameId(u64);

/// Handle for a pending timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct Timer {
    id: u64,
    deadline: Timestamp,
    task: TimerTask,
}

#[derive(Default)]
struct Queues {
    next_id: u64,
    frames: Vec<(u64, FrameTask)>,
    timers: Vec<Timer>,
}

impl Queues {
    fn allocate(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Shared single-threaded scheduler. Clones share the same queues.
#[derive(Clone, Default)]
pub struct Scheduler {
    queues: Rc<RefCell<Queues>>,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queues = self.queues.borrow();
        f.debug_struct("Scheduler")
            .field("frames", &queues.frames.len())
            .field("timers", &queues.timers.len())
            .finish()
    }
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `task` for the next frame pump.
    pub fn request_frame(&self, task: impl FnOnce(Timestamp) + 'static) -> FrameId {
        let mut queues = self.queues.borrow_mut();
        let id = queues.allocate();
        queues.frames.push((id, Box::new(task)));
        FrameId(id)
    }

    /// Drop a queued frame callback. Returns whether it was still pending.
    pub fn cancel_frame(&self, id: FrameId) -> bool {
        let mut queues = self.queues.borrow_mut();
        let before = queues.frames.len();
        queues.frames.retain(|(fid, _)| *fid != id.0);
        queues.frames.len() != before
    }

    /// Run `task` on the first pump at or after `now + delay_ms`.
    pub fn set_timeout(
        &self,
        now: Timestamp,
        delay_ms: f64,
        task: impl FnOnce() + 'static,
    ) -> TimerId {
        let mut queues = self.queues.borrow_mut();
        let id = queues.allocate();
        queues.timers.push(Timer {
            id,
            deadline: now.add_millis(delay_ms.max(0.0)),
            task: Box::new(task),
        });
        TimerId(id)
    }

    /// Cancel a pending timer. Returns whether it was still pending.
    pub fn clear_timeout(&self, id: TimerId) -> bool {
        let mut queues = self.queues.borrow_mut();
        let before = queues.timers.len();
        queues.timers.retain(|t| t.id != id.0);
        queues.timers.len() != before
    }

    /// Pump once. Returns how many tasks ran.
    pub fn run_frame(&self, now: Timestamp) -> usize {
        let mut ran = 0;
        let cutoff = self.queues.borrow().next_id;

        // Timers first. Ids are allocated in order, so anything armed by a
        // task in this pump sits above the cutoff.
        loop {
            let next = {
                let mut queues = self.queues.borrow_mut();
                let due = queues
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, t)| t.id <= cutoff && t.deadline <= now)
                    .min_by(|(_, a), (_, b)| {
                        a.deadline
                            .as_millis()
                            .total_cmp(&b.deadline.as_millis())
                            .then(a.id.cmp(&b.id))
                    })
                    .map(|(index, _)| index);
                due.map(|index| queues.timers.remove(index))
            };
            let Some(timer) = next else { break };
            (timer.task)();
            ran += 1;
        }

        loop {
            let next = {
                let mut queues = self.queues.borrow_mut();
                match queues.frames.first() {
                    Some((id, _)) if *id <= cutoff => Some(queues.frames.remove(0)),
                    _ => None,
                }
            };
            let Some((_, task)) = next else { break };
            task(now);
            ran += 1;
        }

        trace!(ran, at = now.as_millis(), "frame pumped");
        ran
    }

    #[must_use]
    pub fn pending_frames(&self) -> usize {
        self.queues.borrow().frames.len()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.queues.borrow().timers.len()
    }

    /// Earliest pending timer deadline.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Timestamp> {
        self.queues
            .borrow()
            .timers
            .iter()
            .map(|t| t.deadline)
            .min_by(|a, b| a.as_millis().total_cmp(&b.as_millis()))
    }
}
