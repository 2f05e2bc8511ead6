//! The deferred-task queue backing the "next tick" phase of construction.
//!
//! Construction schedules exactly one task per instance (deferred
//! `constructed` emission and replay of construction-time values). Tasks run
//! in FIFO order across instances when the owner drains the queue with
//! [`Scheduler::run_tick`]. Cancellation is unsupported: a scheduled task
//! holds a strong handle to its instance and runs even if the caller has
//! dropped theirs.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex};

type Task = Box<dyn FnOnce() + Send>;

/// Cheaply clonable handle to a FIFO deferred-task queue.
///
/// One scheduler is minted per root fault type and shared by every type in
/// that hierarchy, so deferred phases of independently constructed instances
/// interleave in schedule order.
#[derive(Clone, Default)]
pub struct Scheduler {
    queue: Arc<Mutex<VecDeque<Task>>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a task to the end of the queue.
    pub(crate) fn defer(&self, task: Task) {
        self.queue.lock().unwrap().push_back(task);
    }

    /// Drain the queue, running each task in FIFO order. Tasks scheduled
    /// while the drain is in progress run in the same call. Returns the
    /// number of tasks executed.
    pub fn run_tick(&self) -> usize {
        let mut ran = 0;
        loop {
            let task = self.queue.lock().unwrap().pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => return ran,
            }
        }
    }

    /// Number of tasks currently queued.
    pub fn pending(&self) -> usize {
        self.queue.lock().unwrap().len()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler").field("pending", &self.pending()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_in_fifo_order() {
        let s = Scheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            s.defer(Box::new(move || log.lock().unwrap().push(i)));
        }
        assert_eq!(s.pending(), 3);
        assert_eq!(s.run_tick(), 3);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn tasks_scheduled_during_drain_run_in_same_tick() {
        let s = Scheduler::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        {
            let s2 = s.clone();
            let log = log.clone();
            s.defer(Box::new(move || {
                log.lock().unwrap().push("outer");
                let log = log.clone();
                s2.defer(Box::new(move || log.lock().unwrap().push("inner")));
            }));
        }
        assert_eq!(s.run_tick(), 2);
        assert_eq!(*log.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[test]
    fn empty_tick_is_a_noop() {
        assert_eq!(Scheduler::new().run_tick(), 0);
    }
}
