// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{Deadline, PollCallback, PollLoopScheduler};
use std::{cell::RefCell,
          cmp::Reverse,
          collections::{BinaryHeap, HashMap},
          time::{Duration, Instant}};

/// Longest the loop sleeps before re-checking a `run_until()` predicate.
const MAX_IDLE_SLEEP: Duration = Duration::from_millis(5);

/// A single-threaded timer queue that plays the host poll loop.
///
/// Callbacks are ordered by due time, then by scheduling order. The loop only advances
/// inside [`run_until()`] / [`run_for()`], on the calling thread, which is what makes that
/// thread "the poll-loop thread".
///
/// Share it as `Rc<ManualPollLoop>` with the drivers in [`crate::poll_loop`].
///
/// [`run_for()`]: Self::run_for
/// [`run_until()`]: Self::run_until
#[allow(missing_debug_implementations)]
#[derive(Default)]
pub struct ManualPollLoop {
    inner: RefCell<TimerQueue>,
}

#[derive(Default)]
struct TimerQueue {
    due: BinaryHeap<Reverse<(Instant, u64)>>,
    callbacks: HashMap<u64, PollCallback>,
    next_seq: u64,
}

impl PollLoopScheduler for ManualPollLoop {
    fn after(&self, delay: Duration, callback: PollCallback) {
        let mut queue = self.inner.borrow_mut();
        let seq = queue.next_seq;
        queue.next_seq += 1;
        queue.due.push(Reverse((Instant::now() + delay, seq)));
        queue.callbacks.insert(seq, callback);
    }
}

impl ManualPollLoop {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Number of callbacks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize { self.inner.borrow().callbacks.len() }

    /// Runs due callbacks until `predicate` holds (checked before every callback) or
    /// `timeout` elapses. Returns whether the predicate was satisfied.
    pub fn run_until(&self, timeout: Duration, mut predicate: impl FnMut() -> bool) -> bool {
        let deadline = Deadline::new(timeout);
        loop {
            if predicate() {
                return true;
            }
            if deadline.is_expired() {
                return false;
            }
            match self.pop_due() {
                Ok(callback) => callback(),
                Err(next_due) => {
                    let until_next = next_due
                        .map_or(MAX_IDLE_SLEEP, |it| {
                            it.saturating_duration_since(Instant::now())
                        });
                    std::thread::sleep(
                        until_next.min(MAX_IDLE_SLEEP).min(deadline.remaining()),
                    );
                }
            }
        }
    }

    /// Runs the loop for `duration`.
    pub fn run_for(&self, duration: Duration) { self.run_until(duration, || false); }

    /// Takes the earliest callback if it is due. Otherwise returns when the earliest one
    /// will be due, if any. The borrow is released before the callback runs, so callbacks
    /// may schedule more callbacks.
    fn pop_due(&self) -> Result<PollCallback, Option<Instant>> {
        let mut queue = self.inner.borrow_mut();
        let Some(Reverse((due_at, seq))) = queue.due.peek().copied() else {
            return Err(None);
        };
        if due_at > Instant::now() {
            return Err(Some(due_at));
        }
        queue.due.pop();
        queue.callbacks.remove(&seq).ok_or(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::rc::Rc;

    #[test]
    fn callbacks_run_in_due_order_then_schedule_order() {
        let poll_loop = ManualPollLoop::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for (delay_ms, tag) in [(20, "late"), (0, "first"), (0, "second"), (10, "middle")] {
            let log = Rc::clone(&log);
            poll_loop.after(
                Duration::from_millis(delay_ms),
                Box::new(move || log.borrow_mut().push(tag)),
            );
        }

        assert!(poll_loop.run_until(Duration::from_secs(2), || log.borrow().len() == 4));
        assert_eq!(*log.borrow(), vec!["first", "second", "middle", "late"]);
        assert_eq!(poll_loop.pending(), 0);
    }

    #[test]
    fn callback_can_reschedule_itself() {
        fn tick(poll_loop: Rc<ManualPollLoop>, count: Rc<RefCell<u32>>) {
            *count.borrow_mut() += 1;
            if *count.borrow() < 5 {
                let next = Rc::clone(&poll_loop);
                poll_loop.after(Duration::ZERO, Box::new(move || tick(next, count)));
            }
        }

        let poll_loop = Rc::new(ManualPollLoop::new());
        let count = Rc::new(RefCell::new(0));
        tick(Rc::clone(&poll_loop), Rc::clone(&count));

        poll_loop.run_for(Duration::from_millis(30));
        assert_eq!(*count.borrow(), 5);
    }

    #[test]
    fn run_until_times_out() {
        let poll_loop = ManualPollLoop::new();
        poll_loop.after(Duration::from_secs(60), Box::new(|| {}));

        let started = Instant::now();
        assert!(!poll_loop.run_until(Duration::from_millis(20), || false));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(poll_loop.pending(), 1);
    }
}
