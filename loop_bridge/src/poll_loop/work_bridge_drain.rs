// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{PollIntervals, PollLoopScheduler};
use crate::{Continuation, TaskId, TryReceive, WorkPackage, WorkReceiver};
use std::{cell::Cell, rc::Rc, time::Duration};
use tracing::{debug, info};

/// What one [`WorkBridgeDrain::tick()`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrainTick {
    /// One package was handed to the sink.
    Processed(TaskId),
    /// Nothing was queued.
    Empty,
    /// Nothing queued and every producer is gone.
    Finished,
}

impl DrainTick {
    #[must_use]
    pub fn continuation(&self) -> Continuation {
        match self {
            Self::Processed(_) | Self::Empty => Continuation::Continue,
            Self::Finished => Continuation::Stop,
        }
    }

    /// Delay before the next tick, or `None` to stop.
    #[must_use]
    pub fn next_delay(&self, intervals: &PollIntervals) -> Option<Duration> {
        match (self.continuation(), self) {
            (Continuation::Stop, _) => None,
            (Continuation::Continue, Self::Processed(_)) => Some(intervals.busy),
            (Continuation::Continue, _) => Some(intervals.idle),
        }
    }
}

/// The poll-loop consumer of a [`WorkBridge`]: each tick pulls at most one package and
/// passes it to the sink (for a GUI host, the code that updates the display).
///
/// [`WorkBridge`]: crate::WorkBridge
#[allow(missing_debug_implementations)]
pub struct WorkBridgeDrain<P> {
    receiver: WorkReceiver<P>,
    sink: Box<dyn FnMut(WorkPackage<P>)>,
    intervals: PollIntervals,
}

impl<P> WorkBridgeDrain<P> {
    pub fn new(receiver: WorkReceiver<P>, sink: impl FnMut(WorkPackage<P>) + 'static) -> Self {
        Self {
            receiver,
            sink: Box::new(sink),
            intervals: PollIntervals::default(),
        }
    }

    #[must_use]
    pub fn with_intervals(mut self, intervals: PollIntervals) -> Self {
        self.intervals = intervals;
        self
    }

    #[must_use]
    pub fn intervals(&self) -> PollIntervals { self.intervals }

    /// Never blocks.
    pub fn tick(&mut self) -> DrainTick {
        match self.receiver.try_receive() {
            TryReceive::Item(package) => {
                let id = package.id();
                debug!(task_id = %id, origin = %package.origin(), "work package drained");
                (self.sink)(package);
                DrainTick::Processed(id)
            }
            TryReceive::Empty => DrainTick::Empty,
            TryReceive::Disconnected => DrainTick::Finished,
        }
    }
}

/// Live view of a drain started with [`start_draining()`]. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct DrainProgress {
    delivered: Rc<Cell<u64>>,
    finished: Rc<Cell<bool>>,
}

impl DrainProgress {
    /// Packages handed to the sink so far.
    #[must_use]
    pub fn delivered(&self) -> u64 { self.delivered.get() }

    /// `true` once the bridge was found disconnected and the drain stopped re-arming.
    #[must_use]
    pub fn is_finished(&self) -> bool { self.finished.get() }

    fn record(&self, tick: DrainTick) {
        match tick {
            DrainTick::Processed(_) => self.delivered.set(self.delivered.get() + 1),
            DrainTick::Empty => {}
            DrainTick::Finished => self.finished.set(true),
        }
    }
}

/// Schedules `drain` on the poll loop: first tick as soon as possible, then re-armed with
/// [`PollIntervals::busy`] after a package and [`PollIntervals::idle`] after an empty
/// tick, until the bridge is disconnected.
pub fn start_draining<S, P>(scheduler: Rc<S>, drain: WorkBridgeDrain<P>) -> DrainProgress
where
    S: PollLoopScheduler + 'static,
    P: 'static,
{
    let progress = DrainProgress::default();
    arm(scheduler, drain, progress.clone(), Duration::ZERO);
    progress
}

fn arm<S, P>(scheduler: Rc<S>, mut drain: WorkBridgeDrain<P>, progress: DrainProgress, delay: Duration)
where
    S: PollLoopScheduler + 'static,
    P: 'static,
{
    let next = Rc::clone(&scheduler);
    scheduler.after(
        delay,
        Box::new(move || {
            let tick = drain.tick();
            progress.record(tick);
            match tick.next_delay(&drain.intervals) {
                Some(delay) => arm(next, drain, progress, delay),
                None => {
                    info!(delivered = progress.delivered(), "work bridge disconnected, drain stopped");
                }
            }
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BridgeCapacity, IdAllocator, ManualPollLoop, WorkBridge, WorkOrigin};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use test_case::test_case;

    #[test_case(DrainTick::Processed(TaskId::new(1)), Some(Duration::ZERO) ; "busy")]
    #[test_case(DrainTick::Empty, Some(Duration::from_millis(40)) ; "idle")]
    #[test_case(DrainTick::Finished, None ; "stop")]
    fn next_delay_follows_intervals(tick: DrainTick, expected: Option<Duration>) {
        assert_eq!(tick.next_delay(&PollIntervals::default()), expected);
    }

    #[test]
    fn tick_processes_at_most_one_item() {
        let (tx, rx) = WorkBridge::new::<u8>(BridgeCapacity::Unbounded, IdAllocator::new());
        tx.produce_blocking(1, WorkOrigin::BlockingWorker).unwrap();
        tx.produce_blocking(2, WorkOrigin::BlockingWorker).unwrap();

        let seen = Rc::new(RefCell::new(vec![]));
        let mut drain = {
            let seen = Rc::clone(&seen);
            WorkBridgeDrain::new(rx, move |package| seen.borrow_mut().push(package.into_payload()))
        };

        assert_eq!(drain.tick(), DrainTick::Processed(TaskId::new(1)));
        assert_eq!(*seen.borrow(), vec![1]);
        assert_eq!(drain.tick(), DrainTick::Processed(TaskId::new(2)));
        assert_eq!(drain.tick(), DrainTick::Empty);
        drop(tx);
        assert_eq!(drain.tick(), DrainTick::Finished);
        assert_eq!(drain.tick().continuation(), Continuation::Stop);
    }

    #[test]
    fn drain_runs_on_poll_loop_until_disconnected() {
        let poll_loop = Rc::new(ManualPollLoop::new());
        let (tx, rx) = WorkBridge::new::<&str>(BridgeCapacity::Unbounded, IdAllocator::new());

        let seen = Rc::new(RefCell::new(vec![]));
        let drain = {
            let seen = Rc::clone(&seen);
            WorkBridgeDrain::new(rx, move |package| seen.borrow_mut().push(package.into_payload()))
                .with_intervals(PollIntervals::default().with_idle(Duration::from_millis(5)))
        };
        let progress = start_draining(Rc::clone(&poll_loop), drain);
        assert_eq!(poll_loop.pending(), 1);

        let producer = std::thread::spawn(move || {
            for text in ["a", "b", "c"] {
                tx.produce_blocking(text, WorkOrigin::BlockingWorker).unwrap();
                std::thread::sleep(Duration::from_millis(10));
            }
        });

        assert!(poll_loop.run_until(Duration::from_secs(5), || progress.is_finished()));
        producer.join().unwrap();

        assert_eq!(progress.delivered(), 3);
        assert_eq!(*seen.borrow(), vec!["a", "b", "c"]);
        assert_eq!(poll_loop.pending(), 0);
    }
}
