// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::Duration;

/// A callback queued on the host poll loop. Not `Send`: it runs on the poll-loop thread
/// and may capture `Rc`s and other thread-bound state.
pub type PollCallback = Box<dyn FnOnce() + 'static>;

/// The host poll loop's "call me again later" primitive (a GUI toolkit's timer, a game
/// loop's deferred queue, ...).
///
/// # Contract
///
/// - `callback` runs on the poll-loop thread, no earlier than `delay` from now.
/// - A `delay` of zero means "as soon as the loop gets to it", after the current callback
///   returns. The callback must never run re-entrantly inside `after()`.
/// - Callbacks must return quickly. Everything in this crate that is driven through this
///   trait does a bounded amount of non-blocking work per callback and re-arms itself.
///
/// [`ManualPollLoop`] is a reference implementation.
///
/// [`ManualPollLoop`]: crate::ManualPollLoop
pub trait PollLoopScheduler {
    fn after(&self, delay: Duration, callback: PollCallback);
}

pub const DEFAULT_BUSY_INTERVAL: Duration = Duration::from_millis(0);
pub const DEFAULT_IDLE_INTERVAL: Duration = Duration::from_millis(40);
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_millis(50);

/// How often the poll-loop drivers re-arm themselves.
///
/// | Field     | Used by                 | When                          | Default |
/// | :-------- | :---------------------- | :---------------------------- | :------ |
/// | `busy`    | [`start_draining()`]    | the last tick found an item   | `0 ms`  |
/// | `idle`    | [`start_draining()`]    | the last tick found nothing   | `40 ms` |
/// | `monitor` | [`watch_completion()`]  | the task is still pending     | `50 ms` |
///
/// [`start_draining()`]: crate::start_draining
/// [`watch_completion()`]: crate::watch_completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub busy: Duration,
    pub idle: Duration,
    pub monitor: Duration,
}

impl Default for PollIntervals {
    fn default() -> Self {
        Self {
            busy: DEFAULT_BUSY_INTERVAL,
            idle: DEFAULT_IDLE_INTERVAL,
            monitor: DEFAULT_MONITOR_INTERVAL,
        }
    }
}

impl PollIntervals {
    #[must_use]
    pub fn with_busy(mut self, busy: Duration) -> Self {
        self.busy = busy;
        self
    }

    #[must_use]
    pub fn with_idle(mut self, idle: Duration) -> Self {
        self.idle = idle;
        self
    }

    #[must_use]
    pub fn with_monitor(mut self, monitor: Duration) -> Self {
        self.monitor = monitor;
        self
    }
}
