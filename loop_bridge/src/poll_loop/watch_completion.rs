// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::PollLoopScheduler;
use crate::{TaskOutcomeMonitor, TaskPoll};
use std::{rc::Rc, time::Duration};

/// Polls `monitor` on the poll loop: first check as soon as possible, then again every
/// `interval` while the task is pending. `on_done` receives the terminal [`TaskPoll`]
/// exactly once.
pub fn watch_completion<S, T, D>(
    scheduler: Rc<S>,
    monitor: TaskOutcomeMonitor<T>,
    interval: Duration,
    on_done: D,
) where
    S: PollLoopScheduler + 'static,
    T: 'static,
    D: FnOnce(TaskPoll<T>) + 'static,
{
    arm(scheduler, monitor, interval, on_done, Duration::ZERO);
}

fn arm<S, T, D>(
    scheduler: Rc<S>,
    mut monitor: TaskOutcomeMonitor<T>,
    interval: Duration,
    on_done: D,
    delay: Duration,
) where
    S: PollLoopScheduler + 'static,
    T: 'static,
    D: FnOnce(TaskPoll<T>) + 'static,
{
    let next = Rc::clone(&scheduler);
    scheduler.after(
        delay,
        Box::new(move || match monitor.poll() {
            TaskPoll::Pending => arm(next, monitor, interval, on_done, interval),
            terminal => on_done(terminal),
        }),
    );
}
