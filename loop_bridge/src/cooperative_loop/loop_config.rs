// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::Duration;

pub const DEFAULT_LOOP_THREAD_NAME: &str = "Cooperative Loop Thread";
pub const DEFAULT_LIFECYCLE_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Settings for a [`CooperativeLoop`].
///
/// - `lifecycle_poll_interval`: longest time between two checks of the
///   [`LoopLifecycleSignal`]. Zero means "check after every yield to the runtime".
/// - `task_queue_capacity`: `None` for an unbounded queue of scheduled tasks. With
///   `Some(n)`, scheduling fails with [`LoopError::TaskQueueFull`] while `n` tasks wait.
///
/// [`CooperativeLoop`]: super::CooperativeLoop
/// [`LoopError::TaskQueueFull`]: super::LoopError::TaskQueueFull
/// [`LoopLifecycleSignal`]: super::LoopLifecycleSignal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopConfig {
    pub thread_name: String,
    pub lifecycle_poll_interval: Duration,
    pub task_queue_capacity: Option<usize>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            thread_name: DEFAULT_LOOP_THREAD_NAME.to_string(),
            lifecycle_poll_interval: DEFAULT_LIFECYCLE_POLL_INTERVAL,
            task_queue_capacity: None,
        }
    }
}

impl LoopConfig {
    #[must_use]
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    #[must_use]
    pub fn with_lifecycle_poll_interval(mut self, interval: Duration) -> Self {
        self.lifecycle_poll_interval = interval;
        self
    }

    #[must_use]
    pub fn with_task_queue_capacity(mut self, capacity: Option<usize>) -> Self {
        self.task_queue_capacity = capacity;
        self
    }
}
