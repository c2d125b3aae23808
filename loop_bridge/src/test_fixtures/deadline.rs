// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::time::{Duration, Instant};

/// Upper bound for how long a test waits on another thread.
///
/// ```rust
/// use loop_bridge::Deadline;
///
/// let deadline = Deadline::default();
/// while deadline.has_time_remaining() {
///     // ... poll something ...
/// #   break;
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Instant,
}

impl Deadline {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            expires_at: Instant::now() + timeout,
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool { Instant::now() >= self.expires_at }

    #[must_use]
    pub fn has_time_remaining(&self) -> bool { !self.is_expired() }

    /// Time left, or zero once expired.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Spins (sleeping `step` between checks) until `predicate` holds. Returns `false` if
    /// the deadline expired first.
    pub fn wait_until(&self, step: Duration, mut predicate: impl FnMut() -> bool) -> bool {
        loop {
            if predicate() {
                return true;
            }
            if self.is_expired() {
                return false;
            }
            std::thread::sleep(step.min(self.remaining()));
        }
    }
}

impl Default for Deadline {
    /// Five seconds.
    fn default() -> Self { Self::new(Duration::from_secs(5)) }
}
