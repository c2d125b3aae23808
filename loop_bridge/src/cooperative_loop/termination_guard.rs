// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! [RAII] guard that marks the loop as stopped on thread exit. See
//! [`TerminationGuard`].
//!
//! [RAII]: https://en.wikipedia.org/wiki/Resource_acquisition_is_initialization

use super::LoopLiveness;
use std::sync::Arc;
use tracing::debug;

/// Created first thing on the loop thread. Its [`Drop`] runs when the thread function
/// returns and also while unwinding from a panic, so [`LoopState::Stopped`] is always
/// reached.
///
/// [`LoopState::Stopped`]: super::LoopState::Stopped
#[allow(missing_debug_implementations)]
pub struct TerminationGuard {
    liveness: Arc<LoopLiveness>,
}

impl TerminationGuard {
    #[must_use]
    pub fn new(liveness: Arc<LoopLiveness>) -> Self { Self { liveness } }
}

impl Drop for TerminationGuard {
    fn drop(&mut self) {
        self.liveness.mark_stopped();
        debug!(panicking = std::thread::panicking(), "cooperative loop thread stopped");
    }
}
