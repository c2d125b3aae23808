// Copyright (c) 2023-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

/// Control flow signal for self-rescheduling poll-loop callbacks.
///
/// [`DrainTick::continuation()`] uses it to decide whether a [`WorkBridgeDrain`] re-arms
/// itself on the host poll loop.
///
/// [`DrainTick::continuation()`]: crate::DrainTick::continuation
/// [`WorkBridgeDrain`]: crate::WorkBridgeDrain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Continuation {
    /// Continue to the next iteration (or tick).
    #[default]
    Continue,

    /// Stop processing and do not reschedule.
    Stop,
}
