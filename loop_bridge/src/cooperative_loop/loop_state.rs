// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Lifecycle tracking for the cooperative loop thread. See [`LoopLiveness`] and
//! [`LoopState`].

use std::sync::atomic::{AtomicU8, Ordering};
use strum_macros::Display;

/// ```text
/// NotStarted ──start()──► Running ──signal seen──► ShuttingDown ──thread exits──► Stopped
///      │                                                                           ▲
///      └───────────────── runtime build failed ────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[repr(u8)]
pub enum LoopState {
    NotStarted = 0,
    Running = 1,
    /// No new tasks are accepted. In-flight tasks run to completion.
    ShuttingDown = 2,
    Stopped = 3,
}

impl LoopState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::Running,
            2 => Self::ShuttingDown,
            _ => Self::Stopped,
        }
    }
}

/// The current [`LoopState`], shared between the loop thread and every handle.
#[derive(Debug)]
pub struct LoopLiveness {
    state: AtomicU8,
}

impl Default for LoopLiveness {
    fn default() -> Self { Self::new() }
}

impl LoopLiveness {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(LoopState::NotStarted as u8),
        }
    }

    #[must_use]
    pub fn get(&self) -> LoopState { LoopState::from_u8(self.state.load(Ordering::SeqCst)) }

    pub fn set(&self, state: LoopState) { self.state.store(state as u8, Ordering::SeqCst); }

    /// Called by the [`TerminationGuard`] when the loop thread exits.
    ///
    /// [`TerminationGuard`]: super::TerminationGuard
    pub fn mark_stopped(&self) { self.set(LoopState::Stopped); }
}
