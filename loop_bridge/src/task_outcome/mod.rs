// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Observing how dispatched work ended, without ever blocking the poll loop.
//!
//! ```text
//! CooperativeLoop::schedule(..) ─┐                      ┌─► TaskPoll::Succeeded(T)
//!                                ├─► CompletionHandle ──► TaskOutcomeMonitor::poll()
//! spawn_worker(..) ──────────────┘   (oneshot reader)    ├─► Failed(Expected): warn!, done
//!                                                        └─► Failed(Unexpected): error!,
//!                                                              FatalErrorSender
//! ```

// Attach sources.
pub mod completion_handle;
pub mod failure_classifier;
pub mod fatal_error_channel;
pub mod spawn_worker;
pub mod task_context;
pub mod task_error;
pub mod task_outcome_monitor;

// Re-export.
pub use completion_handle::*;
pub use failure_classifier::*;
pub use fatal_error_channel::*;
pub use spawn_worker::*;
pub use task_context::*;
pub use task_error::*;
pub use task_outcome_monitor::*;
