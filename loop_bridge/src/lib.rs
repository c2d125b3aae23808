// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! # loop_bridge
//!
//! Glue between three execution models that do not naturally talk to each other:
//!
//! | Context                 | Runs on                       | May block?                         |
//! | :---------------------- | :---------------------------- | :--------------------------------- |
//! | Host **poll loop**      | the host's main thread        | Never (callbacks must return fast) |
//! | **Cooperative loop**    | one dedicated tokio thread    | Never (only yields to the runtime) |
//! | **Worker threads**      | one OS thread per blocking op | Yes, freely                        |
//! | **Serial logger**       | one long-lived consumer thread| Only on its own input queue        |
//!
//! The pieces, leaf first:
//!
//! 1. [`SerializedChannel`]: an unbounded queue with exactly one dedicated consumer
//!    thread, so items are handled in one total order.
//! 2. [`SerialLogger`]: a [`SerializedChannel`] of [`LogLine`]s. It is the only thing in
//!    the process that writes to the output sink. [`DisplayPreference::SerialLogger`]
//!    routes [`tracing`] output through it too.
//! 3. [`WorkBridge`]: producers (workers, cooperative tasks) push [`WorkPackage`]s; the
//!    poll loop pulls them with [`WorkReceiver::try_receive()`], which never blocks.
//! 4. [`CooperativeLoop`]: owns the tokio `current_thread` runtime on its own thread,
//!    accepts tasks from any thread via [`LoopHandle::schedule()`], and shuts down when
//!    its [`LoopLifecycleSignal`] is set.
//! 5. [`TaskOutcomeMonitor`]: polls a [`CompletionHandle`] from the poll loop and sorts
//!    failures into [`FailureKind::Expected`] (log and carry on) and
//!    [`FailureKind::Unexpected`] (log and hand to the [`FatalErrorReceiver`]).
//! 6. [`PollLoopScheduler`]: the host's "call me again in N ms" primitive. The crate
//!    consumes it via [`start_draining()`] and [`watch_completion()`]. The
//!    [`ManualPollLoop`] fixture is a reference host.
//!
//! # Shutdown order
//!
//! ```text
//! host loop exits
//!   └─► LoopHandle::request_shutdown()      (never blocks)
//!         └─► CooperativeLoop::join()       (optional, blocks the main thread)
//!               └─► SerialLoggerGuard::close(..)  (last, blocks until the consumer exits)
//! ```
//!
//! The logger is closed last so that shutdown messages are not lost.

// Enforce strict error handling in production library code only. Tests and examples are
// allowed to use .unwrap() (workspace `Cargo.toml` config allows it).
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach sources.
pub mod common;
pub mod cooperative_loop;
pub mod log;
pub mod poll_loop;
pub mod serial_logger;
pub mod serialized_channel;
pub mod task_outcome;
pub mod test_fixtures;
pub mod work_bridge;

// Re-export.
pub use common::*;
pub use cooperative_loop::*;
pub use log::*;
pub use poll_loop::*;
pub use serial_logger::*;
pub use serialized_channel::*;
pub use task_outcome::*;
pub use test_fixtures::*;
pub use work_bridge::*;
