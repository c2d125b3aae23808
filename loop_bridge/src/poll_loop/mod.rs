// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Drivers that run on the host poll loop. Each callback does a bounded amount of
//! non-blocking work and re-arms itself through the [`PollLoopScheduler`].

// Attach sources.
pub mod poll_loop_scheduler;
pub mod watch_completion;
pub mod work_bridge_drain;

// Re-export.
pub use poll_loop_scheduler::*;
pub use watch_completion::*;
pub use work_bridge_drain::*;
