// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod cooperative_loop_impl;
pub mod lifecycle_signal;
pub mod loop_config;
pub mod loop_error;
pub mod loop_state;
pub mod task_queue;
pub mod termination_guard;

// Re-export.
pub use cooperative_loop_impl::*;
pub use lifecycle_signal::*;
pub use loop_config::*;
pub use loop_error::*;
pub use loop_state::*;
pub use task_queue::*;
pub use termination_guard::*;
