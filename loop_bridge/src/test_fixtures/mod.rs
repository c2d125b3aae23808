// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Fixtures for tests, the demo, and hosts that want a ready-made poll loop.

// Attach sources.
pub mod deadline;
pub mod manual_poll_loop;
pub mod shared_buffer_sink;

// Re-export.
pub use deadline::*;
pub use manual_poll_loop::*;
pub use shared_buffer_sink::*;
