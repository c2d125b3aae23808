// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! A queue with exactly one dedicated consumer thread. See [`SerializedChannel`].

// Attach sources.
pub mod channel_error;
pub mod serialized_channel_impl;

// Re-export.
pub use channel_error::*;
pub use serialized_channel_impl::*;
