// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod work_bridge_error;
pub mod work_bridge_impl;
pub mod work_package;

// Re-export.
pub use work_bridge_error::*;
pub use work_bridge_impl::*;
pub use work_package::*;
