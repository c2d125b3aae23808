// Copyright (c) 2022-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod common_atomic;
pub mod common_enums;
pub mod id_allocator;
pub mod miette_setup_global_report_handler;
pub mod thread_census;

// Re-export.
pub use common_atomic::*;
pub use common_enums::*;
pub use id_allocator::*;
pub use miette_setup_global_report_handler::*;
pub use thread_census::*;
