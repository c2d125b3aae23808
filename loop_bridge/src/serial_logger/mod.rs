// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// Attach sources.
pub mod log_line;
pub mod logger_error;
pub mod serial_log_make_writer;
pub mod serial_logger_impl;

// Re-export.
pub use log_line::*;
pub use logger_error::*;
pub use serial_log_make_writer::*;
pub use serial_logger_impl::*;
