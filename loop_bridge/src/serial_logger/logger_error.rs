// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::ChannelError;

/// Errors from [`SerialLogHandle`] and [`SerialLoggerGuard`].
///
/// [`SerialLogHandle`]: super::SerialLogHandle
/// [`SerialLoggerGuard`]: super::SerialLoggerGuard
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum LoggerError {
    #[error("Serial logger is closed")]
    #[diagnostic(
        code(loop_bridge::serial_logger::closed),
        help("Close the logger last, after the cooperative loop and workers have stopped.")
    )]
    Closed,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Channel(ChannelError),
}

impl From<ChannelError> for LoggerError {
    fn from(error: ChannelError) -> Self {
        match error {
            ChannelError::Closed => Self::Closed,
            other => Self::Channel(other),
        }
    }
}
