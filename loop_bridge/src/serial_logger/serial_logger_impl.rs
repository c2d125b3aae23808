// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Race free output for every thread in the process. See [`SerialLogger`].

use super::{LineFormatter, LogLine, LoggerError};
use crate::{ChannelSender, SerializedChannel};
use std::{io::Write,
          time::Instant};

pub const DEFAULT_LOGGER_THREAD_NAME: &str = "Serial Logger Thread";
pub const OPEN_BANNER: &str = "The serial logger is open for output.";
pub const CLOSE_BANNER: &str = "The serial logger has closed.";

/// Builder for the process wide logger. Nothing runs until [`open()`] is called.
///
/// Writes to the sink from several threads interleave unpredictably. The serial logger
/// funnels every line through one [`SerializedChannel`] whose consumer thread is the only
/// code that ever touches the sink.
///
/// ```text
/// SerialLogger::stdout().open()?  ──►  SerialLoggerGuard
///                                        │ .handle() (clone freely, Send + Sync)
///                                        ▼
///                                      SerialLogHandle::log("..") from any thread
///                                        │
///                                        ▼
///                                      consumer thread: format + write to sink
/// guard.close(Some("bye"))  ──►  final line, closing banner, join consumer
/// ```
///
/// `open()` consumes the builder and `close()` consumes the guard, so a logger can't be
/// opened or closed twice.
///
/// [`open()`]: Self::open
#[allow(missing_debug_implementations)]
pub struct SerialLogger {
    sink: Box<dyn Write + Send>,
    thread_name: String,
    origin: Instant,
}

impl SerialLogger {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            thread_name: DEFAULT_LOGGER_THREAD_NAME.to_string(),
            origin: Instant::now(),
        }
    }

    #[must_use]
    pub fn stdout() -> Self { Self::new(std::io::stdout()) }

    #[must_use]
    pub fn with_thread_name(mut self, thread_name: impl Into<String>) -> Self {
        self.thread_name = thread_name.into();
        self
    }

    /// Zero point for elapsed times. Defaults to the moment the builder was created.
    #[must_use]
    pub fn with_origin(mut self, origin: Instant) -> Self {
        self.origin = origin;
        self
    }

    /// Spawns the consumer thread and enqueues the opening banner.
    ///
    /// # Errors
    ///
    /// [`LoggerError::Channel`] if the consumer thread can't be spawned.
    pub fn open(self) -> Result<SerialLoggerGuard, LoggerError> {
        let Self {
            mut sink,
            thread_name,
            origin,
        } = self;

        let mut formatter = LineFormatter::new(origin);
        let channel = SerializedChannel::spawn(thread_name, move |line: LogLine| {
            let rendered = formatter.format(&line);
            // A broken sink can't be reported anywhere else.
            writeln!(sink, "{rendered}").ok();
            sink.flush().ok();
        })?;

        let handle = SerialLogHandle {
            sender: channel.sender(),
        };
        handle.log(OPEN_BANNER)?;

        Ok(SerialLoggerGuard {
            channel: Some(channel),
            handle,
        })
    }
}

/// Scoped ownership of an open [`SerialLogger`]. Dropping it closes the logger (without a
/// final message).
#[allow(missing_debug_implementations)]
pub struct SerialLoggerGuard {
    channel: Option<SerializedChannel<LogLine>>,
    handle: SerialLogHandle,
}

impl SerialLoggerGuard {
    /// A producer handle for this logger.
    #[must_use]
    pub fn handle(&self) -> SerialLogHandle { self.handle.clone() }

    /// Enqueues `final_message` (if any) and the closing banner, then blocks until the
    /// consumer thread has written everything and exited. Every handle returns
    /// [`LoggerError::Closed`] afterwards.
    ///
    /// # Errors
    ///
    /// [`LoggerError::Channel`] when called from the consumer thread itself, or when the
    /// consumer thread panicked.
    pub fn close(mut self, final_message: Option<&str>) -> Result<(), LoggerError> {
        self.close_inner(final_message)
    }

    fn close_inner(&mut self, final_message: Option<&str>) -> Result<(), LoggerError> {
        let Some(mut channel) = self.channel.take() else {
            return Ok(());
        };

        if let Some(message) = final_message {
            self.handle.log(message).ok();
        }
        self.handle.log(CLOSE_BANNER).ok();

        let result = channel.shutdown();
        if matches!(
            result,
            Err(crate::ChannelError::ShutdownFromConsumerThread { .. })
        ) {
            self.channel = Some(channel);
        }
        result.map_err(LoggerError::from)
    }
}

impl Drop for SerialLoggerGuard {
    fn drop(&mut self) { self.close_inner(None).ok(); }
}

/// What producers hold. Cheap to clone, `Send + Sync`.
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct SerialLogHandle {
    sender: ChannelSender<LogLine>,
}

impl SerialLogHandle {
    /// Timestamped line.
    ///
    /// # Errors
    ///
    /// [`LoggerError::Closed`] after the logger was closed.
    pub fn log(&self, text: impl Into<String>) -> Result<(), LoggerError> {
        self.send(LogLine::new(text))
    }

    /// Verbatim line, no timestamp prefix.
    ///
    /// # Errors
    ///
    /// [`LoggerError::Closed`] after the logger was closed.
    pub fn log_untimed(&self, text: impl Into<String>) -> Result<(), LoggerError> {
        self.send(LogLine::untimed(text))
    }

    /// Timestamped line that also resets the elapsed time origin to now.
    ///
    /// # Errors
    ///
    /// [`LoggerError::Closed`] after the logger was closed.
    pub fn log_and_reset(&self, text: impl Into<String>) -> Result<(), LoggerError> {
        self.send(LogLine::new(text).with_origin_reset())
    }

    /// # Errors
    ///
    /// [`LoggerError::Closed`] after the logger was closed.
    pub fn send(&self, line: LogLine) -> Result<(), LoggerError> {
        self.sender.send(line).map_err(LoggerError::from)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool { self.sender.is_closed() }

    /// `true` if both handles feed the same logger.
    #[must_use]
    pub fn same_channel(&self, other: &Self) -> bool {
        self.sender.same_channel(&other.sender)
    }
}
