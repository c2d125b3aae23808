// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{LogLine, SerialLogHandle};
use std::io;
use tracing_subscriber::fmt::MakeWriter;

/// Plugs a [`SerialLogHandle`] into a [`tracing_subscriber::fmt`] layer, so `tracing`
/// events from every thread end up on the serial logger's consumer thread.
///
/// The layer writes each event on the thread that emitted it, so every [`LogLine`] still
/// names the right thread and loop. Configure the layer `without_time()` and with ANSI off:
/// the serial logger adds its own elapsed time prefix.
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct SerialLogMakeWriter {
    handle: SerialLogHandle,
}

impl SerialLogMakeWriter {
    #[must_use]
    pub fn new(handle: SerialLogHandle) -> Self { Self { handle } }
}

impl<'a> MakeWriter<'a> for SerialLogMakeWriter {
    type Writer = SerialLogWriter;

    fn make_writer(&'a self) -> Self::Writer { SerialLogWriter::new(self.handle.clone()) }
}

/// Buffers bytes until a newline, then sends the completed line. Anything left over is
/// sent when the writer is dropped.
#[allow(missing_debug_implementations)]
pub struct SerialLogWriter {
    handle: SerialLogHandle,
    buffer: Vec<u8>,
}

impl SerialLogWriter {
    #[must_use]
    pub fn new(handle: SerialLogHandle) -> Self {
        Self {
            handle,
            buffer: Vec::new(),
        }
    }

    fn send_line(&self, bytes: &[u8]) -> io::Result<()> {
        let text = String::from_utf8_lossy(bytes);
        self.handle
            .send(LogLine::new(text.trim_end_matches('\r')))
            .map_err(|error| io::Error::new(io::ErrorKind::BrokenPipe, error))
    }
}

impl io::Write for SerialLogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        while let Some(pos) = self.buffer.iter().position(|it| *it == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            self.send_line(&line[..line.len() - 1])?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl Drop for SerialLogWriter {
    fn drop(&mut self) {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.send_line(&rest).ok();
        }
    }
}
