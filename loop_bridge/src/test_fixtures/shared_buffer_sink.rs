// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::{io::{self, Write},
          sync::{Arc, Mutex, PoisonError}};

/// An in-memory [`Write`] sink that can be handed to a [`SerialLogger`] while the test
/// keeps a clone to read back what was written.
///
/// [`SerialLogger`]: crate::SerialLogger
#[derive(Debug, Clone, Default)]
pub struct SharedBufferSink {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl SharedBufferSink {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Everything written so far, lossily decoded as UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_owned).collect()
    }
}

impl Write for SharedBufferSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}
