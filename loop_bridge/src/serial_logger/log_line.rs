// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::ThreadCensus;
use std::{fmt::Write as _,
          time::Instant};

/// What the loop name reads as when the line was emitted from inside a tokio runtime.
pub const IN_COOPERATIVE_LOOP: &str = "the cooperative loop";

/// What the loop name reads as when the line was emitted from a plain thread.
pub const NO_COOPERATIVE_LOOP: &str = "no running cooperative loop";

/// One unit of output for the [`SerialLogger`].
///
/// The producer side metadata ([`emitted_at()`], [`origin_thread()`],
/// [`active_threads()`], [`in_cooperative_loop()`]) is captured when the line is created,
/// on the producing thread. Only the final formatting (which needs the logger's time origin) happens on
/// the consumer thread.
///
/// [`SerialLogger`]: super::SerialLogger
/// [`active_threads()`]: Self::active_threads
/// [`emitted_at()`]: Self::emitted_at
/// [`in_cooperative_loop()`]: Self::in_cooperative_loop
/// [`origin_thread()`]: Self::origin_thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    text: String,
    emit_timestamp: bool,
    monotonic_origin_reset: bool,
    emitted_at: Instant,
    origin_thread: String,
    active_threads: usize,
    in_cooperative_loop: bool,
}

impl LogLine {
    /// A timestamped line.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self { Self::capture(text.into(), true) }

    /// A line written verbatim, without the timestamp prefix.
    #[must_use]
    pub fn untimed(text: impl Into<String>) -> Self { Self::capture(text.into(), false) }

    /// Marks this line as the new zero point for elapsed times. The consumer applies the
    /// reset right before it formats this line, so this line reports `0.000s`.
    #[must_use]
    pub fn with_origin_reset(mut self) -> Self {
        self.monotonic_origin_reset = true;
        self
    }

    fn capture(text: String, emit_timestamp: bool) -> Self {
        let current = std::thread::current();
        let origin_thread = match current.name() {
            Some(name) => name.to_string(),
            None => format!("{:?}", current.id()),
        };
        Self {
            text,
            emit_timestamp,
            monotonic_origin_reset: false,
            emitted_at: Instant::now(),
            origin_thread,
            active_threads: ThreadCensus::process().active(),
            in_cooperative_loop: tokio::runtime::Handle::try_current().is_ok(),
        }
    }

    #[must_use]
    pub fn text(&self) -> &str { &self.text }

    #[must_use]
    pub fn emit_timestamp(&self) -> bool { self.emit_timestamp }

    #[must_use]
    pub fn monotonic_origin_reset(&self) -> bool { self.monotonic_origin_reset }

    #[must_use]
    pub fn emitted_at(&self) -> Instant { self.emitted_at }

    #[must_use]
    pub fn origin_thread(&self) -> &str { &self.origin_thread }

    /// See [`ThreadCensus`].
    #[must_use]
    pub fn active_threads(&self) -> usize { self.active_threads }

    #[must_use]
    pub fn in_cooperative_loop(&self) -> bool { self.in_cooperative_loop }
}

/// Lives on the logger's consumer thread and owns the time origin.
///
/// A line emitted before the current origin (possible when a reset from one producer is
/// dequeued ahead of an older line from another producer) is clamped to `0.000s`.
#[derive(Debug, Clone, Copy)]
pub struct LineFormatter {
    origin: Instant,
}

impl LineFormatter {
    #[must_use]
    pub fn new(origin: Instant) -> Self { Self { origin } }

    #[must_use]
    pub fn origin(&self) -> Instant { self.origin }

    /// Applies the line's origin reset (if any), then renders it.
    pub fn format(&mut self, line: &LogLine) -> String {
        if line.monotonic_origin_reset {
            self.origin = line.emitted_at;
        }

        if !line.emit_timestamp {
            return line.text.clone();
        }

        let secs = line
            .emitted_at
            .saturating_duration_since(self.origin)
            .as_secs_f64();
        let loop_name = if line.in_cooperative_loop {
            IN_COOPERATIVE_LOOP
        } else {
            NO_COOPERATIVE_LOOP
        };

        let mut acc = String::with_capacity(line.text.len() + 64);
        write!(
            acc,
            "{secs:.3}s  In {thread} of {active} with {loop_name} --- {text}",
            thread = line.origin_thread,
            active = line.active_threads,
            text = line.text
        )
        .ok();
        acc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::{thread, time::Duration};

    #[test]
    fn untimed_line_is_written_verbatim() {
        let mut formatter = LineFormatter::new(Instant::now());
        assert_eq!(formatter.format(&LogLine::untimed("raw text")), "raw text");
    }

    #[test]
    fn timed_line_has_prefix_with_thread_and_loop_name() {
        let line = thread::Builder::new()
            .name("Producer".into())
            .spawn(|| LogLine::new("hello"))
            .unwrap()
            .join()
            .unwrap();

        let mut formatter = LineFormatter::new(line.emitted_at());
        assert_eq!(
            formatter.format(&line),
            format!(
                "0.000s  In Producer of {} with no running cooperative loop --- hello",
                line.active_threads()
            )
        );
    }

    #[test]
    fn active_thread_count_includes_census_threads() {
        let census = ThreadCensus::process();
        let (line, count_inside) = thread::spawn(move || {
            let _guard = census.enter();
            (LogLine::new("counted"), census.active())
        })
        .join()
        .unwrap();

        assert!(line.active_threads() >= 2);
        assert!(count_inside >= 2);
    }

    #[tokio::test]
    async fn line_from_inside_runtime_names_the_cooperative_loop() {
        let line = LogLine::new("inside");
        assert!(line.in_cooperative_loop());

        let mut formatter = LineFormatter::new(line.emitted_at());
        assert!(formatter.format(&line).contains(IN_COOPERATIVE_LOOP));
    }

    #[test]
    fn reset_moves_origin_to_the_line() {
        let mut formatter = LineFormatter::new(Instant::now());
        thread::sleep(Duration::from_millis(20));

        let line = LogLine::new("start over").with_origin_reset();
        let rendered = formatter.format(&line);

        assert!(rendered.starts_with("0.000s"), "{rendered}");
        assert_eq!(formatter.origin(), line.emitted_at());
    }

    #[test]
    fn line_older_than_origin_is_clamped_to_zero() {
        let older = LogLine::new("older");
        thread::sleep(Duration::from_millis(5));
        let reset = LogLine::new("reset").with_origin_reset();

        let mut formatter = LineFormatter::new(older.emitted_at());
        formatter.format(&reset);

        assert!(formatter.format(&older).starts_with("0.000s"));
    }

    #[test]
    fn unnamed_thread_falls_back_to_thread_id() {
        let line = thread::spawn(|| LogLine::new("x")).join().unwrap();
        assert!(line.origin_thread().starts_with("ThreadId("));
    }
}
