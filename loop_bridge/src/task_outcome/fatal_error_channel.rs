// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, error::TryRecvError,
                        unbounded_channel};

/// The process's top-level error channel. Unexpected task failures are sent here; the
/// host drains the receiver and ends the process with a non-zero status.
#[must_use]
pub fn fatal_error_channel() -> (FatalErrorSender, FatalErrorReceiver) {
    let (tx, rx) = unbounded_channel();
    (FatalErrorSender { tx }, FatalErrorReceiver { rx })
}

#[derive(Debug, Clone)]
pub struct FatalErrorSender {
    tx: UnboundedSender<miette::Report>,
}

impl FatalErrorSender {
    /// # Panics
    ///
    /// If the [`FatalErrorReceiver`] is gone. An unexpected failure must never be dropped
    /// silently.
    pub fn report(&self, error: miette::Report) {
        if let Err(unsent) = self.tx.send(error) {
            panic!("Fatal error channel is closed, can't report: {:?}", unsent.0);
        }
    }
}

#[derive(Debug)]
pub struct FatalErrorReceiver {
    rx: UnboundedReceiver<miette::Report>,
}

impl FatalErrorReceiver {
    /// Next reported error, if any. Never blocks.
    pub fn try_next(&mut self) -> Option<miette::Report> {
        match self.rx.try_recv() {
            Ok(it) => Some(it),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// `true` while at least one reported error is waiting. Does not consume it, so a
    /// poll loop can use it as a stop condition and [`check()`] afterwards.
    ///
    /// [`check()`]: Self::check
    #[must_use]
    pub fn has_errors(&self) -> bool { !self.rx.is_empty() }

    /// Everything reported so far.
    pub fn drain(&mut self) -> Vec<miette::Report> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    /// `Err` with the first reported error, so `main() -> miette::Result<()>` can use `?`.
    ///
    /// # Errors
    ///
    /// The first unexpected failure reported so far.
    pub fn check(&mut self) -> miette::Result<()> {
        match self.try_next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn reported_errors_are_received_in_order() {
        let (tx, mut rx) = fatal_error_channel();
        assert!(rx.check().is_ok());

        tx.report(miette::miette!("first"));
        tx.clone().report(miette::miette!("second"));

        assert_eq!(rx.check().unwrap_err().to_string(), "first");
        let rest: Vec<String> = rx.drain().iter().map(ToString::to_string).collect();
        assert_eq!(rest, vec!["second".to_string()]);
    }

    #[test]
    fn has_errors_peeks_without_consuming() {
        let (tx, mut rx) = fatal_error_channel();
        assert!(!rx.has_errors());

        tx.report(miette::miette!("boom"));
        assert!(rx.has_errors());
        assert!(rx.has_errors());

        assert_eq!(rx.check().unwrap_err().to_string(), "boom");
        assert!(!rx.has_errors());
    }

    #[test]
    #[should_panic(expected = "Fatal error channel is closed")]
    fn reporting_without_receiver_panics() {
        let (tx, rx) = fatal_error_channel();
        drop(rx);
        tx.report(miette::miette!("lost"));
    }
}
