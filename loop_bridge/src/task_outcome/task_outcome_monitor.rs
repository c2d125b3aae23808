// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{CompletionHandle, FailureClassifier, FailureKind, FatalErrorSender,
            HandleState};
use crate::TaskId;
use tracing::{debug, error, warn};

/// What one [`TaskOutcomeMonitor::poll()`] found.
#[derive(Debug, PartialEq, Eq)]
pub enum TaskPoll<T> {
    Pending,
    Succeeded(T),
    Failed(FailureKind),
    /// The terminal state was returned by an earlier poll.
    AlreadyObserved,
}

impl<T> TaskPoll<T> {
    /// `false` only for [`TaskPoll::Pending`].
    #[must_use]
    pub fn is_terminal(&self) -> bool { !matches!(self, Self::Pending) }
}

/// Watches one [`CompletionHandle`] from the poll loop and routes failures.
///
/// - [`FailureKind::Expected`]: logged with `warn!` as handled, nothing else happens.
/// - [`FailureKind::Unexpected`]: logged with `error!`, then handed to the
///   [`FatalErrorSender`].
///
/// Exactly one poll returns the terminal state. The handle is released at that point and
/// later polls return [`TaskPoll::AlreadyObserved`].
///
/// Drive it with [`watch_completion()`] to have it re-armed on the host poll loop.
///
/// [`watch_completion()`]: crate::watch_completion
#[allow(missing_debug_implementations)]
pub struct TaskOutcomeMonitor<T> {
    handle: CompletionHandle<T>,
    classifier: FailureClassifier,
    fatal_tx: FatalErrorSender,
    label: String,
}

impl<T> TaskOutcomeMonitor<T> {
    pub fn new(
        handle: CompletionHandle<T>,
        classifier: FailureClassifier,
        fatal_tx: FatalErrorSender,
    ) -> Self {
        let label = format!("Task {}", handle.task_id());
        Self {
            handle,
            classifier,
            fatal_tx,
            label,
        }
    }

    /// Name used in log messages. Defaults to `Task {id}`.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    #[must_use]
    pub fn task_id(&self) -> TaskId { self.handle.task_id() }

    #[must_use]
    pub fn label(&self) -> &str { &self.label }

    /// Never blocks.
    ///
    /// # Panics
    ///
    /// If an unexpected failure arrives and the fatal error receiver is gone.
    pub fn poll(&mut self) -> TaskPoll<T> {
        let task_id = self.handle.task_id();
        let label = &self.label;

        match self.handle.try_take() {
            HandleState::Pending => TaskPoll::Pending,
            HandleState::AlreadyObserved => TaskPoll::AlreadyObserved,
            HandleState::Finished(Ok(value)) => {
                debug!(%task_id, "{label} succeeded");
                TaskPoll::Succeeded(value)
            }
            HandleState::Finished(Err(report)) => {
                let kind = (self.classifier)(&report);
                match kind {
                    FailureKind::Expected => {
                        warn!(%task_id, %kind, "{label}: {report} was handled correctly.");
                    }
                    FailureKind::Unexpected => {
                        error!(%task_id, %kind, "{label}: {report}");
                        self.fatal_tx.report(report);
                    }
                }
                TaskPoll::Failed(kind)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RecoverableIoError, classify_io_errors_as_expected, completion_pair,
                fatal_error_channel};
    use pretty_assertions::assert_eq;

    #[test]
    fn success_is_observed_exactly_once() {
        let (fatal_tx, mut fatal_rx) = fatal_error_channel();
        let (tx, handle) = completion_pair::<&str>(TaskId::new(1));
        let mut monitor =
            TaskOutcomeMonitor::new(handle, classify_io_errors_as_expected, fatal_tx);

        assert_eq!(monitor.poll(), TaskPoll::Pending);
        tx.complete(Ok("done"));
        assert_eq!(monitor.poll(), TaskPoll::Succeeded("done"));
        assert_eq!(monitor.poll(), TaskPoll::AlreadyObserved);
        assert!(fatal_rx.try_next().is_none());
    }

    #[test]
    fn expected_failure_stays_local() {
        let (fatal_tx, mut fatal_rx) = fatal_error_channel();
        let (tx, handle) = completion_pair::<()>(TaskId::new(2));
        let mut monitor =
            TaskOutcomeMonitor::new(handle, classify_io_errors_as_expected, fatal_tx)
                .with_label("io_blocker");
        assert_eq!(monitor.label(), "io_blocker");

        tx.complete(Err(RecoverableIoError::from(std::io::Error::other(
            "Just testing an expected error.",
        ))
        .into()));

        assert_eq!(monitor.poll(), TaskPoll::Failed(FailureKind::Expected));
        assert!(fatal_rx.try_next().is_none());
    }

    #[test]
    fn unexpected_failure_reaches_fatal_channel() {
        let (fatal_tx, mut fatal_rx) = fatal_error_channel();
        let (tx, handle) = completion_pair::<()>(TaskId::new(3));
        let mut monitor =
            TaskOutcomeMonitor::new(handle, classify_io_errors_as_expected, fatal_tx);

        tx.complete(Err(miette::miette!("Just testing an unexpected error.")));

        assert_eq!(monitor.poll(), TaskPoll::Failed(FailureKind::Unexpected));
        assert_eq!(
            fatal_rx.check().unwrap_err().to_string(),
            "Just testing an unexpected error."
        );
        assert_eq!(monitor.poll(), TaskPoll::AlreadyObserved);
    }

    #[test]
    fn abandoned_task_is_unexpected() {
        let (fatal_tx, mut fatal_rx) = fatal_error_channel();
        let (tx, handle) = completion_pair::<()>(TaskId::new(4));
        let mut monitor =
            TaskOutcomeMonitor::new(handle, classify_io_errors_as_expected, fatal_tx);
        drop(tx);

        assert_eq!(monitor.poll(), TaskPoll::Failed(FailureKind::Unexpected));
        assert!(fatal_rx.try_next().is_some());
    }
}
