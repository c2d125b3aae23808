// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::TaskError;
use crate::TaskId;
use tokio::sync::oneshot::{self, error::TryRecvError};

/// Creates the single-writer / single-reader pair that carries one task's outcome.
#[must_use]
pub fn completion_pair<T>(task_id: TaskId) -> (CompletionSender<T>, CompletionHandle<T>) {
    let (tx, rx) = oneshot::channel();
    (
        CompletionSender { task_id, tx },
        CompletionHandle {
            task_id,
            rx: Some(rx),
        },
    )
}

/// Write side. [`complete()`] consumes it, so the outcome is set at most once.
///
/// [`complete()`]: Self::complete
#[derive(Debug)]
pub struct CompletionSender<T> {
    task_id: TaskId,
    tx: oneshot::Sender<miette::Result<T>>,
}

impl<T> CompletionSender<T> {
    #[must_use]
    pub fn task_id(&self) -> TaskId { self.task_id }

    pub fn complete(self, result: miette::Result<T>) {
        // A dropped handle means nobody is watching this task.
        self.tx.send(result).ok();
    }
}

/// What one non-blocking look at a [`CompletionHandle`] found.
#[derive(Debug)]
pub enum HandleState<T> {
    Pending,
    /// The terminal state. Returned exactly once.
    Finished(miette::Result<T>),
    /// The terminal state was already taken by an earlier call.
    AlreadyObserved,
}

/// Read side, owned by whoever watches the task (normally a [`TaskOutcomeMonitor`]).
///
/// If the writer is dropped without completing (the task was torn down), the handle
/// finishes with [`TaskError::Abandoned`].
///
/// [`TaskOutcomeMonitor`]: super::TaskOutcomeMonitor
#[derive(Debug)]
pub struct CompletionHandle<T> {
    task_id: TaskId,
    rx: Option<oneshot::Receiver<miette::Result<T>>>,
}

impl<T> CompletionHandle<T> {
    #[must_use]
    pub fn task_id(&self) -> TaskId { self.task_id }

    /// `true` once the terminal state has been taken. The receiver is released then.
    #[must_use]
    pub fn is_observed(&self) -> bool { self.rx.is_none() }

    /// Never blocks.
    pub fn try_take(&mut self) -> HandleState<T> {
        let Some(rx) = self.rx.as_mut() else {
            return HandleState::AlreadyObserved;
        };

        let result = match rx.try_recv() {
            Err(TryRecvError::Empty) => return HandleState::Pending,
            Ok(result) => result,
            Err(TryRecvError::Closed) => Err(TaskError::Abandoned {
                task_id: self.task_id,
            }
            .into()),
        };
        self.rx = None;
        HandleState::Finished(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_until_completed_then_observed_once() {
        let (tx, mut handle) = completion_pair::<u32>(TaskId::new(1));
        assert!(matches!(handle.try_take(), HandleState::Pending));

        tx.complete(Ok(7));
        assert!(matches!(handle.try_take(), HandleState::Finished(Ok(7))));
        assert!(handle.is_observed());
        assert!(matches!(handle.try_take(), HandleState::AlreadyObserved));
        assert!(matches!(handle.try_take(), HandleState::AlreadyObserved));
    }

    #[test]
    fn error_outcome_is_delivered() {
        let (tx, mut handle) = completion_pair::<()>(TaskId::new(2));
        tx.complete(Err(miette::miette!("nope")));

        let HandleState::Finished(Err(report)) = handle.try_take() else {
            panic!("expected a finished error");
        };
        assert_eq!(report.to_string(), "nope");
    }

    #[test]
    fn dropped_sender_finishes_as_abandoned() {
        let (tx, mut handle) = completion_pair::<()>(TaskId::new(3));
        assert_eq!(tx.task_id(), handle.task_id());
        drop(tx);

        let HandleState::Finished(Err(report)) = handle.try_take() else {
            panic!("expected abandoned");
        };
        assert!(matches!(
            report.downcast_ref::<TaskError>(),
            Some(TaskError::Abandoned { .. })
        ));
    }
}
