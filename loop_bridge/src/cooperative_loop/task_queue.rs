// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The thread-safe queue that carries scheduled tasks into the cooperative loop.

use super::LoopError;
use crate::TaskId;
use std::{future::Future, pin::Pin};
use tokio::sync::mpsc::{self, error::TrySendError};

/// A type-erased task, ready to be spawned on the loop's runtime.
pub type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

#[must_use]
pub fn task_queue(capacity: Option<usize>) -> (TaskQueueSender, TaskQueueReceiver) {
    match capacity {
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (TaskQueueSender::Unbounded(tx), TaskQueueReceiver::Unbounded(rx))
        }
        Some(size) => {
            let (tx, rx) = mpsc::channel(size.max(1));
            (TaskQueueSender::Bounded(tx), TaskQueueReceiver::Bounded(rx))
        }
    }
}

#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub enum TaskQueueSender {
    Unbounded(mpsc::UnboundedSender<BoxedTask>),
    Bounded(mpsc::Sender<BoxedTask>),
}

impl TaskQueueSender {
    /// Never blocks.
    ///
    /// # Errors
    ///
    /// - [`LoopError::TaskQueueFull`] when a bounded queue is full.
    /// - [`LoopError::NotRunning`] (with `closed_state`) when the loop stopped accepting.
    pub fn try_send(
        &self,
        task_id: TaskId,
        task: BoxedTask,
        closed_state: super::LoopState,
    ) -> Result<(), LoopError> {
        let closed = LoopError::NotRunning {
            state: closed_state,
        };
        match self {
            Self::Unbounded(tx) => tx.send(task).map_err(|_| closed),
            Self::Bounded(tx) => tx.try_send(task).map_err(|error| match error {
                TrySendError::Full(_) => LoopError::TaskQueueFull { task_id },
                TrySendError::Closed(_) => closed,
            }),
        }
    }
}

#[allow(missing_debug_implementations)]
pub enum TaskQueueReceiver {
    Unbounded(mpsc::UnboundedReceiver<BoxedTask>),
    Bounded(mpsc::Receiver<BoxedTask>),
}

impl TaskQueueReceiver {
    pub async fn recv(&mut self) -> Option<BoxedTask> {
        match self {
            Self::Unbounded(rx) => rx.recv().await,
            Self::Bounded(rx) => rx.recv().await,
        }
    }

    pub fn try_recv(&mut self) -> Option<BoxedTask> {
        match self {
            Self::Unbounded(rx) => rx.try_recv().ok(),
            Self::Bounded(rx) => rx.try_recv().ok(),
        }
    }

    /// Stops accepting. Already queued tasks can still be received.
    pub fn close(&mut self) {
        match self {
            Self::Unbounded(rx) => rx.close(),
            Self::Bounded(rx) => rx.close(),
        }
    }
}
