// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::{TaskId, WorkBridgeError, WorkOrigin, WorkPackage, WorkSender};

/// Handed to a dispatched task so it can deliver its result to the poll loop.
///
/// The delivered [`WorkPackage`] carries the task's own [`TaskId`] (allocated at dispatch,
/// so ids follow dispatch order). Both deliver methods consume the context, so a task
/// delivers at most one package.
#[allow(missing_debug_implementations)]
pub struct TaskContext<P> {
    task_id: TaskId,
    origin: WorkOrigin,
    sender: WorkSender<P>,
}

impl<P> TaskContext<P> {
    pub fn new(task_id: TaskId, origin: WorkOrigin, sender: WorkSender<P>) -> Self {
        Self {
            task_id,
            origin,
            sender,
        }
    }

    #[must_use]
    pub fn task_id(&self) -> TaskId { self.task_id }

    #[must_use]
    pub fn origin(&self) -> WorkOrigin { self.origin }

    /// From inside the cooperative loop. Yields (never blocks) while a bounded bridge is
    /// full.
    ///
    /// # Errors
    ///
    /// [`WorkBridgeError::Disconnected`] when the poll loop's receiver is gone.
    pub async fn deliver(self, payload: P) -> Result<(), WorkBridgeError> {
        let package = WorkPackage::new(self.task_id, payload, self.origin);
        self.sender.send_cooperative(package).await
    }

    /// From a worker thread. Blocks while a bounded bridge is full.
    ///
    /// # Errors
    ///
    /// [`WorkBridgeError::Disconnected`] when the poll loop's receiver is gone.
    pub fn deliver_blocking(self, payload: P) -> Result<(), WorkBridgeError> {
        let package = WorkPackage::new(self.task_id, payload, self.origin);
        self.sender.send_blocking(package)
    }
}
