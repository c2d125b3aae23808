// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::TaskId;
use strum_macros::{Display, EnumString};

/// Which kind of producer made a [`WorkPackage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum WorkOrigin {
    #[strum(serialize = "blocking worker")]
    BlockingWorker,
    #[strum(serialize = "cooperative task")]
    CooperativeTask,
}

/// An immutable unit of work moving from a producer to the poll loop.
///
/// Created by a producer, moved through the [`WorkBridge`], consumed once by the poll
/// loop. When a dispatched task produces it, `id` is that task's [`TaskId`].
///
/// [`WorkBridge`]: crate::WorkBridge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkPackage<P> {
    id: TaskId,
    payload: P,
    origin: WorkOrigin,
}

impl<P> WorkPackage<P> {
    pub fn new(id: TaskId, payload: P, origin: WorkOrigin) -> Self {
        Self {
            id,
            payload,
            origin,
        }
    }

    #[must_use]
    pub fn id(&self) -> TaskId { self.id }

    #[must_use]
    pub fn payload(&self) -> &P { &self.payload }

    #[must_use]
    pub fn origin(&self) -> WorkOrigin { self.origin }

    pub fn into_payload(self) -> P { self.payload }
}
