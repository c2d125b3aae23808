// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Process-unique ids for dispatched tasks and the [`WorkPackage`]s they produce. See
//! [`IdAllocator`].
//!
//! [`WorkPackage`]: crate::WorkPackage

use super::AtomicU64Ext;
use std::{fmt,
          sync::{Arc, atomic::AtomicU64}};

/// Id of a dispatched task, and of the [`WorkPackage`] that task delivers.
///
/// Issued by [`IdAllocator::next_id()`] starting at `1`, so ids reflect dispatch order.
///
/// [`WorkPackage`]: crate::WorkPackage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    #[must_use]
    pub const fn new(value: u64) -> Self { Self(value) }

    #[must_use]
    pub const fn as_u64(self) -> u64 { self.0 }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Thread-safe id service. Cloning is cheap and every clone draws from the same counter.
///
/// There is no `static` counter. Whoever needs ids is handed an [`IdAllocator`] (the
/// [`WorkBridge`] stores one in every [`WorkSender`]).
///
/// [`WorkBridge`]: crate::WorkBridge
/// [`WorkSender`]: crate::WorkSender
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    counter: Arc<AtomicU64>,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Allocates the next id. The first id is `1`.
    #[must_use]
    pub fn next_id(&self) -> TaskId { TaskId(self.counter.increment()) }

    /// How many ids have been issued so far.
    #[must_use]
    pub fn issued(&self) -> u64 { self.counter.get() }
}
