// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::sync::atomic::{AtomicUsize, Ordering};

static PROCESS_CENSUS: ThreadCensus = ThreadCensus::new();

/// Counts the threads that are alive right now: the main thread plus every thread that
/// holds a [`ThreadCensusGuard`]. The crate enters the process wide census (see
/// [`ThreadCensus::process()`]) at the top of each thread it spawns: the logger's
/// consumer, the cooperative loop thread and every blocking worker. The
/// [`SerialLogger`] reports the count in each timestamped line.
///
/// Threads spawned by the host application are only counted if they enter the census
/// themselves.
///
/// [`SerialLogger`]: crate::SerialLogger
#[derive(Debug)]
pub struct ThreadCensus {
    spawned: AtomicUsize,
}

impl Default for ThreadCensus {
    fn default() -> Self { Self::new() }
}

impl ThreadCensus {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            spawned: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn process() -> &'static Self { &PROCESS_CENSUS }

    /// Call first thing on a new thread and keep the guard until the thread returns. The
    /// guard also leaves the census while unwinding.
    #[must_use]
    pub fn enter(&self) -> ThreadCensusGuard<'_> {
        self.spawned.fetch_add(1, Ordering::SeqCst);
        ThreadCensusGuard { census: self }
    }

    /// Main thread included, so never less than 1.
    #[must_use]
    pub fn active(&self) -> usize { 1 + self.spawned.load(Ordering::SeqCst) }
}

#[derive(Debug)]
pub struct ThreadCensusGuard<'a> {
    census: &'a ThreadCensus,
}

impl Drop for ThreadCensusGuard<'_> {
    fn drop(&mut self) { self.census.spawned.fetch_sub(1, Ordering::SeqCst); }
}
