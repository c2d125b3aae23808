// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Extension trait for [`AtomicU64`] used by the id counter. See [`AtomicU64Ext`] for
//! details.
//!
//! [`AtomicU64`]: std::sync::atomic::AtomicU64

use std::sync::atomic::{AtomicU64, Ordering};

/// Helpers for [`AtomicU64`] that hide [`SeqCst`] boilerplate and the [`fetch_add`]
/// return-value quirk.
///
/// ## The `fetch_add` quirk
///
/// [`AtomicU64::fetch_add`] returns the **old** value. [`increment`] derives the new
/// value from that old value instead of issuing a second load with [`get`], which would
/// race with other threads' increments:
///
/// ```text
///              Thread A              Thread B          Stored
///              --------              --------          ------
///                                                        5
///  fetch_add(1) -> old=5                                 6
///                              fetch_add(1) -> old=6     7
///
///  // Bad: self.get() returns 7 (Thread B's increment leaked in)
///  // Good: old + 1 returns 6 (derived from own old value)
/// ```
///
/// [`AtomicU64::fetch_add`]: std::sync::atomic::AtomicU64::fetch_add
/// [`AtomicU64`]: std::sync::atomic::AtomicU64
/// [`SeqCst`]: Ordering::SeqCst
/// [`fetch_add`]: std::sync::atomic::AtomicU64::fetch_add
/// [`get`]: Self::get
/// [`increment`]: Self::increment
pub trait AtomicU64Ext {
    /// Atomically increments the counter and returns the **new** value.
    fn increment(&self) -> u64;

    /// Reads the current value.
    fn get(&self) -> u64;
}

impl AtomicU64Ext for AtomicU64 {
    fn increment(&self) -> u64 { self.fetch_add(1, Ordering::SeqCst).wrapping_add(1) }

    fn get(&self) -> u64 { self.load(Ordering::SeqCst) }
}
