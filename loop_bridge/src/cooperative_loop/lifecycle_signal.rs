// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::sync::{Arc,
                atomic::{AtomicBool, Ordering}};

/// One-way "please shut down" flag. Goes from unset to set exactly once, can be set from
/// any thread, and never blocks. The cooperative loop checks it between iterations.
#[derive(Debug, Clone, Default)]
pub struct LoopLifecycleSignal(Arc<AtomicBool>);

impl LoopLifecycleSignal {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Idempotent.
    pub fn set(&self) { self.0.store(true, Ordering::SeqCst); }

    #[must_use]
    pub fn is_set(&self) -> bool { self.0.load(Ordering::SeqCst) }
}
