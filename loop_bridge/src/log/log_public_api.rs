// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::TracingConfig;
use tracing::dispatcher;
use tracing_core::LevelFilter;

/// Global default subscriber, which once set can't be unset or changed. Meant for
/// binaries.
///
/// Logging is **disabled** unless the level is something other than
/// [`LevelFilter::OFF`]. `options` is anything that converts into a [`TracingConfig`].
///
/// # Errors
///
/// If the layers can't be created or a global subscriber is already installed.
pub fn try_initialize_logging_global(options: impl Into<TracingConfig>) -> miette::Result<()> {
    let it: TracingConfig = options.into();

    if it.get_level_filter() == LevelFilter::OFF {
        return Ok(());
    }

    it.install_global()
}

/// Subscriber for the current thread only. Meant for tests, where each test can log to
/// its own sink.
///
/// Returns `None` when the level is [`LevelFilter::OFF`]. Otherwise logging stays active
/// until the returned guard is dropped. Events emitted on other threads (the cooperative
/// loop, workers) are not seen by this subscriber.
///
/// # Errors
///
/// If the layers can't be created.
pub fn try_initialize_logging_thread_local(
    options: impl Into<TracingConfig>,
) -> miette::Result<Option<dispatcher::DefaultGuard>> {
    let it: TracingConfig = options.into();

    if it.get_level_filter() == LevelFilter::OFF {
        return Ok(None);
    }

    it.install_thread_local().map(Some)
}
