// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Installs the graphical [miette](https://docs.rs/miette/latest/miette/index.html)
//! report hook used when a binary's `main() -> miette::Result<_>` returns an error, for
//! example when an unexpected task failure reaches the [`FatalErrorReceiver`].
//!
//! [`FatalErrorReceiver`]: crate::FatalErrorReceiver

use miette::MietteHandlerOpts;
use tracing::debug;

/// Width used when the `COLUMNS` environment variable is missing or not a number.
pub const DEFAULT_REPORT_WIDTH: usize = 100;

/// The [`miette::ErrorHook`] is lazily evaluated, so the report width is only computed
/// when an error is actually displayed.
pub fn setup_default_miette_global_report_handler(issues_url: &'static str) {
    miette::set_hook(Box::new(|_report| {
        let report_width = report_width_from_env(std::env::var("COLUMNS").ok());
        debug!(report_width, "miette::set_hook");
        Box::new(
            MietteHandlerOpts::new()
                .width(report_width)
                .wrap_lines(true)
                .force_graphical(true)
                .unicode(true)
                .context_lines(3)
                .tab_width(4)
                .break_words(true)
                .with_cause_chain()
                .footer(issues_url.to_string())
                .build(),
        )
    }))
    .ok();
}

fn report_width_from_env(columns: Option<String>) -> usize {
    columns
        .and_then(|it| it.trim().parse::<usize>().ok())
        .filter(|it| *it > 0)
        .unwrap_or(DEFAULT_REPORT_WIDTH)
}
