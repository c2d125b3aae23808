// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::IntoDiagnostic;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Opens (creating if needed) the log file at `path_str`, never rotated.
///
/// # Errors
///
/// Returns an error if:
/// - The path has no file name
/// - The parent folder can't be created, or the file can't be opened for appending
pub fn try_create_rolling_file_appender(path_str: &str) -> miette::Result<RollingFileAppender> {
    let path = PathBuf::from(path_str);

    let file_name = path
        .file_name()
        .and_then(|it| it.to_str())
        .ok_or_else(|| miette::miette!("Can't use {} as a log file name.", path.display()))?;

    let parent = match path.parent() {
        Some(it) if !it.as_os_str().is_empty() => it,
        _ => Path::new("."),
    };

    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(parent)
        .into_diagnostic()
}
