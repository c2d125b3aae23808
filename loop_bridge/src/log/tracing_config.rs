// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::SerialLogHandle;
use std::{fmt::Debug, ops::Add};
use tracing_core::LevelFilter;

pub const DEFAULT_LOG_FILE_NAME: &str = "log.txt";

/// Where `tracing` output goes and at which level.
///
/// Build one from any of the pieces, and compose with `+` (the `rhs` wins on collisions):
///
/// ```no_run
/// use loop_bridge::{DisplayPreference, TracingConfig, WriterConfig};
///
/// let level: TracingConfig = tracing_core::LevelFilter::INFO.into();
/// let display: TracingConfig = DisplayPreference::Stderr.into();
/// let file: TracingConfig = WriterConfig::File("app.log".to_string()).into();
///
/// let config = level + display + file;
/// ```
///
/// A level of [`LevelFilter::OFF`] disables logging.
#[derive(Debug, Clone, PartialEq)]
pub struct TracingConfig {
    pub level_filter: LevelFilter,
    pub writer_config: WriterConfig,
}

impl TracingConfig {
    #[must_use]
    pub fn new_display(preferred_display: DisplayPreference) -> Self {
        Self {
            level_filter: LevelFilter::DEBUG,
            writer_config: WriterConfig::Display(preferred_display),
        }
    }

    #[must_use]
    pub fn new_file_and_display(
        filename: Option<String>,
        preferred_display: DisplayPreference,
    ) -> Self {
        Self {
            level_filter: LevelFilter::DEBUG,
            writer_config: WriterConfig::DisplayAndFile(
                preferred_display,
                filename.unwrap_or_else(|| DEFAULT_LOG_FILE_NAME.to_string()),
            ),
        }
    }

    #[must_use]
    pub fn get_level_filter(&self) -> LevelFilter { self.level_filter }

    #[must_use]
    pub fn get_writer_config(&self) -> WriterConfig { self.writer_config.clone() }
}

/// - `String` is the log file path, e.g. `/tmp/loop_bridge.log` or `loop_bridge.log`.
#[derive(Debug, Clone, PartialEq)]
pub enum WriterConfig {
    None,
    Display(DisplayPreference),
    File(String),
    DisplayAndFile(DisplayPreference, String),
}

#[derive(Clone)]
pub enum DisplayPreference {
    Stdout,
    Stderr,
    /// Every event becomes a [`LogLine`] on this logger.
    ///
    /// [`LogLine`]: crate::LogLine
    SerialLogger(SerialLogHandle),
}

impl Debug for DisplayPreference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DisplayPreference::Stdout => write!(f, "Stdout"),
            DisplayPreference::Stderr => write!(f, "Stderr"),
            DisplayPreference::SerialLogger(_) => write!(f, "SerialLogger"),
        }
    }
}

impl PartialEq for DisplayPreference {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Stdout, Self::Stdout) | (Self::Stderr, Self::Stderr) => true,
            (Self::SerialLogger(lhs), Self::SerialLogger(rhs)) => lhs.same_channel(rhs),
            _ => false,
        }
    }
}

impl From<tracing::Level> for TracingConfig {
    fn from(level: tracing::Level) -> Self {
        Self {
            level_filter: level.into(),
            writer_config: WriterConfig::None,
        }
    }
}

impl From<LevelFilter> for TracingConfig {
    fn from(level_filter: LevelFilter) -> Self {
        Self {
            level_filter,
            writer_config: WriterConfig::None,
        }
    }
}

impl From<DisplayPreference> for TracingConfig {
    fn from(preferred_display: DisplayPreference) -> Self {
        Self::new_display(preferred_display)
    }
}

impl From<WriterConfig> for TracingConfig {
    fn from(writer_config: WriterConfig) -> Self {
        Self {
            level_filter: LevelFilter::DEBUG,
            writer_config,
        }
    }
}

/// The `rhs` level wins unless it is [`LevelFilter::OFF`] while `self` is not. Writer
/// configs merge with [`WriterConfig`]'s `+`.
impl Add<TracingConfig> for TracingConfig {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let level_filter = if rhs.level_filter == LevelFilter::OFF {
            self.level_filter
        } else {
            rhs.level_filter
        };
        Self {
            level_filter,
            writer_config: self.writer_config + rhs.writer_config,
        }
    }
}

/// `rhs` has higher specificity: it clobbers `self` wherever it has a value.
/// - `{a: "foo"} + {a: "bar"} = {a: "bar"}`.
/// - `{a: None } + {a: "bar"} = {a: "bar"}`.
/// - `{a: "foo"} + {a: None } = {a: "foo"}`.
impl Add<WriterConfig> for WriterConfig {
    type Output = Self;

    fn add(self, rhs: WriterConfig) -> Self::Output {
        use WriterConfig::{Display, DisplayAndFile, File, None};

        match (self, rhs) {
            // No collision.
            (None, it) | (it, None) => it,
            (Display(display), File(file)) | (File(file), Display(display)) => {
                DisplayAndFile(display, file)
            }

            // Collision, rhs wins.
            (Display(_) | File(_) | DisplayAndFile(..), DisplayAndFile(display, file))
            | (DisplayAndFile(_, file), Display(display))
            | (DisplayAndFile(display, _), File(file)) => DisplayAndFile(display, file),
            (Display(_), Display(display)) => Display(display),
            (File(_), File(file)) => File(file),
        }
    }
}
