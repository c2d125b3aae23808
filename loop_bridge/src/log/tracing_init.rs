// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{DisplayPreference, TracingConfig, WriterConfig, try_create_rolling_file_appender};
use crate::SerialLogMakeWriter;
use miette::IntoDiagnostic;
use tracing::dispatcher;
use tracing_core::LevelFilter;
use tracing_subscriber::{Layer, Registry, layer::SubscriberExt, registry::LookupSpan,
                         util::SubscriberInitExt};

/// Type alias for a boxed layer.
pub type DynLayer<S> = dyn Layer<S> + Send + Sync + 'static;

/// Returns the layers for `tracing_config`. This does not install anything.
///
/// The first layer is the level filter itself, followed by the display layer and the file
/// layer, each present only if the [`WriterConfig`] asks for it.
///
/// # Errors
///
/// If the log file can't be created.
pub fn try_create_layers(
    tracing_config: &TracingConfig,
) -> miette::Result<Vec<Box<DynLayer<Registry>>>> {
    let level_filter = tracing_config.get_level_filter();
    let writer_config = tracing_config.get_writer_config();

    let mut layers: Vec<Box<DynLayer<Registry>>> = vec![Box::new(level_filter)];
    if let Some(layer) = try_create_display_layer(level_filter, &writer_config)? {
        layers.push(layer);
    }
    if let Some(layer) = try_create_file_layer(level_filter, &writer_config)? {
        layers.push(layer);
    }
    Ok(layers)
}

/// `None` unless the [`WriterConfig`] has a [`DisplayPreference`].
///
/// For [`DisplayPreference::SerialLogger`] the layer drops its own timestamp and ANSI
/// colors. The serial logger prefixes each line with elapsed time, thread, and loop.
///
/// # Errors
///
/// Never at the moment. Kept fallible to match [`try_create_file_layer()`].
pub fn try_create_display_layer<S>(
    level_filter: LevelFilter,
    writer_config: &WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let display_pref = match writer_config {
        WriterConfig::Display(it) | WriterConfig::DisplayAndFile(it, _) => it,
        WriterConfig::None | WriterConfig::File(_) => return Ok(None),
    };

    let fmt_layer = tracing_subscriber::fmt::layer().with_thread_names(true);

    Ok(Some(match display_pref {
        DisplayPreference::Stdout => fmt_layer
            .with_writer(std::io::stdout)
            .with_filter(level_filter)
            .boxed(),
        DisplayPreference::Stderr => fmt_layer
            .with_writer(std::io::stderr)
            .with_filter(level_filter)
            .boxed(),
        DisplayPreference::SerialLogger(handle) => fmt_layer
            .without_time()
            .with_ansi(false)
            .with_thread_names(false)
            .with_target(false)
            .with_writer(SerialLogMakeWriter::new(handle.clone()))
            .with_filter(level_filter)
            .boxed(),
    }))
}

/// `None` unless the [`WriterConfig`] has a file path.
///
/// # Errors
///
/// If the log file can't be created.
pub fn try_create_file_layer<S>(
    level_filter: LevelFilter,
    writer_config: &WriterConfig,
) -> miette::Result<Option<Box<DynLayer<S>>>>
where
    S: tracing_core::Subscriber,
    for<'a> S: LookupSpan<'a>,
{
    let path = match writer_config {
        WriterConfig::File(it) | WriterConfig::DisplayAndFile(_, it) => it,
        WriterConfig::None | WriterConfig::Display(_) => return Ok(None),
    };

    let file = try_create_rolling_file_appender(path)?;
    Ok(Some(
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_thread_names(true)
            .with_writer(file)
            .with_filter(level_filter)
            .boxed(),
    ))
}

impl TracingConfig {
    /// Installs the global default subscriber. It can only be set once per process.
    ///
    /// # Errors
    ///
    /// If the layers can't be created or a global subscriber is already set.
    pub fn install_global(&self) -> miette::Result<()> {
        let layers = try_create_layers(self)?;
        tracing_subscriber::registry()
            .with(layers)
            .try_init()
            .into_diagnostic()
    }

    /// Installs a subscriber for the current thread only, until the guard is dropped.
    ///
    /// # Errors
    ///
    /// If the layers can't be created.
    pub fn install_thread_local(&self) -> miette::Result<dispatcher::DefaultGuard> {
        let layers = try_create_layers(self)?;
        let subscriber = tracing_subscriber::registry().with(layers);
        Ok(tracing::subscriber::set_default(subscriber))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SerialLogger, SharedBufferSink};
    use serial_test::serial;
    use std::path::PathBuf;

    fn temp_log_path(name: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir()
            .join(format!("loop_bridge_{}_{nanos}", std::process::id()))
            .join(name)
    }

    #[test]
    fn display_layer_only_for_display_configs() {
        let display = WriterConfig::Display(DisplayPreference::Stdout);
        let file = WriterConfig::File("unused.log".to_string());

        assert!(
            try_create_display_layer::<Registry>(LevelFilter::DEBUG, &display)
                .unwrap()
                .is_some()
        );
        assert!(
            try_create_display_layer::<Registry>(LevelFilter::DEBUG, &file)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn file_layer_creates_the_file() {
        let path = temp_log_path("file_layer.log");
        let config = WriterConfig::File(path.to_string_lossy().into_owned());

        let layer = try_create_file_layer::<Registry>(LevelFilter::DEBUG, &config).unwrap();

        assert!(layer.is_some());
        assert!(path.exists());
    }

    #[test]
    fn both_layers_plus_level_filter() {
        let path = temp_log_path("both.log");
        let config = TracingConfig::new_file_and_display(
            Some(path.to_string_lossy().into_owned()),
            DisplayPreference::Stderr,
        );

        assert_eq!(try_create_layers(&config).unwrap().len(), 3);
    }

    #[test]
    #[serial]
    fn serial_logger_receives_tracing_events() {
        let sink = SharedBufferSink::new();
        let logger = SerialLogger::new(sink.clone()).open().unwrap();

        let config = TracingConfig {
            level_filter: LevelFilter::INFO,
            writer_config: WriterConfig::Display(DisplayPreference::SerialLogger(
                logger.handle(),
            )),
        };
        let default_guard = config.install_thread_local().unwrap();

        tracing::error!("error");
        tracing::warn!(task_id = 3, "warn");
        tracing::info!("info");
        tracing::debug!("debug");

        drop(default_guard);
        logger.close(None).unwrap();

        let output = sink.contents();
        assert!(output.contains("ERROR"), "{output}");
        assert!(output.contains("WARN"), "{output}");
        assert!(output.contains("task_id=3"), "{output}");
        assert!(output.contains("info"), "{output}");
        assert!(!output.contains("debug"), "{output}");
        assert!(
            output
                .lines()
                .filter(|it| it.contains(" warn"))
                .all(|it| it.contains("with no running cooperative loop")),
            "{output}"
        );
    }
}
