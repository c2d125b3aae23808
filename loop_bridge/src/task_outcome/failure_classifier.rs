// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use strum_macros::Display;

/// How a failed task is treated by the [`TaskOutcomeMonitor`].
///
/// | Kind         | Logged with | Then                                        |
/// | :----------- | :---------- | :------------------------------------------ |
/// | `Expected`   | `warn!`     | the task counts as complete                 |
/// | `Unexpected` | `error!`    | the error goes to the [`FatalErrorSender`]  |
///
/// [`FatalErrorSender`]: super::FatalErrorSender
/// [`TaskOutcomeMonitor`]: super::TaskOutcomeMonitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum FailureKind {
    #[strum(serialize = "expected")]
    Expected,
    #[strum(serialize = "unexpected")]
    Unexpected,
}

/// Decides the [`FailureKind`] of a task error. A plain function so it can be stored and
/// copied freely.
pub type FailureClassifier = fn(&miette::Report) -> FailureKind;

/// An I/O failure the application knows how to live with. Wrap an [`std::io::Error`] in
/// this (usually with [`IntoRecoverable::into_recoverable()`]) and
/// [`classify_io_errors_as_expected()`] treats the failure as expected.
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
#[error("{context}")]
#[diagnostic(code(loop_bridge::task::recoverable_io))]
pub struct RecoverableIoError {
    pub context: String,
    #[source]
    pub source: std::io::Error,
}

impl RecoverableIoError {
    pub fn new(context: impl Into<String>, source: std::io::Error) -> Self {
        Self {
            context: context.into(),
            source,
        }
    }
}

impl From<std::io::Error> for RecoverableIoError {
    fn from(source: std::io::Error) -> Self {
        Self {
            context: source.to_string(),
            source,
        }
    }
}

/// Like [`miette::IntoDiagnostic`], but keeps I/O errors recognizable as expected.
///
/// `.into_diagnostic()` boxes the error in an anonymous wrapper that hides its type, so
/// an `io::Error` converted that way can't be told apart from any other failure and is
/// classified [`FailureKind::Unexpected`]. Use `.into_recoverable()` for I/O failures the
/// application can live with.
///
/// ```
/// use loop_bridge::{FailureKind, IntoRecoverable, classify_io_errors_as_expected};
///
/// let report = std::fs::read("/no/such/file").into_recoverable().unwrap_err();
/// assert_eq!(classify_io_errors_as_expected(&report), FailureKind::Expected);
/// ```
pub trait IntoRecoverable<T> {
    /// Wraps the error in a [`RecoverableIoError`] whose message is the error's own.
    ///
    /// # Errors
    ///
    /// The wrapped error, if `self` is an `Err`.
    fn into_recoverable(self) -> miette::Result<T>;

    /// Wraps the error in a [`RecoverableIoError`] with `context` as its message.
    ///
    /// # Errors
    ///
    /// The wrapped error, if `self` is an `Err`.
    fn into_recoverable_with(self, context: impl Into<String>) -> miette::Result<T>;
}

impl<T> IntoRecoverable<T> for Result<T, std::io::Error> {
    fn into_recoverable(self) -> miette::Result<T> {
        self.map_err(|error| RecoverableIoError::from(error).into())
    }

    fn into_recoverable_with(self, context: impl Into<String>) -> miette::Result<T> {
        self.map_err(|error| RecoverableIoError::new(context, error).into())
    }
}

/// The default [`FailureClassifier`]. [`FailureKind::Expected`] when the error chain holds
/// a [`RecoverableIoError`], or an [`std::io::Error`] kept as a typed `#[source]` of a
/// diagnostic. Everything else, including panics, abandoned tasks, and I/O errors whose
/// type was erased by `.into_diagnostic()`, is [`FailureKind::Unexpected`].
#[must_use]
pub fn classify_io_errors_as_expected(report: &miette::Report) -> FailureKind {
    let is_io = report.downcast_ref::<RecoverableIoError>().is_some()
        || report
            .chain()
            .any(|it| it.is::<std::io::Error>() || it.is::<RecoverableIoError>());
    if is_io {
        FailureKind::Expected
    } else {
        FailureKind::Unexpected
    }
}

/// A [`FailureClassifier`] for callers that treat every failure as fatal.
#[must_use]
pub fn classify_all_as_unexpected(_report: &miette::Report) -> FailureKind {
    FailureKind::Unexpected
}
