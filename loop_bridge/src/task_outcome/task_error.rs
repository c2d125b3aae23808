// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::TaskId;
use std::any::Any;

/// Failures that are not produced by the task's own code. They are always classified as
/// [`FailureKind::Unexpected`].
///
/// [`FailureKind::Unexpected`]: super::FailureKind::Unexpected
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum TaskError {
    #[error("Task {task_id} panicked: {message}")]
    #[diagnostic(code(loop_bridge::task::panicked))]
    Panicked { task_id: TaskId, message: String },

    #[error("Task {task_id} ended without reporting an outcome")]
    #[diagnostic(
        code(loop_bridge::task::abandoned),
        help("The task was dropped before it finished, e.g. because its runtime went away.")
    )]
    Abandoned { task_id: TaskId },

    #[error("Failed to spawn worker thread for task {task_id}")]
    #[diagnostic(code(loop_bridge::task::worker_spawn))]
    WorkerSpawn {
        task_id: TaskId,
        #[source]
        source: std::io::Error,
    },
}

impl TaskError {
    /// Builds [`TaskError::Panicked`] from a payload caught by `catch_unwind` or carried
    /// by a tokio `JoinError`.
    #[must_use]
    pub fn from_panic(task_id: TaskId, payload: &(dyn Any + Send)) -> Self {
        Self::Panicked {
            task_id,
            message: panic_message(payload),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(it) = payload.downcast_ref::<&str>() {
        (*it).to_string()
    } else if let Some(it) = payload.downcast_ref::<String>() {
        it.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn panic_message_is_extracted_from_common_payloads() {
        let static_str: Box<dyn Any + Send> = Box::new("static");
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let other: Box<dyn Any + Send> = Box::new(42_u8);

        assert_eq!(panic_message(static_str.as_ref()), "static");
        assert_eq!(panic_message(owned.as_ref()), "owned");
        assert_eq!(panic_message(other.as_ref()), "non-string panic payload");
    }

    #[test]
    fn display_names_the_task() {
        let error = TaskError::from_panic(TaskId::new(9), &"kaboom");
        assert_eq!(error.to_string(), "Task 9 panicked: kaboom");
    }
}
