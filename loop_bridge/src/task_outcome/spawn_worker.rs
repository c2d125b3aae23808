// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{CompletionHandle, TaskContext, TaskError, completion_pair};
use crate::{IdAllocator, ThreadCensus, WorkOrigin, WorkSender};
use std::panic::{AssertUnwindSafe, catch_unwind};
use tracing::debug;

/// Runs one blocking operation on its own named OS thread.
///
/// A [`TaskId`] is allocated from `ids` before the thread starts. `work` receives a
/// [`TaskContext`] to deliver its payload, and its return value (or a panic, caught with
/// `catch_unwind`) becomes the terminal state of the returned [`CompletionHandle`]. So
/// workers and cooperative tasks share one failure path.
///
/// # Errors
///
/// [`TaskError::WorkerSpawn`] when the OS refuses to create the thread.
///
/// [`TaskId`]: crate::TaskId
pub fn spawn_worker<P, T, F>(
    name: impl Into<String>,
    ids: &IdAllocator,
    sender: &WorkSender<P>,
    work: F,
) -> Result<CompletionHandle<T>, TaskError>
where
    P: Send + 'static,
    T: Send + 'static,
    F: FnOnce(TaskContext<P>) -> miette::Result<T> + Send + 'static,
{
    let task_id = ids.next_id();
    let context = TaskContext::new(task_id, WorkOrigin::BlockingWorker, sender.clone());
    let (completion_tx, handle) = completion_pair(task_id);

    std::thread::Builder::new()
        .name(name.into())
        .spawn(move || {
            let _census = ThreadCensus::process().enter();
            debug!(%task_id, "worker started");
            let result = catch_unwind(AssertUnwindSafe(|| work(context)))
                .unwrap_or_else(|payload| {
                    Err(TaskError::from_panic(task_id, payload.as_ref()).into())
                });
            debug!(%task_id, ok = result.is_ok(), "worker finished");
            completion_tx.complete(result);
        })
        .map_err(|source| TaskError::WorkerSpawn { task_id, source })?;

    Ok(handle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BridgeCapacity, Deadline, HandleState, TaskId, WorkBridge};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn wait_for<T: std::fmt::Debug>(handle: &mut CompletionHandle<T>) -> miette::Result<T> {
        let deadline = Deadline::default();
        loop {
            match handle.try_take() {
                HandleState::Finished(result) => return result,
                HandleState::Pending if deadline.has_time_remaining() => {
                    std::thread::sleep(Duration::from_millis(1));
                }
                other => panic!("worker did not finish: {other:?}"),
            }
        }
    }

    #[test]
    fn worker_delivers_and_succeeds_on_named_thread() {
        let ids = IdAllocator::new();
        let (tx, mut rx) = WorkBridge::new::<String>(BridgeCapacity::Unbounded, ids.clone());

        let mut handle = spawn_worker("IO Block Thread", &ids, &tx, |ctx| {
            let name = std::thread::current().name().map(str::to_owned);
            ctx.deliver_blocking("Hello from worker".into())?;
            Ok(name)
        })
        .unwrap();

        assert_eq!(handle.task_id(), TaskId::new(1));
        assert_eq!(wait_for(&mut handle).unwrap().as_deref(), Some("IO Block Thread"));

        let package = rx.try_receive_item().unwrap();
        assert_eq!(package.id(), TaskId::new(1));
        assert_eq!(package.origin(), WorkOrigin::BlockingWorker);
    }

    #[test]
    fn worker_error_is_reported() {
        let ids = IdAllocator::new();
        let (tx, _rx) = WorkBridge::new::<()>(BridgeCapacity::Unbounded, ids.clone());

        let mut handle =
            spawn_worker("failing", &ids, &tx, |_ctx| -> miette::Result<()> {
                miette::bail!("Just testing an unexpected error.")
            })
            .unwrap();

        assert_eq!(
            wait_for(&mut handle).unwrap_err().to_string(),
            "Just testing an unexpected error."
        );
    }

    #[test]
    fn worker_panic_is_captured() {
        let ids = IdAllocator::new();
        let (tx, _rx) = WorkBridge::new::<()>(BridgeCapacity::Unbounded, ids.clone());

        let mut handle = spawn_worker("panicking", &ids, &tx, |_ctx| -> miette::Result<()> {
            panic!("worker blew up")
        })
        .unwrap();

        let report = wait_for(&mut handle).unwrap_err();
        assert!(matches!(
            report.downcast_ref::<TaskError>(),
            Some(TaskError::Panicked { message, .. }) if message == "worker blew up"
        ));
    }
}
