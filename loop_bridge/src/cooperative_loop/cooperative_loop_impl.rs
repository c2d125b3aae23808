// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The cooperative loop: a tokio `current_thread` runtime on its own OS thread. See
//! [`CooperativeLoop`].

use super::{BoxedTask, LoopConfig, LoopError, LoopLifecycleSignal, LoopLiveness, LoopState,
            TaskQueueReceiver, TaskQueueSender, TerminationGuard, task_queue};
use crate::{CompletionHandle, IdAllocator, TaskContext, TaskError, TaskId, ThreadCensus,
            WorkOrigin, WorkSender, completion_pair};
use std::{future::Future,
          sync::{Arc, mpsc},
          thread::JoinHandle,
          time::Duration};
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Owns the loop thread. Create one per process, [`start()`] it before the host poll
/// loop, hand [`LoopHandle`]s to whoever schedules work.
///
/// ```text
///  any thread                      Cooperative Loop Thread
///  ──────────                      ───────────────────────
///  handle.schedule(f) ──task queue──► manager task ──spawn──► task ──► CompletionSender
///  handle.request_shutdown() ──signal──► manager sees it:
///                                          Running ─► ShuttingDown
///                                          stop accepting, finish in-flight tasks
///                                          thread exits ─► Stopped (TerminationGuard)
/// ```
///
/// The manager task never blocks on a cross-thread primitive. Between checks of the
/// [`LoopLifecycleSignal`] it waits on the task queue, bounded by
/// [`LoopConfig::lifecycle_poll_interval`].
///
/// Dropping a `CooperativeLoop` that still owns its thread requests shutdown but does not
/// join.
///
/// [`start()`]: Self::start
#[allow(missing_debug_implementations)]
pub struct CooperativeLoop {
    config: LoopConfig,
    handle: LoopHandle,
    task_rx: Option<TaskQueueReceiver>,
    thread: Option<JoinHandle<()>>,
}

impl Default for CooperativeLoop {
    fn default() -> Self { Self::new(LoopConfig::default()) }
}

impl CooperativeLoop {
    #[must_use]
    pub fn new(config: LoopConfig) -> Self { Self::with_ids(config, IdAllocator::new()) }

    /// Uses `ids` for the [`TaskId`]s of scheduled tasks. Share one allocator with
    /// [`spawn_worker()`] to get one id sequence in dispatch order.
    ///
    /// [`spawn_worker()`]: crate::spawn_worker
    #[must_use]
    pub fn with_ids(config: LoopConfig, ids: IdAllocator) -> Self {
        let (task_tx, task_rx) = task_queue(config.task_queue_capacity);
        Self {
            config,
            handle: LoopHandle {
                task_tx,
                liveness: Arc::new(LoopLiveness::new()),
                signal: LoopLifecycleSignal::new(),
                ids,
            },
            task_rx: Some(task_rx),
            thread: None,
        }
    }

    /// Spawns the loop thread and returns once the loop is [`LoopState::Running`], so
    /// tasks can be scheduled right away.
    ///
    /// # Errors
    ///
    /// - [`LoopError::AlreadyStarted`] on a second call.
    /// - [`LoopError::ThreadSpawn`] / [`LoopError::RuntimeBuild`] when the thread or the
    ///   runtime can't be created.
    /// - [`LoopError::LoopThreadExited`] when the thread died before reporting ready.
    pub fn start(&mut self) -> Result<(), LoopError> {
        let task_rx = self.task_rx.take().ok_or(LoopError::AlreadyStarted)?;
        let (ready_tx, ready_rx) = mpsc::channel::<std::io::Result<()>>();

        let liveness = Arc::clone(&self.handle.liveness);
        let signal = self.handle.signal.clone();
        let interval = self.config.lifecycle_poll_interval;

        let thread = std::thread::Builder::new()
            .name(self.config.thread_name.clone())
            .spawn(move || {
                let _census = ThreadCensus::process().enter();
                let _guard = TerminationGuard::new(Arc::clone(&liveness));
                let runtime = match tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                {
                    Ok(runtime) => runtime,
                    Err(error) => {
                        ready_tx.send(Err(error)).ok();
                        return;
                    }
                };
                liveness.set(LoopState::Running);
                ready_tx.send(Ok(())).ok();
                runtime.block_on(manage_loop(task_rx, signal, &liveness, interval));
            })
            .map_err(LoopError::ThreadSpawn)?;

        let ready = ready_rx.recv();
        match ready {
            Ok(Ok(())) => {
                info!(thread_name = %self.config.thread_name, "cooperative loop started");
                self.thread = Some(thread);
                Ok(())
            }
            Ok(Err(error)) => {
                thread.join().ok();
                Err(LoopError::RuntimeBuild(error))
            }
            Err(_) => {
                thread.join().ok();
                Err(LoopError::LoopThreadExited)
            }
        }
    }

    /// A cloneable, `Send + Sync` handle for scheduling and shutdown.
    #[must_use]
    pub fn handle(&self) -> LoopHandle { self.handle.clone() }

    /// See [`LoopHandle::schedule()`].
    ///
    /// # Errors
    ///
    /// See [`LoopHandle::schedule()`].
    pub fn schedule<T, F, Fut>(&self, task: F) -> Result<CompletionHandle<T>, LoopError>
    where
        T: Send + 'static,
        F: FnOnce(TaskId) -> Fut,
        Fut: Future<Output = miette::Result<T>> + Send + 'static,
    {
        self.handle.schedule(task)
    }

    /// See [`LoopHandle::schedule_producer()`].
    ///
    /// # Errors
    ///
    /// See [`LoopHandle::schedule()`].
    pub fn schedule_producer<P, T, F, Fut>(
        &self,
        sender: &WorkSender<P>,
        task: F,
    ) -> Result<CompletionHandle<T>, LoopError>
    where
        P: Send + 'static,
        T: Send + 'static,
        F: FnOnce(TaskContext<P>) -> Fut,
        Fut: Future<Output = miette::Result<T>> + Send + 'static,
    {
        self.handle.schedule_producer(sender, task)
    }

    pub fn request_shutdown(&self) { self.handle.request_shutdown(); }

    #[must_use]
    pub fn signal(&self) -> LoopLifecycleSignal { self.handle.signal.clone() }

    #[must_use]
    pub fn state(&self) -> LoopState { self.handle.state() }

    #[must_use]
    pub fn ids(&self) -> &IdAllocator { &self.handle.ids }

    /// Blocks until the loop thread exits. Returns immediately if the loop was never
    /// started, was already joined, or was detached. Call [`request_shutdown()`] first,
    /// otherwise this waits forever.
    ///
    /// # Errors
    ///
    /// - [`LoopError::JoinFromLoopThread`] when called from a task on the loop.
    /// - [`LoopError::LoopThreadPanicked`] when the loop thread panicked.
    ///
    /// [`request_shutdown()`]: Self::request_shutdown
    pub fn join(&mut self) -> Result<(), LoopError> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        if thread.thread().id() == std::thread::current().id() {
            self.thread = Some(thread);
            return Err(LoopError::JoinFromLoopThread);
        }
        thread.join().map_err(|_| LoopError::LoopThreadPanicked)?;
        debug!("cooperative loop joined");
        Ok(())
    }

    /// [`request_shutdown()`] followed by [`join()`].
    ///
    /// # Errors
    ///
    /// See [`join()`].
    ///
    /// [`join()`]: Self::join
    /// [`request_shutdown()`]: Self::request_shutdown
    pub fn shutdown(&mut self) -> Result<(), LoopError> {
        self.request_shutdown();
        self.join()
    }

    /// Gives up ownership of the loop thread without stopping it. The loop keeps running
    /// until some [`LoopHandle`] requests shutdown.
    pub fn detach(mut self) {
        if let Some(thread) = self.thread.take() {
            debug!(thread = ?thread.thread().id(), "cooperative loop detached");
        }
    }
}

impl Drop for CooperativeLoop {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.handle.request_shutdown();
        }
    }
}

/// Cheap to clone, usable from any thread (the poll loop, workers, tasks on the loop).
#[derive(Clone)]
#[allow(missing_debug_implementations)]
pub struct LoopHandle {
    task_tx: TaskQueueSender,
    liveness: Arc<LoopLiveness>,
    signal: LoopLifecycleSignal,
    ids: IdAllocator,
}

impl LoopHandle {
    /// Dispatches a task onto the cooperative loop. Never blocks.
    ///
    /// A [`TaskId`] is allocated here, at dispatch, and passed to `task`. The returned
    /// [`CompletionHandle`] finishes when the future returns `Ok` or `Err`, or panics (as
    /// [`TaskError::Panicked`]).
    ///
    /// # Errors
    ///
    /// - [`LoopError::NotRunning`] unless the loop is [`LoopState::Running`].
    /// - [`LoopError::TaskQueueFull`] when a bounded task queue is full.
    pub fn schedule<T, F, Fut>(&self, task: F) -> Result<CompletionHandle<T>, LoopError>
    where
        T: Send + 'static,
        F: FnOnce(TaskId) -> Fut,
        Fut: Future<Output = miette::Result<T>> + Send + 'static,
    {
        let state = self.state();
        if state != LoopState::Running {
            return Err(LoopError::NotRunning { state });
        }

        let task_id = self.ids.next_id();
        let (completion_tx, handle) = completion_pair(task_id);
        let future = task(task_id);

        let wrapped: BoxedTask = Box::pin(async move {
            // Spawned separately so that a panic comes back as a JoinError.
            let result = match tokio::spawn(future).await {
                Ok(result) => result,
                Err(join_error) if join_error.is_panic() => {
                    let payload = join_error.into_panic();
                    Err(TaskError::from_panic(task_id, payload.as_ref()).into())
                }
                Err(_) => Err(TaskError::Abandoned { task_id }.into()),
            };
            completion_tx.complete(result);
        });

        self.task_tx.try_send(task_id, wrapped, LoopState::ShuttingDown)?;
        debug!(%task_id, "task scheduled on cooperative loop");
        Ok(handle)
    }

    /// [`schedule()`] for a task that delivers a payload to the poll loop. The
    /// [`TaskContext`] carries the task's id and [`WorkOrigin::CooperativeTask`].
    ///
    /// # Errors
    ///
    /// See [`schedule()`].
    ///
    /// [`schedule()`]: Self::schedule
    pub fn schedule_producer<P, T, F, Fut>(
        &self,
        sender: &WorkSender<P>,
        task: F,
    ) -> Result<CompletionHandle<T>, LoopError>
    where
        P: Send + 'static,
        T: Send + 'static,
        F: FnOnce(TaskContext<P>) -> Fut,
        Fut: Future<Output = miette::Result<T>> + Send + 'static,
    {
        let sender = sender.clone();
        self.schedule(move |task_id| {
            task(TaskContext::new(task_id, WorkOrigin::CooperativeTask, sender))
        })
    }

    /// Sets the [`LoopLifecycleSignal`]. Idempotent, never blocks.
    pub fn request_shutdown(&self) {
        if !self.signal.is_set() {
            debug!(state = %self.state(), "cooperative loop shutdown requested");
        }
        self.signal.set();
    }

    #[must_use]
    pub fn state(&self) -> LoopState { self.liveness.get() }

    #[must_use]
    pub fn signal(&self) -> LoopLifecycleSignal { self.signal.clone() }

    #[must_use]
    pub fn ids(&self) -> &IdAllocator { &self.ids }
}

/// The manager task. Runs until the signal is set, then drains.
async fn manage_loop(
    mut task_rx: TaskQueueReceiver,
    signal: LoopLifecycleSignal,
    liveness: &LoopLiveness,
    interval: Duration,
) {
    let mut in_flight = JoinSet::new();

    while !signal.is_set() {
        tokio::select! {
            maybe_task = task_rx.recv() => match maybe_task {
                Some(task) => {
                    in_flight.spawn(task);
                }
                None => pause(interval).await,
            },
            () = pause(interval) => {}
        }
        while in_flight.try_join_next().is_some() {}
    }

    liveness.set(LoopState::ShuttingDown);
    task_rx.close();
    while let Some(task) = task_rx.try_recv() {
        in_flight.spawn(task);
    }
    info!(in_flight = in_flight.len(), "cooperative loop shutting down");
    while in_flight.join_next().await.is_some() {}
}

async fn pause(interval: Duration) {
    if interval.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BridgeCapacity, Deadline, HandleState, LogLine, WorkBridge};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn wait_for<T: std::fmt::Debug>(handle: &mut CompletionHandle<T>) -> miette::Result<T> {
        let deadline = Deadline::default();
        loop {
            match handle.try_take() {
                HandleState::Finished(result) => return result,
                HandleState::Pending if deadline.has_time_remaining() => {
                    std::thread::sleep(Duration::from_millis(1));
                }
                other => panic!("task did not finish: {other:?}"),
            }
        }
    }

    fn started() -> CooperativeLoop {
        let mut coop = CooperativeLoop::default();
        coop.start().unwrap();
        coop
    }

    #[test]
    fn lifecycle_runs_through_every_state() {
        let mut coop = CooperativeLoop::default();
        assert_eq!(coop.state(), LoopState::NotStarted);

        coop.start().unwrap();
        assert_eq!(coop.state(), LoopState::Running);

        coop.shutdown().unwrap();
        assert_eq!(coop.state(), LoopState::Stopped);
        assert!(coop.signal().is_set());
    }

    #[test]
    fn start_twice_is_an_error() {
        let mut coop = started();
        assert!(matches!(coop.start(), Err(LoopError::AlreadyStarted)));
        coop.shutdown().unwrap();
    }

    #[test]
    fn schedule_before_start_and_after_shutdown_is_rejected() {
        let mut coop = CooperativeLoop::default();
        assert!(matches!(
            coop.schedule(|_| async { Ok(()) }),
            Err(LoopError::NotRunning {
                state: LoopState::NotStarted
            })
        ));

        coop.start().unwrap();
        coop.shutdown().unwrap();
        assert!(matches!(
            coop.schedule(|_| async { Ok(()) }),
            Err(LoopError::NotRunning { .. })
        ));
    }

    #[test]
    fn task_runs_on_the_named_loop_thread_inside_the_runtime() {
        let mut coop = started();

        let mut handle = coop
            .schedule(|task_id| async move {
                let line = LogLine::new("from a task");
                Ok((
                    task_id,
                    std::thread::current().name().map(str::to_owned),
                    line.in_cooperative_loop(),
                ))
            })
            .unwrap();

        let (task_id, thread_name, in_loop) = wait_for(&mut handle).unwrap();
        assert_eq!(task_id, TaskId::new(1));
        assert_eq!(thread_name.as_deref(), Some("Cooperative Loop Thread"));
        assert!(in_loop);
        coop.shutdown().unwrap();
    }

    #[test]
    fn task_error_and_panic_reach_the_handle() {
        let mut coop = started();

        let mut failing = coop
            .schedule(|_| async { Err::<(), _>(miette::miette!("aio failure")) })
            .unwrap();
        let mut panicking = coop
            .schedule(|task_id| async move {
                if task_id.as_u64() > 0 {
                    panic!("aio panic");
                }
                Ok(())
            })
            .unwrap();

        assert_eq!(wait_for(&mut failing).unwrap_err().to_string(), "aio failure");
        let report = wait_for(&mut panicking).unwrap_err();
        assert!(matches!(
            report.downcast_ref::<TaskError>(),
            Some(TaskError::Panicked { message, .. }) if message == "aio panic"
        ));

        // A panicking task does not take the loop down.
        assert_eq!(coop.state(), LoopState::Running);
        coop.shutdown().unwrap();
    }

    #[test]
    fn in_flight_tasks_finish_during_shutdown() {
        let mut coop = started();
        let finished = Arc::new(AtomicBool::new(false));

        let mut handle = {
            let finished = Arc::clone(&finished);
            coop.schedule(move |_| async move {
                tokio::time::sleep(Duration::from_millis(100)).await;
                finished.store(true, Ordering::SeqCst);
                Ok(())
            })
            .unwrap()
        };
        std::thread::sleep(Duration::from_millis(20));
        coop.shutdown().unwrap();

        assert!(finished.load(Ordering::SeqCst));
        assert!(wait_for(&mut handle).is_ok());
    }

    #[test]
    fn producer_delivers_with_its_task_id() {
        let mut coop = started();
        let (tx, mut rx) = WorkBridge::new::<String>(BridgeCapacity::Unbounded, coop.ids().clone());

        let mut handle = coop
            .schedule_producer(&tx, |ctx| async move {
                ctx.deliver("Hello from the loop".to_string()).await?;
                Ok(())
            })
            .unwrap();
        wait_for(&mut handle).unwrap();
        coop.shutdown().unwrap();

        let package = rx.try_receive_item().unwrap();
        assert_eq!(package.id(), handle.task_id());
        assert_eq!(package.origin(), WorkOrigin::CooperativeTask);
    }

    #[test]
    fn zero_poll_interval_still_shuts_down() {
        let mut coop = CooperativeLoop::new(
            LoopConfig::default()
                .with_thread_name("Busy Loop")
                .with_lifecycle_poll_interval(Duration::ZERO),
        );
        coop.start().unwrap();
        let mut handle = coop.schedule(|_| async { Ok(1) }).unwrap();
        assert_eq!(wait_for(&mut handle).unwrap(), 1);
        coop.shutdown().unwrap();
    }

    #[test]
    fn handle_from_another_thread_can_stop_the_loop() {
        let mut coop = started();
        let handle = coop.handle();
        std::thread::spawn(move || handle.request_shutdown())
            .join()
            .unwrap();
        coop.join().unwrap();
        assert_eq!(coop.state(), LoopState::Stopped);
    }

    #[test]
    fn drop_requests_shutdown() {
        let coop = started();
        let handle = coop.handle();
        drop(coop);

        assert!(handle.signal().is_set());
        let deadline = Deadline::default();
        assert!(deadline.wait_until(Duration::from_millis(1), || {
            handle.state() == LoopState::Stopped
        }));
    }

    #[test]
    fn detach_keeps_the_loop_running() {
        let coop = started();
        let handle = coop.handle();
        coop.detach();

        assert!(!handle.signal().is_set());
        assert_eq!(handle.state(), LoopState::Running);
        handle.request_shutdown();
    }

    #[test]
    fn join_without_start_is_a_no_op() {
        let mut coop = CooperativeLoop::default();
        coop.join().unwrap();
    }
}
