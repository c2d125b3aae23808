// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words taskthreads

use super::LoopState;
use crate::TaskId;

/// Errors from [`CooperativeLoop`] and [`LoopHandle`].
///
/// | Variant                  | Cause                                                   |
/// | :----------------------- | :------------------------------------------------------ |
/// | [`AlreadyStarted`]       | [`start()`] called a second time                        |
/// | [`NotRunning`]           | scheduling before start or after shutdown was requested |
/// | [`TaskQueueFull`]        | bounded task queue is full                              |
/// | [`ThreadSpawn`]          | the OS refused to create the loop thread                |
/// | [`RuntimeBuild`]         | tokio runtime could not be built on the loop thread     |
/// | [`LoopThreadExited`]     | the loop thread died before it reported ready           |
/// | [`JoinFromLoopThread`]   | [`join()`] called from the loop thread itself           |
/// | [`LoopThreadPanicked`]   | the loop thread panicked                                |
///
/// [`AlreadyStarted`]: Self::AlreadyStarted
/// [`CooperativeLoop`]: super::CooperativeLoop
/// [`JoinFromLoopThread`]: Self::JoinFromLoopThread
/// [`LoopHandle`]: super::LoopHandle
/// [`LoopThreadExited`]: Self::LoopThreadExited
/// [`LoopThreadPanicked`]: Self::LoopThreadPanicked
/// [`NotRunning`]: Self::NotRunning
/// [`RuntimeBuild`]: Self::RuntimeBuild
/// [`TaskQueueFull`]: Self::TaskQueueFull
/// [`ThreadSpawn`]: Self::ThreadSpawn
/// [`join()`]: super::CooperativeLoop::join
/// [`start()`]: super::CooperativeLoop::start
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum LoopError {
    #[error("Cooperative loop was already started")]
    #[diagnostic(code(loop_bridge::cooperative_loop::already_started))]
    AlreadyStarted,

    #[error("Cooperative loop is not accepting tasks (state: {state})")]
    #[diagnostic(
        code(loop_bridge::cooperative_loop::not_running),
        help("Call start() before the host loop, and schedule before request_shutdown().")
    )]
    NotRunning { state: LoopState },

    #[error("Cooperative loop task queue is full, task {task_id} was not scheduled")]
    #[diagnostic(code(loop_bridge::cooperative_loop::task_queue_full))]
    TaskQueueFull { task_id: TaskId },

    #[error("Failed to spawn cooperative loop thread")]
    #[diagnostic(code(loop_bridge::cooperative_loop::thread_spawn))]
    #[cfg_attr(
        target_os = "linux",
        diagnostic(help(
            "The system may have reached its thread limit - \
             check `ulimit -u` for per-user limit, \
             `cat /proc/sys/kernel/threads-max` for system-wide limit"
        ))
    )]
    #[cfg_attr(
        target_os = "macos",
        diagnostic(help(
            "The system may have reached its thread limit - \
             check `ulimit -u` for per-user limit, \
             `sysctl kern.num_taskthreads` for per-process limit"
        ))
    )]
    ThreadSpawn(#[source] std::io::Error),

    #[error("Failed to build the tokio runtime for the cooperative loop")]
    #[diagnostic(code(loop_bridge::cooperative_loop::runtime_build))]
    RuntimeBuild(#[source] std::io::Error),

    #[error("Cooperative loop thread exited before it was ready")]
    #[diagnostic(code(loop_bridge::cooperative_loop::thread_exited))]
    LoopThreadExited,

    #[error("join() was called from the cooperative loop thread")]
    #[diagnostic(
        code(loop_bridge::cooperative_loop::join_from_loop_thread),
        help("The loop thread can't join itself. Use request_shutdown() from inside a task.")
    )]
    JoinFromLoopThread,

    #[error("Cooperative loop thread panicked")]
    #[diagnostic(code(loop_bridge::cooperative_loop::thread_panicked))]
    LoopThreadPanicked,
}
