// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words taskthreads

/// Errors from [`SerializedChannel`] and [`ChannelSender`].
///
/// | Variant                        | Cause                                             | Recoverable? |
/// | :----------------------------- | :------------------------------------------------ | :----------- |
/// | [`Closed`]                     | Send after [`shutdown()`] (programming error)     | No           |
/// | [`ShutdownFromConsumerThread`] | [`shutdown()`] called by the consumer itself      | No           |
/// | [`ConsumerPanicked`]           | The handler panicked, the consumer thread died    | No           |
/// | [`ThreadSpawn`]                | [`std::thread::Builder::spawn()`] failed          | Maybe        |
///
/// [`ChannelSender`]: super::ChannelSender
/// [`Closed`]: Self::Closed
/// [`ConsumerPanicked`]: Self::ConsumerPanicked
/// [`SerializedChannel`]: super::SerializedChannel
/// [`ShutdownFromConsumerThread`]: Self::ShutdownFromConsumerThread
/// [`ThreadSpawn`]: Self::ThreadSpawn
/// [`shutdown()`]: super::SerializedChannel::shutdown
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum ChannelError {
    #[error("Serialized channel is closed")]
    #[diagnostic(
        code(loop_bridge::serialized_channel::closed),
        help("Items can't be sent after `shutdown()`. Shut the channel down last.")
    )]
    Closed,

    #[error("shutdown() was called from the consumer thread ({thread_name})")]
    #[diagnostic(
        code(loop_bridge::serialized_channel::shutdown_from_consumer),
        help(
            "The consumer thread can't join itself. \
             Call shutdown() from any other thread."
        )
    )]
    ShutdownFromConsumerThread { thread_name: String },

    #[error("Consumer thread ({thread_name}) panicked")]
    #[diagnostic(code(loop_bridge::serialized_channel::consumer_panicked))]
    ConsumerPanicked { thread_name: String },

    #[error("Failed to spawn consumer thread")]
    #[diagnostic(code(loop_bridge::serialized_channel::thread_spawn))]
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
}
