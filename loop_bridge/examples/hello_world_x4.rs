// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Four producers say hello through one work bridge:
//!
//! - two cooperative tasks on the cooperative loop thread (`aio 1`, `aio 2`),
//! - two blocking workers on their own threads (`io 1`, `io 2`).
//!
//! The main thread plays the host poll loop. It drains the bridge and prints each
//! greeting through the serial logger, which also receives every `tracing` event.
//!
//! Run with `cargo run --example hello_world_x4`.

use loop_bridge::{BridgeCapacity, CooperativeLoop, DisplayPreference, IdAllocator,
                  LoopConfig, ManualPollLoop, PollIntervals, SerialLogger,
                  TaskOutcomeMonitor, TaskPoll, TracingConfig, WorkBridge, WorkBridgeDrain,
                  classify_io_errors_as_expected, fatal_error_channel,
                  setup_default_miette_global_report_handler, spawn_worker, start_draining,
                  try_initialize_logging_global, watch_completion};
use std::{cell::Cell, rc::Rc, time::Duration};
use tracing_core::LevelFilter;

const ISSUES_URL: &str = "https://github.com/r3bl-org/r3bl-open-core/issues/new";
const RUN_TIMEOUT: Duration = Duration::from_secs(30);

const PRODUCERS: [(&str, Duration); 4] = [
    ("aio 1", Duration::from_secs(2)),
    ("aio 2", Duration::from_secs(6)),
    ("io 1", Duration::from_secs(3)),
    ("io 2", Duration::from_secs(7)),
];

fn main() -> miette::Result<()> {
    setup_default_miette_global_report_handler(ISSUES_URL);

    let logger = SerialLogger::stdout().open()?;
    let log = logger.handle();
    try_initialize_logging_global(
        TracingConfig::new_display(DisplayPreference::SerialLogger(log.clone()))
            + TracingConfig::from(LevelFilter::INFO),
    )?;

    let ids = IdAllocator::new();
    let mut coop = CooperativeLoop::with_ids(LoopConfig::default(), ids.clone());
    coop.start()?;

    let poll_loop = Rc::new(ManualPollLoop::new());
    let (fatal_tx, mut fatal_rx) = fatal_error_channel();
    let (tx, rx) = WorkBridge::new::<String>(BridgeCapacity::Unbounded, ids.clone());

    let progress = {
        let log = log.clone();
        start_draining(
            Rc::clone(&poll_loop),
            WorkBridgeDrain::new(rx, move |package| {
                let text = format!(
                    "display: {} (task {}, {})",
                    package.payload(),
                    package.id(),
                    package.origin()
                );
                log.log(text).ok();
            }),
        )
    };

    let finished = Rc::new(Cell::new(0_usize));
    for (label, block) in PRODUCERS {
        let greeting = format!("Hello from {label}");
        let handle = if label.starts_with("aio") {
            coop.schedule_producer(&tx, move |ctx| async move {
                tokio::time::sleep(block).await;
                ctx.deliver(greeting).await?;
                Ok::<(), miette::Report>(())
            })?
        } else {
            spawn_worker("IO Block Thread", &ids, &tx, move |ctx| {
                std::thread::sleep(block);
                ctx.deliver_blocking(greeting)?;
                Ok(())
            })?
        };

        let monitor = TaskOutcomeMonitor::new(
            handle,
            classify_io_errors_as_expected,
            fatal_tx.clone(),
        )
        .with_label(label);
        let finished = Rc::clone(&finished);
        watch_completion(
            Rc::clone(&poll_loop),
            monitor,
            PollIntervals::default().monitor,
            move |outcome| {
                if let TaskPoll::Succeeded(()) = outcome {
                    tracing::info!("{label} finished");
                }
                finished.set(finished.get() + 1);
            },
        );
    }
    drop(tx);

    // An unexpected failure ends the run right away instead of waiting for the rest.
    let all_done = poll_loop.run_until(RUN_TIMEOUT, || {
        fatal_rx.has_errors() || (finished.get() == PRODUCERS.len() && progress.is_finished())
    });

    coop.request_shutdown();
    coop.join()?;
    fatal_rx.check()?;

    let summary = if all_done {
        format!("All {} greetings delivered.", progress.delivered())
    } else {
        format!(
            "Timed out with {} of {} greetings delivered.",
            progress.delivered(),
            PRODUCERS.len()
        )
    };
    logger.close(Some(&summary))?;

    Ok(())
}
