// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crate::TaskId;

#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum WorkBridgeError {
    #[error("Work bridge receiver is gone, package {task_id} was not delivered")]
    #[diagnostic(
        code(loop_bridge::work_bridge::disconnected),
        help("The poll loop dropped its WorkReceiver. Stop producers before the host loop.")
    )]
    Disconnected { task_id: TaskId },
}
