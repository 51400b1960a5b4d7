// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Returned by `try_enqueue` when every queue slot is taken.
    #[error("job queue is full")]
    QueueFull,

    #[error("job queue is closed")]
    QueueClosed,

    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to start the dispatcher thread")]
    Thread(#[from] std::io::Error),
}
