// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use crate::error::EngineError;

pub const DEFAULT_MAX_WORKERS: usize = 500;
pub const DEFAULT_MAX_JOBS_IN_QUEUE: usize = 500;

/// Sizing of the engine. Handed to `Dispatcher::new` once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Number of executors, i.e. the upper bound of jobs running at once.
    /// Zero is allowed: jobs are accepted until the queue is full but never run.
    pub max_workers: usize,
    /// Capacity of the job queue.
    pub max_queue: usize,
    /// Upper bound of handoffs waiting for an idle executor. `None` leaves
    /// them unbounded, so the queue keeps draining while all executors are busy.
    pub max_pending_handoffs: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            max_queue: DEFAULT_MAX_JOBS_IN_QUEUE,
            max_pending_handoffs: None,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.max_queue == 0 {
            return Err(EngineError::InvalidConfig(
                "the job queue needs a capacity of at least 1".into(),
            ));
        }
        if self.max_pending_handoffs == Some(0) {
            return Err(EngineError::InvalidConfig(
                "the handoff bound must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}
