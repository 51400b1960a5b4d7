// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use async_channel::{Receiver, Sender};
use log::debug;

use crate::job::BoxedJob;

/// Handle to the inbound slot of one idle executor.
#[derive(Clone, Debug)]
pub struct ExecutorHandle {
    executor_id: usize,
    slot: Sender<BoxedJob>,
}

impl ExecutorHandle {
    pub(crate) fn new(executor_id: usize, slot: Sender<BoxedJob>) -> Self {
        Self { executor_id, slot }
    }

    pub fn executor_id(&self) -> usize {
        self.executor_id
    }

    /// Pass the job to the executor. The job comes back if the executor
    /// stopped after registering this handle.
    pub(crate) async fn hand_over(&self, job: BoxedJob) -> Result<(), BoxedJob> {
        self.slot.send(job).await.map_err(|e| e.into_inner())
    }
}

/// Registry of idle executors: a bounded FIFO of their handles. The handle
/// that has been idle longest is selected first.
#[derive(Clone, Debug)]
pub struct ExecutorPool {
    tx: Sender<ExecutorHandle>,
    rx: Receiver<ExecutorHandle>,
}

impl ExecutorPool {
    pub fn new(capacity: usize) -> Self {
        // a pool without executors still needs a valid channel
        let (tx, rx) = async_channel::bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Mark an executor as idle.
    pub async fn register(&self, handle: ExecutorHandle) {
        let executor_id = handle.executor_id;
        if self.tx.send(handle).await.is_err() {
            debug!("Executor pool closed, executor {executor_id} not registered");
        }
    }

    /// Take the longest idle executor, waiting until one registers.
    pub async fn acquire(&self) -> Option<ExecutorHandle> {
        self.rx.recv().await.ok()
    }

    /// Number of registered handles. Includes handles of executors that
    /// stopped while idle until a handoff discards them.
    pub fn idle_count(&self) -> usize {
        self.rx.len()
    }
}
