// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use async_channel::{Receiver, Sender, TrySendError};

use crate::error::EngineError;
use crate::job::BoxedJob;

/// Producer side of the bounded job queue. Cheap to clone; every clone
/// feeds the same queue.
#[derive(Clone, Debug)]
pub struct JobQueue {
    tx: Sender<BoxedJob>,
}

/// Consumer side, owned by the dispatcher.
#[derive(Debug)]
pub(crate) struct JobStream {
    rx: Receiver<BoxedJob>,
}

/// Create a queue with room for `capacity` jobs. `capacity` must not be 0.
pub(crate) fn job_queue(capacity: usize) -> (JobQueue, JobStream) {
    let (tx, rx) = async_channel::bounded(capacity);
    (JobQueue { tx }, JobStream { rx })
}

impl JobQueue {
    /// Insert a job, waiting for a free slot while the queue is full.
    pub async fn enqueue(&self, job: BoxedJob) -> Result<(), EngineError> {
        self.tx
            .send(job)
            .await
            .map_err(|_| EngineError::QueueClosed)
    }

    /// Like `enqueue`, but blocks the calling thread.
    pub fn enqueue_blocking(&self, job: BoxedJob) -> Result<(), EngineError> {
        self.tx
            .send_blocking(job)
            .map_err(|_| EngineError::QueueClosed)
    }

    /// Insert a job or fail immediately with `QueueFull`.
    pub fn try_enqueue(&self, job: BoxedJob) -> Result<(), EngineError> {
        self.tx.try_send(job).map_err(|e| match e {
            TrySendError::Full(_) => EngineError::QueueFull,
            TrySendError::Closed(_) => EngineError::QueueClosed,
        })
    }

    /// Stop accepting jobs. Jobs already queued are still delivered.
    pub fn close(&self) -> bool {
        self.tx.close()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tx.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(usize::MAX)
    }
}

impl JobStream {
    /// Next job in FIFO order. `None` once the queue is closed and drained.
    pub(crate) async fn dequeue(&self) -> Option<BoxedJob> {
        self.rx.recv().await.ok()
    }
}
