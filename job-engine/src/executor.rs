// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;

use async_channel::{Receiver, Sender};
use futures::executor::LocalSpawner;
use futures::task::{LocalSpawnExt, SpawnError};
use futures::FutureExt;
use log::{debug, warn};

use crate::job::BoxedJob;
use crate::pool::{ExecutorHandle, ExecutorPool};

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    /// Created, but the run loop has not registered it in the pool yet.
    Starting,
    /// Registered in the pool, waiting for a job or the stop signal.
    Idle,
    Busy,
    /// Terminal. The executor does not register again.
    Stopped,
}

impl ExecutorState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ExecutorState::Starting,
            1 => ExecutorState::Idle,
            2 => ExecutorState::Busy,
            _ => ExecutorState::Stopped,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            ExecutorState::Starting => 0,
            ExecutorState::Idle => 1,
            ExecutorState::Busy => 2,
            ExecutorState::Stopped => 3,
        }
    }
}

/// Outcome counters shared by all executors of a dispatcher.
#[derive(Debug, Default)]
pub(crate) struct JobCounters {
    pub(crate) completed: AtomicUsize,
    pub(crate) failed: AtomicUsize,
}

/// A long-lived worker that executes one job at a time.
///
/// The struct is the control side; the run loop itself is spawned by
/// `start` and only shares channels and the state cell with it.
#[derive(Debug)]
pub struct Executor {
    id: usize,
    pool: ExecutorPool,
    slot_tx: Sender<BoxedJob>,
    slot_rx: Receiver<BoxedJob>,
    quit_tx: Sender<()>,
    quit_rx: Receiver<()>,
    state: Arc<AtomicU8>,
    started: AtomicBool,
    counters: Arc<JobCounters>,
}

impl Executor {
    pub(crate) fn new(id: usize, pool: ExecutorPool, counters: Arc<JobCounters>) -> Self {
        let (slot_tx, slot_rx) = async_channel::bounded(1);
        let (quit_tx, quit_rx) = async_channel::bounded(1);
        Self {
            id,
            pool,
            slot_tx,
            slot_rx,
            quit_tx,
            quit_rx,
            state: Arc::new(AtomicU8::new(ExecutorState::Starting.as_u8())),
            started: AtomicBool::new(false),
            counters,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn state(&self) -> ExecutorState {
        ExecutorState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Spawn the run loop. Only the first call has an effect.
    pub fn start(&self, spawner: &LocalSpawner) -> Result<(), SpawnError> {
        if self.started.swap(true, Ordering::SeqCst) {
            warn!("Executor {} has already been started", self.id);
            return Ok(());
        }
        spawner.spawn_local(executor_loop(
            self.id,
            self.pool.clone(),
            self.slot_tx.clone(),
            self.slot_rx.clone(),
            self.quit_rx.clone(),
            self.state.clone(),
            self.counters.clone(),
        ))
    }

    /// Ask the executor to stop. Never blocks; a running job is not
    /// interrupted, the signal is picked up the next time the executor is idle.
    pub fn stop(&self) {
        // a full channel means a stop signal is already pending
        let _ = self.quit_tx.try_send(());
    }
}

async fn executor_loop(
    id: usize,
    pool: ExecutorPool,
    slot_tx: Sender<BoxedJob>,
    slot_rx: Receiver<BoxedJob>,
    quit_rx: Receiver<()>,
    state: Arc<AtomicU8>,
    counters: Arc<JobCounters>,
) {
    debug!("Starting executor {id}");
    loop {
        pool.register(ExecutorHandle::new(id, slot_tx.clone())).await;
        state.store(ExecutorState::Idle.as_u8(), Ordering::SeqCst);

        // A job that has already been handed over wins against the stop signal.
        let job = futures::select_biased! {
            job = slot_rx.recv().fuse() => job.ok(),
            _ = quit_rx.recv().fuse() => None,
        };

        match job {
            Some(job) => {
                state.store(ExecutorState::Busy.as_u8(), Ordering::SeqCst);
                execute(id, job, &counters).await;
            }
            None => break,
        }
    }

    // The pool may still hold our handle. Closing the slot makes later
    // handoffs fail so they pick another executor; a job that slipped in
    // before the close is still executed.
    slot_rx.close();
    while let Ok(job) = slot_rx.try_recv() {
        state.store(ExecutorState::Busy.as_u8(), Ordering::SeqCst);
        execute(id, job, &counters).await;
    }
    state.store(ExecutorState::Stopped.as_u8(), Ordering::SeqCst);
    debug!("Executor {id} stopped");
}

async fn execute(id: usize, job: BoxedJob, counters: &JobCounters) {
    debug!("Executor {id} executing job: {}", job.desc());
    let outcome = AssertUnwindSafe(async { job.create_task().await })
        .catch_unwind()
        .await;
    match outcome {
        Ok(Ok(())) => {
            counters.completed.fetch_add(1, Ordering::SeqCst);
            debug!("Executor {id} finished job: {}", job.desc());
        }
        Ok(Err(err)) => {
            counters.failed.fetch_add(1, Ordering::SeqCst);
            warn!("Job '{}' failed: {err:#}", job.desc());
        }
        Err(_) => {
            counters.failed.fetch_add(1, Ordering::SeqCst);
            warn!("Job '{}' panicked", job.desc());
        }
    }
}
