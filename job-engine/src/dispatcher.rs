// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use async_channel::{Receiver, Sender};
use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;
use log::{debug, info, warn};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::executor::{Executor, ExecutorState, JobCounters};
use crate::job::BoxedJob;
use crate::pool::ExecutorPool;
use crate::queue::{job_queue, JobQueue, JobStream};

/// Point-in-time view of the engine, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatcherStats {
    pub queued: usize,
    pub idle_executors: usize,
    pub busy_executors: usize,
    pub pending_handoffs: usize,
    pub completed: usize,
    pub failed: usize,
}

/// Routes jobs from the queue to idle executors.
#[derive(Debug)]
pub struct Dispatcher {
    config: EngineConfig,
    queue: JobQueue,
    stream: Option<JobStream>,
    pool: ExecutorPool,
    executors: Arc<Vec<Executor>>,
    counters: Arc<JobCounters>,
    pending_handoffs: Arc<AtomicUsize>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        config.validate()?;

        let (queue, stream) = job_queue(config.max_queue);
        let pool = ExecutorPool::new(config.max_workers);
        let counters = Arc::new(JobCounters::default());
        let executors = (0..config.max_workers)
            .map(|id| Executor::new(id, pool.clone(), counters.clone()))
            .collect::<Vec<_>>();

        Ok(Self {
            config,
            queue,
            stream: Some(stream),
            pool,
            executors: Arc::new(executors),
            counters,
            pending_handoffs: Arc::new(AtomicUsize::new(0)),
            thread_handle: None,
        })
    }

    /// Start the executors and the routing loop on a dedicated thread.
    /// Returns right away.
    pub fn run(&mut self) -> Result<(), EngineError> {
        if self.config.max_workers == 0 {
            // Nothing could ever take a job. Keep the stream so the queue
            // fills up and the overload policy applies.
            warn!("No executors configured, queued jobs will not be executed");
            return Ok(());
        }
        let Some(stream) = self.stream.take() else {
            warn!("Dispatcher is already running");
            return Ok(());
        };

        let pool = self.pool.clone();
        let executors = self.executors.clone();
        let pending_handoffs = self.pending_handoffs.clone();
        let handoff_limit = self.config.max_pending_handoffs.map(HandoffLimit::new);

        let thread_handle = thread::Builder::new()
            .name("job-dispatcher".into())
            .spawn(move || {
                let mut local_pool = LocalPool::new();
                let spawner = local_pool.spawner();

                for executor in executors.iter() {
                    if let Err(e) = executor.start(&spawner) {
                        warn!("Failed to start executor {}: {e}", executor.id());
                    }
                }

                let routing = routing_loop(
                    spawner.clone(),
                    stream,
                    pool,
                    executors,
                    pending_handoffs,
                    handoff_limit,
                );
                if let Err(e) = spawner.spawn_local(routing) {
                    warn!("Failed to start the routing loop: {e}");
                }
                local_pool.run(); // blocks until all tasks complete
            })?;

        info!(
            "Dispatcher started with {} executors and a queue of {} jobs",
            self.config.max_workers, self.config.max_queue
        );
        self.thread_handle = Some(thread_handle);
        Ok(())
    }

    /// Producer handle of the job queue.
    pub fn queue(&self) -> JobQueue {
        self.queue.clone()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn executors(&self) -> &[Executor] {
        &self.executors
    }

    pub fn stats(&self) -> DispatcherStats {
        let mut stats = DispatcherStats {
            queued: self.queue.len(),
            pending_handoffs: self.pending_handoffs.load(Ordering::SeqCst),
            completed: self.counters.completed.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            ..Default::default()
        };
        for executor in self.executors.iter() {
            match executor.state() {
                ExecutorState::Idle => stats.idle_executors += 1,
                ExecutorState::Busy => stats.busy_executors += 1,
                ExecutorState::Starting | ExecutorState::Stopped => {}
            }
        }
        stats
    }

    /// Stop accepting jobs. Queued jobs are still routed; afterwards every
    /// executor is stopped and the dispatcher thread ends.
    pub fn close(&mut self) {
        if self.queue.close() {
            debug!("Job queue closed, draining remaining jobs");
        }
    }

    /// Close and block until every accepted job has been executed.
    pub fn wait_until_finished(&mut self) {
        self.close();
        let Some(handle) = self.thread_handle.take() else {
            return;
        };
        if handle.join().is_err() {
            warn!("Dispatcher thread panicked");
        }
        info!("Dispatcher finished");
    }
}

/// Bounds the number of pending handoffs with a token channel.
#[derive(Clone, Debug)]
struct HandoffLimit {
    tx: Sender<()>,
    rx: Receiver<()>,
}

impl HandoffLimit {
    fn new(limit: usize) -> Self {
        let (tx, rx) = async_channel::bounded(limit);
        Self { tx, rx }
    }

    async fn acquire(&self) -> HandoffPermit {
        // both ends live in `self`, so the channel never closes
        let _ = self.tx.send(()).await;
        HandoffPermit {
            rx: self.rx.clone(),
        }
    }
}

struct HandoffPermit {
    rx: Receiver<()>,
}

impl Drop for HandoffPermit {
    fn drop(&mut self) {
        let _ = self.rx.try_recv();
    }
}

/// Pull jobs from the queue and spawn one handoff per job.
///
/// Handoffs pass a turn token along in the order the jobs were dequeued, so
/// jobs reach executors in queue order while the queue keeps draining.
async fn routing_loop(
    spawner: LocalSpawner,
    stream: JobStream,
    pool: ExecutorPool,
    executors: Arc<Vec<Executor>>,
    pending_handoffs: Arc<AtomicUsize>,
    handoff_limit: Option<HandoffLimit>,
) {
    // Every handoff holds a clone; recv fails once all of them are done.
    let (in_flight_tx, in_flight_rx) = async_channel::bounded::<()>(1);
    let mut previous_turn: Option<Receiver<()>> = None;

    loop {
        let permit = match &handoff_limit {
            Some(limit) => Some(limit.acquire().await),
            None => None,
        };
        let Some(job) = stream.dequeue().await else {
            break;
        };

        let (turn_tx, turn_rx) = async_channel::bounded::<()>(1);
        pending_handoffs.fetch_add(1, Ordering::SeqCst);
        let handoff = hand_off(
            job,
            pool.clone(),
            previous_turn.replace(turn_rx),
            turn_tx,
            pending_handoffs.clone(),
            permit,
            in_flight_tx.clone(),
        );
        if let Err(e) = spawner.spawn_local(handoff) {
            warn!("Failed to spawn handoff: {e}");
            pending_handoffs.fetch_sub(1, Ordering::SeqCst);
        }
    }

    debug!("Job queue drained, waiting for pending handoffs");
    drop(in_flight_tx);
    let _ = in_flight_rx.recv().await;

    for executor in executors.iter() {
        executor.stop();
    }
    info!("Routing loop shutting down gracefully");
}

/// Wait for an idle executor and give it the job.
async fn hand_off(
    mut job: BoxedJob,
    pool: ExecutorPool,
    previous_turn: Option<Receiver<()>>,
    turn: Sender<()>,
    pending_handoffs: Arc<AtomicUsize>,
    _permit: Option<HandoffPermit>,
    _in_flight: Sender<()>,
) {
    if let Some(previous) = previous_turn {
        // the previous handoff drops its sender once its job is placed
        let _ = previous.recv().await;
    }

    loop {
        let Some(handle) = pool.acquire().await else {
            warn!("Executor pool closed, dropping job: {}", job.desc());
            break;
        };
        match handle.hand_over(job).await {
            Ok(()) => {
                debug!("Handed job to executor {}", handle.executor_id());
                break;
            }
            Err(returned) => {
                debug!(
                    "Executor {} stopped while idle, trying the next one",
                    handle.executor_id()
                );
                job = returned;
            }
        }
    }

    drop(turn);
    pending_handoffs.fetch_sub(1, Ordering::SeqCst);
}
