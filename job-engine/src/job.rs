// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::{future::Future, pin::Pin};

/// The future that performs a job. An `Err` is logged by the executor and
/// never reaches the submitter.
pub type JobTask = Pin<Box<dyn Future<Output = anyhow::Result<()>>>>;

/// A unit of work. Jobs cross from the producer thread to the dispatcher
/// thread, hence `Send`; the task they create only runs on the dispatcher
/// thread and does not need to be.
///
/// All executors share that single thread. A task must therefore await
/// instead of blocking: `std::thread::sleep` or synchronous I/O inside it
/// stalls every other executor. Blocking work belongs on its own thread,
/// with the task awaiting the result.
pub trait Job: Send + 'static {
    /// Free-form description, used for logging or debugging
    fn desc(&self) -> &str;

    /// Main entry point — creates the future that executes this job
    fn create_task(&self) -> JobTask;
}

pub type BoxedJob = Box<dyn Job>;

impl std::fmt::Debug for dyn Job {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job").field("desc", &self.desc()).finish()
    }
}
