// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>
//! # Design: Bounded Executor Pool
//!
//! ## Overview
//! Decouples job submission from job execution and bounds the number of
//! units of work that run at the same time.
//!
//! - Producers push jobs into a bounded queue (backpressure when full).
//! - The dispatcher pulls jobs one at a time and spawns a handoff per job.
//! - A handoff waits for an idle executor and passes the job into its slot.
//! - Each executor runs one job at a time and re-registers itself as idle.
//! - All concurrent units live on one dedicated thread (`LocalPool`).
//!
//! Bounded channels are the only synchronization between the parts: a job is
//! owned by exactly one of producer, queue, handoff or executor at any time.
//!
//! ```text
//!         +-----------+     +-----------+
//!         | producer  | ... | producer  |
//!         +-----+-----+     +-----+-----+
//!               |                 |
//!               v                 v
//!         +-----+-----------------+-----+
//!         |      Job queue (bounded)    |
//!         +--------------+--------------+
//!                        |
//!                        v
//!         +--------------+--------------+      +----------------------+
//!         |  Dispatcher routing loop    |----->| handoff, handoff ... |
//!         +-----------------------------+      +----------+-----------+
//!                                                         |  idle handle from
//!                                                         v  the executor pool
//!                                   +-----------+  +-----------+  +-----------+
//!                                   | executor  |  | executor  |  | executor  |
//!                                   +-----------+  +-----------+  +-----------+
//! ```

pub mod closure_job;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod executor;
pub mod job;
pub mod pool;
pub mod queue;

pub use config::EngineConfig;
pub use dispatcher::{Dispatcher, DispatcherStats};
pub use error::EngineError;
pub use executor::{Executor, ExecutorState};
pub use job::{BoxedJob, Job, JobTask};
pub use queue::JobQueue;
