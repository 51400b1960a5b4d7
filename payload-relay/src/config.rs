// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use job_engine::config::{DEFAULT_MAX_JOBS_IN_QUEUE, DEFAULT_MAX_WORKERS};
use job_engine::EngineConfig;

pub const DEFAULT_MAX_LENGTH: usize = 1048576;

/// Every option can also be set through the environment variable named in
/// its help text. A command line flag wins over the environment.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Number of executors, i.e. uploads running at the same time
    #[arg(long, env = "MAX_WORKERS", default_value_t = DEFAULT_MAX_WORKERS)]
    pub max_workers: usize,

    /// Capacity of the job queue
    #[arg(long, env = "MAX_QUEUES", default_value_t = DEFAULT_MAX_JOBS_IN_QUEUE)]
    pub max_queue: usize,

    /// Maximum accepted request body in bytes
    #[arg(long, env = "MAX_LENGTH", default_value_t = DEFAULT_MAX_LENGTH)]
    pub max_length: usize,

    /// Upper bound of jobs waiting for an idle executor outside the queue (unbounded if unset)
    #[arg(long, env = "MAX_PENDING_HANDOFFS")]
    pub max_pending_handoffs: Option<usize>,

    /// What to do with a request while the job queue is full
    #[arg(long, env = "OVERLOAD_POLICY", value_enum, default_value_t)]
    pub overload_policy: OverloadPolicy,

    /// Address the HTTP ingress listens on
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Duration of one simulated upload in milliseconds
    #[arg(long, env = "UPLOAD_DELAY_MS", default_value_t = 1000)]
    pub upload_delay_ms: u64,
}

/// Behaviour of the ingress when the job queue is full.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default)]
#[clap(rename_all = "kebab-case")]
pub enum OverloadPolicy {
    #[default]
    /// Default: hold the request until the queue has room again
    Block,
    /// Answer 503 right away
    Reject,
}

/// Settings of the HTTP ingress.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub max_length: usize,
    pub overload_policy: OverloadPolicy,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            overload_policy: OverloadPolicy::default(),
        }
    }
}

impl Args {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            max_workers: self.max_workers,
            max_queue: self.max_queue,
            max_pending_handoffs: self.max_pending_handoffs,
        }
    }

    pub fn relay_config(&self) -> RelayConfig {
        RelayConfig {
            max_length: self.max_length,
            overload_policy: self.overload_policy,
        }
    }

    pub fn upload_delay(&self) -> Duration {
        Duration::from_millis(self.upload_delay_ms)
    }
}
