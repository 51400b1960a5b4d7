// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::time::Duration;

use async_io::Timer;
use async_trait::async_trait;
use log::info;

use crate::payload::Payload;

/// Downstream resource every upload job writes to.
///
/// Uploads run on the dispatcher thread, so the returned future does not
/// have to be `Send`; the sink itself is shared across threads.
#[async_trait(?Send)]
pub trait UploadSink: Send + Sync + 'static {
    async fn upload(&self, payload: &Payload) -> anyhow::Result<()>;
}

/// Stand-in for an object store: logs and waits for a fixed time.
#[derive(Debug, Clone)]
pub struct SimulatedUploadSink {
    delay: Duration,
}

impl SimulatedUploadSink {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait(?Send)]
impl UploadSink for SimulatedUploadSink {
    async fn upload(&self, payload: &Payload) -> anyhow::Result<()> {
        info!("Heavy work now: uploading payload {}", payload.waza);
        Timer::after(self.delay).await;
        Ok(())
    }
}
