// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::Arc;

use anyhow::Context;
use job_engine::{Job, JobTask};

use crate::payload::Payload;
use crate::sink::UploadSink;

/// Uploads a single payload.
#[derive(Clone)]
pub struct UploadJob {
    payload: Payload,
    sink: Arc<dyn UploadSink>,
}

impl UploadJob {
    pub fn new(payload: Payload, sink: Arc<dyn UploadSink>) -> Self {
        Self { payload, sink }
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

impl Job for UploadJob {
    fn desc(&self) -> &str {
        "Upload payload"
    }

    fn create_task(&self) -> JobTask {
        Box::pin(self.clone().upload())
    }
}

impl UploadJob {
    async fn upload(self) -> anyhow::Result<()> {
        self.sink
            .upload(&self.payload)
            .await
            .with_context(|| format!("uploading payload {} failed", self.payload.waza))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::SimulatedUploadSink;
    use async_trait::async_trait;
    use std::time::Duration;

    struct BrokenSink;

    #[async_trait(?Send)]
    impl UploadSink for BrokenSink {
        async fn upload(&self, _payload: &Payload) -> anyhow::Result<()> {
            anyhow::bail!("connection reset")
        }
    }

    #[test]
    fn test_upload_succeeds() {
        let sink = Arc::new(SimulatedUploadSink::new(Duration::ZERO));
        let job = UploadJob::new(Payload { waza: 1 }, sink);
        assert!(async_io::block_on(job.create_task()).is_ok());
    }

    #[test]
    fn test_failure_names_the_payload() {
        let job = UploadJob::new(Payload { waza: 42 }, Arc::new(BrokenSink));
        let err = async_io::block_on(job.create_task()).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("payload 42"), "{message}");
        assert!(message.contains("connection reset"), "{message}");
    }
}
