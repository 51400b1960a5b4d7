// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_io::Timer;
use async_trait::async_trait;
use job_engine::{Job, JobTask};
use payload_relay::payload::Payload;
use payload_relay::sink::UploadSink;

/// When a recorded job ran, relative to the recorder's creation.
#[derive(Debug, Clone, Copy)]
pub struct Span {
    pub index: usize,
    pub started: Duration,
    pub finished: Duration,
}

/// Collects the execution spans of `RecordingJob`s.
#[derive(Debug, Clone)]
pub struct Recorder {
    origin: Instant,
    spans: Arc<Mutex<Vec<Span>>>,
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

impl Recorder {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            spans: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    pub fn job(&self, index: usize, duration: Duration) -> Box<RecordingJob> {
        Box::new(RecordingJob {
            desc: format!("recorded job {index}"),
            index,
            duration,
            recorder: self.clone(),
        })
    }

    /// Spans in order of completion.
    pub fn spans(&self) -> Vec<Span> {
        self.spans.lock().unwrap().clone()
    }

    pub fn span(&self, index: usize) -> Option<Span> {
        self.spans().into_iter().find(|span| span.index == index)
    }
}

/// A job that sleeps for `duration` and records when it ran.
pub struct RecordingJob {
    desc: String,
    index: usize,
    duration: Duration,
    recorder: Recorder,
}

impl Job for RecordingJob {
    fn desc(&self) -> &str {
        &self.desc
    }

    fn create_task(&self) -> JobTask {
        let index = self.index;
        let duration = self.duration;
        let recorder = self.recorder.clone();
        Box::pin(async move {
            let started = recorder.elapsed();
            Timer::after(duration).await;
            let finished = recorder.elapsed();
            recorder.spans.lock().unwrap().push(Span {
                index,
                started,
                finished,
            });
            Ok(())
        })
    }
}

/// Upload sink that remembers every payload it received.
#[derive(Debug, Default)]
pub struct RecordingSink {
    uploaded: Mutex<Vec<Payload>>,
}

impl RecordingSink {
    pub fn uploaded(&self) -> Vec<Payload> {
        self.uploaded.lock().unwrap().clone()
    }
}

#[async_trait(?Send)]
impl UploadSink for RecordingSink {
    async fn upload(&self, payload: &Payload) -> anyhow::Result<()> {
        self.uploaded.lock().unwrap().push(payload.clone());
        Ok(())
    }
}
