// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

//! HTTP ingress. Decodes payload collections and queues one upload job per
//! payload; the response never waits for the uploads themselves.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::any;
use axum::Router;
use job_engine::JobQueue;

use crate::config::RelayConfig;
use crate::sink::UploadSink;

pub mod handler;

#[derive(Clone)]
pub struct AppState {
    pub queue: JobQueue,
    pub sink: Arc<dyn UploadSink>,
    pub config: Arc<RelayConfig>,
}

impl AppState {
    pub fn new(queue: JobQueue, sink: Arc<dyn UploadSink>, config: RelayConfig) -> Self {
        Self {
            queue,
            sink,
            config: Arc::new(config),
        }
    }
}

/// Every path is accepted, only POST is allowed.
pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_length;
    Router::new()
        .route("/", any(handler::payload_handler))
        .fallback(handler::payload_handler)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
