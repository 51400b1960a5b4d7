// SPDX-License-Identifier: MIT
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use job_engine::EngineError;
use log::{debug, warn};

use super::AppState;
use crate::config::OverloadPolicy;
use crate::jobs::upload_job::UploadJob;
use crate::payload::PayloadCollection;

pub async fn payload_handler(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Response {
    if method != Method::POST {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let collection: PayloadCollection = match serde_json::from_slice(&body) {
        Ok(collection) => collection,
        Err(e) => {
            debug!("Rejecting undecodable payload: {e}");
            return (
                StatusCode::BAD_REQUEST,
                [(header::CONTENT_TYPE, "application/json; charset=UTF-8")],
            )
                .into_response();
        }
    };

    let count = collection.payloads.len();
    for payload in collection.payloads {
        let job = Box::new(UploadJob::new(payload, state.sink.clone()));
        let queued = match state.config.overload_policy {
            OverloadPolicy::Block => state.queue.enqueue(job).await,
            OverloadPolicy::Reject => state.queue.try_enqueue(job),
        };
        if let Err(e) = queued {
            // jobs queued before this one still run
            warn!("Could not queue upload job: {e}");
            return overload_response(&e);
        }
    }
    debug!("Queued {count} upload jobs");

    StatusCode::OK.into_response()
}

fn overload_response(error: &EngineError) -> Response {
    match error {
        EngineError::QueueFull | EngineError::QueueClosed => {
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
