// SPDX-License-Identifier: MIT
// payload-relay: accepts bursts of payloads over HTTP and uploads them
//
// - Every payload of a request becomes one job in a bounded queue.
// - A fixed number of executors performs the uploads.
//
// Author: Johannes Leupolz <dev@leupolz.eu>

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use job_engine::Dispatcher;
use log::{info, warn};

use payload_relay::config::Args;
use payload_relay::ingress::{self, AppState};
use payload_relay::sink::SimulatedUploadSink;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut dispatcher =
        Dispatcher::new(args.engine_config()).context("invalid engine configuration")?;
    dispatcher.run().context("failed to start the dispatcher")?;

    let sink = Arc::new(SimulatedUploadSink::new(args.upload_delay()));
    let state = AppState::new(dispatcher.queue(), sink, args.relay_config());
    let app = ingress::router(state);

    let listener = tokio::net::TcpListener::bind(args.listen)
        .await
        .with_context(|| format!("failed to bind {}", args.listen))?;
    info!("Listening on {}", args.listen);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Stopping payload-relay, waiting for queued jobs");
    tokio::task::spawn_blocking(move || dispatcher.wait_until_finished())
        .await
        .context("failed to wait for the dispatcher")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        // without a signal handler, run until the process is killed
        std::future::pending::<()>().await;
    }
}
