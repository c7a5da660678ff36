//! Gapscan scanner service
//!
//! Wires the snapshot/news/float clients, the in-memory store, the
//! scanner engine, the session-aware refresh scheduler, and the HTTP
//! surface into one process.

use dotenvy::dotenv;
use gapscan::config::Config;
use gapscan::core::http::{start_server, AppState, HealthStatus};
use gapscan::logging;
use gapscan::metrics::Metrics;
use gapscan::pipeline::ScannerEngine;
use gapscan::scheduler::RefreshScheduler;
use gapscan::services::{HttpFloatClient, HttpNewsClient, PolygonSnapshotClient};
use gapscan::store::InMemoryMetricsStore;
use std::sync::Arc;
use std::time::Instant;
use tokio::signal;
use tokio::sync::RwLock;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging();

    // Configuration problems are the only fatal startup errors.
    let config = Config::from_env()?;
    let env = gapscan::config::get_environment();
    info!("Starting Gapscan scanner");
    info!(environment = %env, "Environment");
    info!(
        tick_secs = config.tick_interval.as_secs(),
        port = config.http_port,
        "Scanner configuration loaded"
    );

    let store = Arc::new(InMemoryMetricsStore::new());
    let snapshots = Arc::new(PolygonSnapshotClient::new(
        config.snapshot_base_url.clone(),
        config.snapshot_api_key.clone(),
    ));
    let news = Arc::new(HttpNewsClient::new(
        config.news_base_url.clone(),
        config.news_api_key.clone(),
    ));
    let floats = Arc::new(HttpFloatClient::new(config.float_base_url.clone()));
    let metrics = Arc::new(Metrics::new()?);

    let engine = Arc::new(ScannerEngine::new(
        &config,
        store,
        snapshots,
        news,
        floats,
        metrics.clone(),
    ));

    let scheduler = RefreshScheduler::new(engine.clone(), config.tick_interval);
    scheduler.start().await;

    let state = AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics,
        start_time: Arc::new(Instant::now()),
        engine,
    };
    let port = config.http_port;
    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("Scanner started, waiting for shutdown signal...");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down scanner...");
            scheduler.stop().await;
            info!("Scanner stopped");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
