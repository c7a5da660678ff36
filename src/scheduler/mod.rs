//! Tick-driven refresh loop, gated by market-session awareness.

pub mod session;

pub use session::SessionWindow;

use crate::pipeline::ScannerEngine;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// Two-state scheduler: ACTIVE inside the session window, IDLE outside.
/// The state is re-evaluated every tick; IDLE ticks neither pull
/// snapshots nor publish. Manual refreshes go straight to the engine
/// and bypass the gate.
pub struct RefreshScheduler {
    engine: Arc<ScannerEngine>,
    tick_interval: Duration,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl RefreshScheduler {
    pub fn new(engine: Arc<ScannerEngine>, tick_interval: Duration) -> Self {
        Self {
            engine,
            tick_interval,
            handle: Arc::new(RwLock::new(None)),
        }
    }

    /// Start the tick loop. The loop survives any single pass's error
    /// and simply tries again on the next tick.
    pub async fn start(&self) {
        let engine = self.engine.clone();
        let tick_interval = self.tick_interval;
        let handle_arc = self.handle.clone();

        let handle = tokio::spawn(async move {
            info!(
                interval_secs = tick_interval.as_secs(),
                "refresh scheduler started"
            );
            let mut ticker = tokio::time::interval(tick_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                if !engine.is_session_active() {
                    debug!("session idle, skipping tick");
                    continue;
                }

                if let Err(e) = engine.refresh_now().await {
                    error!(error = %e, "refresh pass failed, will retry next tick");
                }
            }
        });

        let mut slot = handle_arc.write().await;
        *slot = Some(handle);
    }

    pub async fn stop(&self) {
        let mut handle = self.handle.write().await;
        if let Some(h) = handle.take() {
            h.abort();
            info!("refresh scheduler stopped");
        }
    }

    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.is_some()
    }
}
