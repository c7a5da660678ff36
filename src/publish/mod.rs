//! Subscriber broadcast for completed refresh passes.
//!
//! Transport is an external collaborator: `publish` hands a ranked set
//! to every current subscriber through a broadcast channel; delivery
//! order across subscribers is unspecified. The most recent set is
//! cached for request/response consumers.

use crate::models::SymbolMetrics;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

pub type ReportSet = std::sync::Arc<Vec<SymbolMetrics>>;

const CHANNEL_CAPACITY: usize = 16;

pub struct Publisher {
    sender: broadcast::Sender<ReportSet>,
    last_published: RwLock<Option<ReportSet>>,
}

impl Publisher {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            last_published: RwLock::new(None),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ReportSet> {
        self.sender.subscribe()
    }

    /// Broadcast a completed set. Last-write-wins: a newer tick simply
    /// supersedes whatever subscribers have not read yet.
    pub async fn publish(&self, entries: Vec<SymbolMetrics>) {
        let set: ReportSet = std::sync::Arc::new(entries);
        *self.last_published.write().await = Some(set.clone());
        // Err only means no live subscribers, which is fine.
        let delivered = self.sender.send(set).unwrap_or(0);
        debug!(subscribers = delivered, "published ranked set");
    }

    pub async fn last_published(&self) -> Option<ReportSet> {
        self.last_published.read().await.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Publisher {
    fn default() -> Self {
        Self::new()
    }
}
