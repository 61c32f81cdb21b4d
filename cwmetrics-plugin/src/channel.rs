use cwmetrics_common::Report;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::STATS_CHANNEL_CAPACITY;

/// Name of the event reports are published under.
pub const STATS_EVENT: &str = "stats";

/// In-process publish/subscribe channel for reports. Every subscriber receives
/// every report published after it subscribed; subscribers are independent.
#[derive(Clone)]
pub struct StatsChannel {
    sender: broadcast::Sender<Arc<Report>>,
}

impl StatsChannel {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn name(&self) -> &'static str {
        STATS_EVENT
    }

    /// Publish a report; returns how many subscribers it was delivered to.
    pub fn publish(&self, report: Report) -> usize {
        self.sender.send(Arc::new(report)).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Report>> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for StatsChannel {
    fn default() -> Self {
        Self::new(STATS_CHANNEL_CAPACITY)
    }
}
