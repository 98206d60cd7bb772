//! Topic-based event bus implementation.

use tokio::sync::broadcast;

use super::types::{Announcement, LifecycleEvent};

/// Event bus with one broadcast channel per topic.
///
/// Publishing is best-effort: a topic with no subscribers drops the event,
/// which is normal, not an error.
#[derive(Clone)]
pub struct EventBus {
    lifecycle_tx: broadcast::Sender<LifecycleEvent>,
    announcement_tx: broadcast::Sender<Announcement>,
}

impl EventBus {
    /// Creates a new event bus with default capacity for each topic.
    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Creates a new event bus with the specified capacity per topic.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lifecycle_tx: broadcast::channel(capacity).0,
            announcement_tx: broadcast::channel(capacity).0,
        }
    }

    /// Publish a lifecycle event.
    pub fn publish(&self, event: LifecycleEvent) {
        if self.lifecycle_tx.send(event).is_err() {
            tracing::trace!("no subscribers on the lifecycle topic");
        }
    }

    /// Publish a player-visible announcement.
    pub fn announce(&self, announcement: Announcement) {
        if self.announcement_tx.send(announcement).is_err() {
            tracing::trace!("no subscribers on the announcement topic");
        }
    }

    /// Subscribe to lifecycle events.
    pub fn subscribe_lifecycle(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.lifecycle_tx.subscribe()
    }

    /// Subscribe to announcements.
    pub fn subscribe_announcements(&self) -> broadcast::Receiver<Announcement> {
        self.announcement_tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
