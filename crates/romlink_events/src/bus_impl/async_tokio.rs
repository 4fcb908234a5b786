//! Tokio-based async event bus implementation
//!
//! This module provides the primary EventBus implementation using Tokio's
//! broadcast channel for fan-out distribution to multiple subscribers.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};
use tokio::sync::broadcast;

use crate::bus::{async_trait, BusStats, EventBus, EventFilter, Subscription};
use crate::event::{Event, EventWithMetadata, Kv, Severity};

/// Tokio-based event bus implementation
pub struct TokioEventBus {
    /// Broadcast sender for fan-out to subscribers
    sender: broadcast::Sender<Arc<EventWithMetadata>>,
    /// Channel capacity
    capacity: usize,
    /// Statistics tracking
    stats: TokioEventBusStats,
}

/// Statistics for the Tokio event bus
struct TokioEventBusStats {
    events_published: AtomicU64,
    events_dropped: AtomicU64,
}

impl TokioEventBus {
    /// Create a new Tokio event bus with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);

        Self {
            sender,
            capacity,
            stats: TokioEventBusStats {
                events_published: AtomicU64::new(0),
                events_dropped: AtomicU64::new(0),
            },
        }
    }

    /// Create a new event bus with default capacity (1024)
    pub fn with_default_capacity() -> Self {
        Self::new(1024)
    }

    /// Get the current capacity of the broadcast channel
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of active receivers
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }

    fn send(&self, event_with_metadata: Arc<EventWithMetadata>) {
        // A send error only means there are no receivers, which is fine
        let _ = self.sender.send(event_with_metadata);
        self.stats.events_published.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl EventBus for TokioEventBus {
    async fn publish(&self, event: Event) {
        let severity = event.default_severity();
        self.publish_with_metadata(event, severity, None).await;
    }

    async fn publish_with_metadata(&self, event: Event, severity: Severity, context: Option<Kv>) {
        self.send(Arc::new(EventWithMetadata::new(event, severity, context)));
    }

    fn publish_sync(&self, event: Event) {
        // broadcast::Sender::send is synchronous, so no runtime is required
        let severity = event.default_severity();
        self.send(Arc::new(EventWithMetadata::new(event, severity, None)));
    }

    fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        Subscription::new(receiver, filter)
    }

    fn stats(&self) -> Option<BusStats> {
        Some(BusStats {
            events_published: self.stats.events_published.load(Ordering::Relaxed),
            active_subscriptions: self.receiver_count(),
            channel_capacity: self.capacity(),
            events_dropped: self.stats.events_dropped.load(Ordering::Relaxed),
        })
    }
}

impl Clone for TokioEventBus {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            capacity: self.capacity,
            stats: TokioEventBusStats {
                events_published: AtomicU64::new(0), // New instance gets fresh stats
                events_dropped: AtomicU64::new(0),
            },
        }
    }
}

/// Spawn a task that drains a subscription into a handler closure
pub fn spawn_subscriber_task<F>(
    mut subscription: Subscription,
    handler: F,
) -> tokio::task::JoinHandle<()>
where
    F: Fn(Arc<EventWithMetadata>) + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match subscription.recv().await {
                Ok(event) => handler(event),
                Err(broadcast::error::RecvError::Closed) => break,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
            }
        }
    })
}
