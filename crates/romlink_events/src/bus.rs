//! Event bus traits and filtering
//!
//! This module defines the core abstractions for the async event system:
//! EventBus for publishing and subscribing, EventFilter for selective
//! subscriptions, and related types for managing event flow.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::event::{Event, EventWithMetadata, Severity};

/// Type alias for event predicate functions to reduce complexity
pub type EventPredicate = Arc<dyn Fn(&EventWithMetadata) -> bool + Send + Sync>;

/// Trait for event bus implementations
#[async_trait::async_trait]
pub trait EventBus: Send + Sync {
    /// Publish an event to all subscribers
    async fn publish(&self, event: Event);

    /// Publish an event with explicit severity and context
    async fn publish_with_metadata(
        &self,
        event: Event,
        severity: Severity,
        context: Option<crate::event::Kv>,
    );

    /// Publish an event from a synchronous context.
    ///
    /// Must not require a running async runtime; worker threads use this.
    fn publish_sync(&self, event: Event);

    /// Subscribe to events with a filter
    fn subscribe(&self, filter: EventFilter) -> Subscription;

    /// Get bus statistics (optional)
    fn stats(&self) -> Option<BusStats> {
        None
    }
}

/// Event filter for selective subscriptions
#[derive(Clone)]
pub struct EventFilter {
    /// Minimum severity level to receive
    pub min_severity: Severity,
    /// Allowed domains (None means all domains)
    pub domains: Option<Vec<String>>,
    /// Custom predicate function
    pub predicate: Option<EventPredicate>,
}

impl std::fmt::Debug for EventFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventFilter")
            .field("min_severity", &self.min_severity)
            .field("domains", &self.domains)
            .field("predicate", &self.predicate.as_ref().map(|_| "<predicate>"))
            .finish()
    }
}

impl EventFilter {
    /// Create a new filter with minimum severity
    pub fn new() -> Self {
        Self {
            min_severity: Severity::Info,
            domains: None,
            predicate: None,
        }
    }

    /// Set minimum severity level
    pub fn min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    /// Set allowed domains
    pub fn domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains = Some(domains.into_iter().map(|s| s.into()).collect());
        self
    }

    /// Add a custom predicate
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&EventWithMetadata) -> bool + Send + Sync + 'static,
    {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Check if an event passes this filter
    pub fn matches(&self, event: &EventWithMetadata) -> bool {
        if !event.metadata.severity.should_show(self.min_severity) {
            return false;
        }

        if let Some(ref allowed_domains) = self.domains {
            if !allowed_domains.contains(&event.event.domain().to_string()) {
                return false;
            }
        }

        if let Some(ref predicate) = self.predicate {
            if !predicate(event) {
                return false;
            }
        }

        true
    }
}

impl Default for EventFilter {
    fn default() -> Self {
        Self::new()
    }
}

/// Event subscription handle
pub struct Subscription {
    /// Receiver for events
    pub receiver: broadcast::Receiver<Arc<EventWithMetadata>>,
    /// Filter used for this subscription
    pub filter: EventFilter,
}

impl Subscription {
    /// Create a new subscription
    pub fn new(receiver: broadcast::Receiver<Arc<EventWithMetadata>>, filter: EventFilter) -> Self {
        Self { receiver, filter }
    }

    /// Receive the next event that matches the filter
    pub async fn recv(&mut self) -> Result<Arc<EventWithMetadata>, broadcast::error::RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.filter.matches(&event) {
                return Ok(event);
            }
        }
    }

    /// Try to receive the next matching event without blocking
    pub fn try_recv(&mut self) -> Result<Arc<EventWithMetadata>, broadcast::error::TryRecvError> {
        loop {
            let event = self.receiver.try_recv()?;
            if self.filter.matches(&event) {
                return Ok(event);
            }
        }
    }
}

/// Bus statistics for monitoring
#[derive(Debug, Clone)]
pub struct BusStats {
    /// Total events published
    pub events_published: u64,
    /// Active subscriptions
    pub active_subscriptions: usize,
    /// Current channel capacity
    pub channel_capacity: usize,
    /// Events dropped due to full channels
    pub events_dropped: u64,
}

/// Global event bus accessor using OnceCell
use once_cell::sync::OnceCell;

static GLOBAL_BUS: OnceCell<Arc<dyn EventBus>> = OnceCell::new();

/// Initialize the global event bus (should be called once by the host)
pub fn init_global_bus(bus: Arc<dyn EventBus>) -> Result<(), Arc<dyn EventBus>> {
    GLOBAL_BUS.set(bus)
}

/// Get the global event bus (panics if not initialized)
pub fn get_global_bus() -> Arc<dyn EventBus> {
    GLOBAL_BUS
        .get()
        .expect("Global event bus not initialized. Call init_global_bus() first.")
        .clone()
}

/// Try to get the global event bus (returns None if not initialized)
pub fn try_get_global_bus() -> Option<Arc<dyn EventBus>> {
    GLOBAL_BUS.get().cloned()
}

// Re-export async_trait for implementations
pub use async_trait::async_trait;
