//! # romlink_events - Async Event and Error Hub
//!
//! This crate provides a unified, async-first event and error system for the
//! romlink toolkit:
//!
//! - Centralized error taxonomy and Result aliasing
//! - Domain event types across all crates
//! - Async EventBus abstraction built on Tokio
//! - Subscription and filtering layers for host-side rendering
//!
//! ## Design Principles
//!
//! - **Tokio-Only**: Single async runtime simplifies the entire stack
//! - **Domain-Oriented**: Strongly-typed events with optional ad-hoc KV context
//! - **Sync-Friendly**: `publish_sync` lets worker threads emit without a runtime
//! - **Ergonomic**: Consumers receive Arc<dyn EventBus>; global accessor available

pub mod bus;
pub mod bus_impl;
pub mod error;
pub mod event;
pub mod macros;

// Re-export commonly used types
pub use bus::{EventBus, EventFilter, Subscription};
pub use bus_impl::TokioEventBus;
pub use error::{ContextExt, Error, Result};
pub use event::{Event, Severity};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::bus::{EventBus, EventFilter, Subscription};
    pub use crate::error::{ContextExt, Error, Result};
    pub use crate::event::{Event, Severity};
    pub use crate::{context, emit, emit_global, emit_global_sync, emit_info, emit_progress, emit_warning};
}
