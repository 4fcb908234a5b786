//! Macros for ergonomic event publishing
//!
//! This module provides macros to make event publishing more convenient,
//! including both explicit bus passing and global bus access.

/// Emit an event to the specified event bus
///
/// ```rust
/// use romlink_events::prelude::*;
/// use romlink_events::event::{CoreEvent, Event};
/// use std::sync::Arc;
///
/// # async fn example() {
/// let bus: Arc<dyn EventBus> = todo!();
/// let message = "Operation started".to_string();
///
/// emit!(bus, Event::Core(CoreEvent::Info { message }));
/// # }
/// ```
#[macro_export]
macro_rules! emit {
    // Basic usage: emit!(bus, event)
    ($bus:expr, $event:expr) => {
        $bus.publish($event).await
    };

    // With custom severity: emit!(bus, event, severity)
    ($bus:expr, $event:expr, $severity:expr) => {
        $bus.publish_with_metadata($event, $severity, None).await
    };

    // With custom severity and context: emit!(bus, event, severity, context)
    ($bus:expr, $event:expr, $severity:expr, $context:expr) => {
        $bus.publish_with_metadata($event, $severity, $context)
            .await
    };
}

/// Emit an event to the global event bus
///
/// This requires the global bus to be initialized first via
/// `init_global_bus()`.
///
/// # Panics
///
/// Panics if the global event bus has not been initialized.
#[macro_export]
macro_rules! emit_global {
    // Basic usage: emit_global!(event)
    ($event:expr) => {
        $crate::bus::get_global_bus().publish($event).await
    };

    // With custom severity: emit_global!(event, severity)
    ($event:expr, $severity:expr) => {
        $crate::bus::get_global_bus()
            .publish_with_metadata($event, $severity, None)
            .await
    };
}

/// Emit an event to the global bus from synchronous code
///
/// Uses `EventBus::publish_sync`, so no async runtime is required; safe to
/// call from worker threads. Does nothing when the global bus is not
/// initialized.
#[macro_export]
macro_rules! emit_global_sync {
    ($event:expr) => {
        if let Some(bus) = $crate::bus::try_get_global_bus() {
            bus.publish_sync($event);
        }
    };
}

/// Create a context HashMap for events
///
/// ```rust
/// use romlink_events::context;
///
/// let ctx = context! {
///     "operation" => "analyze",
///     "asset_count" => "1024"
/// };
/// ```
#[macro_export]
macro_rules! context {
    // Empty context
    {} => {
        None
    };

    // Context with key-value pairs
    { $($key:expr => $value:expr),+ $(,)? } => {
        {
            let mut ctx = std::collections::HashMap::new();
            $(
                ctx.insert($key.to_string(), $value.to_string());
            )+
            Some(ctx)
        }
    };
}

/// Convenience macro for emitting Core info events
#[macro_export]
macro_rules! emit_info {
    ($bus:expr, $message:expr) => {
        $crate::emit!(
            $bus,
            $crate::event::Event::Core($crate::event::CoreEvent::Info {
                message: $message.to_string(),
            })
        )
    };
}

/// Convenience macro for emitting Core warning events
#[macro_export]
macro_rules! emit_warning {
    ($bus:expr, $code:expr, $message:expr) => {
        $crate::emit!(
            $bus,
            $crate::event::Event::Core($crate::event::CoreEvent::Warning {
                code: $code.to_string(),
                message: $message.to_string(),
            })
        )
    };
}

/// Convenience macro for emitting progress events
#[macro_export]
macro_rules! emit_progress {
    // With total and message
    ($bus:expr, $operation:expr, $current:expr, $total:expr, $message:expr) => {
        $crate::emit!(
            $bus,
            $crate::event::Event::Core($crate::event::CoreEvent::Progress {
                operation: $operation.to_string(),
                current: $current,
                total: Some($total),
                message: Some($message.to_string()),
            })
        )
    };

    // With total, no message
    ($bus:expr, $operation:expr, $current:expr, $total:expr) => {
        $crate::emit!(
            $bus,
            $crate::event::Event::Core($crate::event::CoreEvent::Progress {
                operation: $operation.to_string(),
                current: $current,
                total: Some($total),
                message: None,
            })
        )
    };
}
