//! Event bus implementations

mod async_tokio;

pub use async_tokio::{spawn_subscriber_task, TokioEventBus};
