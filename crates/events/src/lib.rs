//! Sokoni event bus and notification infrastructure.
//!
//! - [`EventBus`] — in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`MarketEvent`] — the canonical domain event envelope.
//! - [`Notifier`] — fire-and-forget notification emitter consumed by the
//!   expiry sweep and the lifecycle handlers.

pub mod bus;
pub mod notifier;

pub use bus::{EventBus, MarketEvent};
pub use notifier::Notifier;
