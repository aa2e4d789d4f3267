//! Bastion Observability
//!
//! This crate provides observability for the Bastion access-control core:
//!
//! - [`EventDispatcher`]: Observable grant and check events
//! - [`MetricsCollector`]: Check counters, per-name usage and recent denials
//!
//! # Event Subscription
//!
//! ```ignore
//! use bastion_observe::{EventDispatcher, LoggingSubscriber, AccessEvent};
//! use std::sync::Arc;
//!
//! let dispatcher = EventDispatcher::new();
//! dispatcher.subscribe(Arc::new(LoggingSubscriber::denials_only()));
//!
//! dispatcher.emit(AccessEvent::access_checked(&permission, false, elapsed));
//! ```
//!
//! # Metrics Collection
//!
//! ```ignore
//! use bastion_observe::MetricsCollector;
//!
//! let collector = MetricsCollector::new();
//! collector.record_check(&permission, true, elapsed);
//!
//! let snapshot = collector.snapshot();
//! println!("{}", snapshot.to_json()?);
//! ```

pub mod events;
pub mod metrics;

// Re-export main types
pub use events::{
    AccessEvent, CollectingSubscriber, EventDispatcher, EventSubscriber, LoggingSubscriber,
};
pub use metrics::{CheckTotals, DeniedCheck, MetricsCollector, MetricsSnapshot};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::events::{AccessEvent, EventDispatcher, EventSubscriber};
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot};
}
