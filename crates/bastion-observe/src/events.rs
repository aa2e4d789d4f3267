//! Observable events during access control.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;

use bastion_permission::{Permission, PermissionKind};

/// Events emitted while granting and checking permissions.
#[derive(Debug, Clone)]
pub enum AccessEvent {
    /// A permission was granted.
    GrantAdded {
        /// Permission family.
        kind: PermissionKind,
        /// Permission name.
        name: String,
        /// Canonical action string.
        actions: String,
    },
    /// The granted permissions were sealed.
    PermissionsSealed {
        /// Number of stored permissions after merging.
        count: usize,
    },
    /// A permission check was answered.
    AccessChecked {
        /// Permission family.
        kind: PermissionKind,
        /// Requested name.
        name: String,
        /// Requested actions.
        actions: String,
        /// Whether the request was implied.
        permitted: bool,
        /// Time spent answering.
        duration: Duration,
    },
}

impl AccessEvent {
    /// Build a `GrantAdded` event for a permission.
    pub fn grant_added(permission: &Permission) -> Self {
        AccessEvent::GrantAdded {
            kind: permission.kind(),
            name: permission.name().to_string(),
            actions: permission.actions().to_string(),
        }
    }

    /// Build an `AccessChecked` event for a permission.
    pub fn access_checked(permission: &Permission, permitted: bool, duration: Duration) -> Self {
        AccessEvent::AccessChecked {
            kind: permission.kind(),
            name: permission.name().to_string(),
            actions: permission.actions().to_string(),
            permitted,
            duration,
        }
    }

    /// Get the event type name.
    pub fn event_type(&self) -> &'static str {
        match self {
            AccessEvent::GrantAdded { .. } => "grant_added",
            AccessEvent::PermissionsSealed { .. } => "permissions_sealed",
            AccessEvent::AccessChecked { .. } => "access_checked",
        }
    }
}

/// Subscriber for access events.
pub trait EventSubscriber: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &AccessEvent);

    /// Filter for event types this subscriber is interested in.
    /// Returns `None` to receive all events.
    fn event_filter(&self) -> Option<Vec<&'static str>> {
        None
    }
}

/// A subscriber that forwards events to `tracing`.
pub struct LoggingSubscriber {
    /// Whether permitted checks are logged; denials are always logged.
    pub log_permitted: bool,
}

impl LoggingSubscriber {
    /// Create a new logging subscriber.
    pub fn new() -> Self {
        Self {
            log_permitted: true,
        }
    }

    /// Only log denied checks.
    pub fn denials_only() -> Self {
        Self {
            log_permitted: false,
        }
    }
}

impl Default for LoggingSubscriber {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSubscriber for LoggingSubscriber {
    fn on_event(&self, event: &AccessEvent) {
        match event {
            AccessEvent::GrantAdded {
                kind,
                name,
                actions,
            } => {
                tracing::debug!(
                    event = "grant_added",
                    kind = %kind,
                    name = name,
                    actions = actions,
                    "Permission granted"
                );
            }
            AccessEvent::PermissionsSealed { count } => {
                tracing::info!(
                    event = "permissions_sealed",
                    count = count,
                    "Permissions sealed"
                );
            }
            AccessEvent::AccessChecked {
                kind,
                name,
                actions,
                permitted,
                duration,
            } => {
                if *permitted {
                    if self.log_permitted {
                        tracing::trace!(
                            event = "access_checked",
                            kind = %kind,
                            name = name,
                            actions = actions,
                            duration_ns = duration.as_nanos(),
                            "Access check passed"
                        );
                    }
                } else {
                    tracing::warn!(
                        event = "access_checked",
                        kind = %kind,
                        name = name,
                        actions = actions,
                        duration_ns = duration.as_nanos(),
                        "Access denied"
                    );
                }
            }
        }
    }
}

/// A subscriber that collects events for later analysis.
pub struct CollectingSubscriber {
    events: RwLock<Vec<(Instant, AccessEvent)>>,
    max_events: usize,
}

impl CollectingSubscriber {
    /// Create a new collecting subscriber.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: RwLock::new(Vec::new()),
            max_events,
        }
    }

    /// Get collected events.
    pub fn events(&self) -> Vec<(Instant, AccessEvent)> {
        self.events.read().clone()
    }

    /// Clear collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Get event count.
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }
}

impl EventSubscriber for CollectingSubscriber {
    fn on_event(&self, event: &AccessEvent) {
        let mut events = self.events.write();
        if events.len() < self.max_events {
            events.push((Instant::now(), event.clone()));
        }
    }
}

/// Event dispatcher that manages subscribers.
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: RwLock<Vec<Arc<dyn EventSubscriber>>>,
}

impl EventDispatcher {
    /// Create a new event dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber.
    pub fn subscribe(&self, subscriber: Arc<dyn EventSubscriber>) {
        self.subscribers.write().push(subscriber);
    }

    /// Remove all subscribers.
    pub fn clear_subscribers(&self) {
        self.subscribers.write().clear();
    }

    /// Get subscriber count.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Check whether anyone is listening.
    pub fn has_subscribers(&self) -> bool {
        !self.subscribers.read().is_empty()
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: AccessEvent) {
        let subscribers = self.subscribers.read();
        for subscriber in subscribers.iter() {
            if let Some(filter) = subscriber.event_filter() {
                if !filter.contains(&event.event_type()) {
                    continue;
                }
            }
            subscriber.on_event(&event);
        }
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct DenialsOnly(CollectingSubscriber);

    impl EventSubscriber for DenialsOnly {
        fn on_event(&self, event: &AccessEvent) {
            if let AccessEvent::AccessChecked {
                permitted: false, ..
            } = event
            {
                self.0.on_event(event);
            }
        }

        fn event_filter(&self) -> Option<Vec<&'static str>> {
            Some(vec!["access_checked"])
        }
    }

    #[test]
    fn test_access_event_type() {
        let permission = Permission::property("java.home", "read").unwrap();
        let event = AccessEvent::grant_added(&permission);
        assert_eq!(event.event_type(), "grant_added");

        match event {
            AccessEvent::GrantAdded {
                kind,
                name,
                actions,
            } => {
                assert_eq!(kind, PermissionKind::Property);
                assert_eq!(name, "java.home");
                assert_eq!(actions, "read");
            }
            _ => panic!("Wrong event type"),
        }
    }

    #[test]
    fn test_collecting_subscriber_max_events() {
        let subscriber = CollectingSubscriber::new(2);

        for count in 0..5 {
            subscriber.on_event(&AccessEvent::PermissionsSealed { count });
        }

        assert_eq!(subscriber.len(), 2);
        subscriber.clear();
        assert!(subscriber.is_empty());
    }

    #[test]
    fn test_event_dispatcher_multiple_subscribers() {
        let dispatcher = EventDispatcher::new();
        let collector1 = Arc::new(CollectingSubscriber::new(100));
        let collector2 = Arc::new(CollectingSubscriber::new(100));

        dispatcher.subscribe(Arc::clone(&collector1) as Arc<dyn EventSubscriber>);
        dispatcher.subscribe(Arc::clone(&collector2) as Arc<dyn EventSubscriber>);

        dispatcher.emit(AccessEvent::PermissionsSealed { count: 3 });

        assert_eq!(collector1.len(), 1);
        assert_eq!(collector2.len(), 1);
    }

    #[test]
    fn test_event_filter() {
        let dispatcher = EventDispatcher::new();
        let denials = Arc::new(DenialsOnly(CollectingSubscriber::new(100)));
        dispatcher.subscribe(Arc::clone(&denials) as Arc<dyn EventSubscriber>);

        let permission = Permission::property("a.b", "write").unwrap();
        dispatcher.emit(AccessEvent::grant_added(&permission));
        dispatcher.emit(AccessEvent::access_checked(&permission, true, Duration::ZERO));
        dispatcher.emit(AccessEvent::access_checked(&permission, false, Duration::ZERO));

        assert_eq!(denials.0.len(), 1);
    }

    #[test]
    fn test_logging_subscriber_handles_all_events() {
        let subscriber = LoggingSubscriber::denials_only();
        let permission = Permission::runtime("exitVM").unwrap();

        subscriber.on_event(&AccessEvent::grant_added(&permission));
        subscriber.on_event(&AccessEvent::access_checked(&permission, false, Duration::ZERO));
        subscriber.on_event(&AccessEvent::PermissionsSealed { count: 1 });
    }
}
