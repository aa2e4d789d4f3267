//! # Bastion - In-Process Access Control
//!
//! Bastion decides whether a requested operation on a named resource is
//! authorized by a set of previously granted permissions. Checks never leave
//! the process: they are fast, deterministic and safe to run from many
//! threads at once.
//!
//! ## Quick Start
//!
//! ```
//! use bastion::prelude::*;
//!
//! let controller = Bastion::builder()
//!     .grant(Permission::property("java.*", "read")?)
//!     .grant(Permission::property("user.home", "read,write")?)
//!     .grant(Permission::runtime("exitVM")?)
//!     .build()?;
//!
//! assert!(controller.implies(&Permission::property("java.home", "read")?));
//! assert!(controller
//!     .check_permission(&Permission::property("java.home", "write")?)
//!     .is_err());
//! # Ok::<(), bastion::BastionError>(())
//! ```
//!
//! ## Security Model
//!
//! 1. **Deny by Default**: a request is allowed only if some grant covers it
//! 2. **Hierarchical Names**: `a.*` covers everything below `a.`, `*` covers all
//! 3. **Action Sets**: a request's actions must all be granted along the way
//! 4. **Sealed Grants**: grants are fixed before the first check
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 Your Application / Runtime              │
//! ├─────────────────────────────────────────────────────────┤
//! │                   bastion (facade)                      │
//! │        ┌───────────────┐     ┌──────────────────┐       │
//! │        │ BastionBuilder│ ──▶ │ AccessController │       │
//! │        └───────────────┘     └────────┬─────────┘       │
//! │                                       │                 │
//! │  ┌───────────────────────────┬────────┴──────────────┐  │
//! │  │ bastion-permission        │ bastion-observe       │  │
//! │  │ (permissions, collections)│ (events, metrics)     │  │
//! │  └───────────────────────────┴───────────────────────┘  │
//! └─────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use bastion_observe::{AccessEvent, EventDispatcher, EventSubscriber, MetricsCollector};
use bastion_permission::{Permission, PermissionCollection, PermissionError, Permissions, Sealed};

pub mod config;

pub use config::ControllerConfig;

// Re-export from sub-crates
pub use bastion_observe;
pub use bastion_permission;

/// Main entry point for Bastion.
pub struct Bastion;

impl Bastion {
    /// Create a new access controller builder.
    pub fn builder() -> BastionBuilder {
        BastionBuilder::new()
    }

    /// Create a controller from grants with default configuration.
    pub fn with_grants(
        grants: impl IntoIterator<Item = Permission>,
    ) -> Result<AccessController, BastionError> {
        BastionBuilder::new().grant_all(grants).build()
    }
}

/// Builder for configuring an access controller.
///
/// Grants are collected here and sealed when the controller is built, so a
/// built controller can never gain permissions.
pub struct BastionBuilder {
    config: ControllerConfig,
    grants: Vec<Permission>,
    event_subscribers: Vec<Arc<dyn EventSubscriber>>,
}

impl BastionBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: ControllerConfig::default(),
            grants: Vec::new(),
            event_subscribers: Vec::new(),
        }
    }

    // Configuration

    /// Replace the whole configuration.
    pub fn with_config(mut self, config: ControllerConfig) -> Self {
        self.config = config;
        self
    }

    /// Enable or disable metrics collection.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.config.collect_metrics = enabled;
        self
    }

    /// Enable or disable event emission.
    pub fn with_events(mut self, enabled: bool) -> Self {
        self.config.emit_events = enabled;
        self
    }

    // Grants

    /// Grant a permission.
    pub fn grant(mut self, permission: Permission) -> Self {
        self.grants.push(permission);
        self
    }

    /// Grant several permissions.
    pub fn grant_all(mut self, permissions: impl IntoIterator<Item = Permission>) -> Self {
        self.grants.extend(permissions);
        self
    }

    // Observability

    /// Add an event subscriber.
    pub fn with_event_subscriber(mut self, subscriber: Arc<dyn EventSubscriber>) -> Self {
        self.event_subscribers.push(subscriber);
        self
    }

    /// Build the controller, sealing the granted permissions.
    pub fn build(self) -> Result<AccessController, BastionError> {
        let event_dispatcher = EventDispatcher::new();
        for subscriber in self.event_subscribers {
            event_dispatcher.subscribe(subscriber);
        }
        let emit = self.config.emit_events && event_dispatcher.has_subscribers();

        let metrics = MetricsCollector::with_limits(
            self.config.max_denials_retained,
            self.config.max_tracked_names,
        );

        let mut permissions = Permissions::with_capacity(self.config.initial_capacity);
        for permission in self.grants {
            if emit {
                event_dispatcher.emit(AccessEvent::grant_added(&permission));
            }
            permissions.add(permission)?;
            if self.config.collect_metrics {
                metrics.record_grant();
            }
        }

        let permissions = permissions.seal();
        if emit {
            event_dispatcher.emit(AccessEvent::PermissionsSealed {
                count: permissions.len(),
            });
        }
        info!(permissions = permissions.len(), "Access controller built");

        Ok(AccessController {
            permissions,
            config: self.config,
            event_dispatcher: Arc::new(event_dispatcher),
            metrics: Arc::new(metrics),
        })
    }
}

impl Default for BastionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Answers permission checks against a sealed set of grants.
///
/// The controller is `Send + Sync` and cheap to clone; clones share the same
/// grants, metrics and subscribers.
#[derive(Clone)]
pub struct AccessController {
    permissions: Sealed<Permissions>,
    config: ControllerConfig,
    event_dispatcher: Arc<EventDispatcher>,
    metrics: Arc<MetricsCollector>,
}

impl AccessController {
    /// Check whether the grants imply `permission`.
    ///
    /// A `false` result means the request must be denied.
    pub fn implies(&self, permission: &Permission) -> bool {
        if !self.config.observes_checks() {
            return self.permissions.implies(permission);
        }

        let start = Instant::now();
        let permitted = self.permissions.implies(permission);
        let elapsed = start.elapsed();

        debug!(permission = %permission, permitted, "Access checked");

        if self.config.collect_metrics {
            self.metrics.record_check(permission, permitted, elapsed);
        }
        if self.config.emit_events && self.event_dispatcher.has_subscribers() {
            self.event_dispatcher
                .emit(AccessEvent::access_checked(permission, permitted, elapsed));
        }
        permitted
    }

    /// Require that `permission` is implied.
    ///
    /// # Errors
    ///
    /// Returns [`BastionError::AccessDenied`] carrying the requested
    /// permission if it is not implied.
    pub fn check_permission(&self, permission: &Permission) -> Result<(), BastionError> {
        if self.implies(permission) {
            Ok(())
        } else {
            Err(BastionError::AccessDenied {
                permission: permission.clone(),
            })
        }
    }

    /// Get the sealed grants.
    pub fn permissions(&self) -> &Sealed<Permissions> {
        &self.permissions
    }

    /// Get the configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Get the event dispatcher.
    pub fn event_dispatcher(&self) -> &Arc<EventDispatcher> {
        &self.event_dispatcher
    }

    /// Get the metrics collector.
    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }
}

impl std::fmt::Debug for AccessController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessController")
            .field("permissions", &self.permissions.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Errors from the access controller.
#[derive(Debug, thiserror::Error)]
pub enum BastionError {
    /// The requested permission is not implied by the grants.
    #[error("access denied {permission}")]
    AccessDenied {
        /// The permission that was requested.
        permission: Permission,
    },

    /// Permission error.
    #[error("Permission error: {0}")]
    Permission(#[from] PermissionError),
}

impl BastionError {
    /// Get the denied permission, if this is an access denial.
    pub fn permission(&self) -> Option<&Permission> {
        match self {
            BastionError::AccessDenied { permission } => Some(permission),
            BastionError::Permission(_) => None,
        }
    }
}

/// Prelude module for convenient imports.
pub mod prelude {
    // Main types
    pub use crate::{AccessController, Bastion, BastionBuilder, BastionError, ControllerConfig};

    // Permission types
    pub use bastion_permission::{
        ActionMask, Permission, PermissionCollection, PermissionError, PermissionKind, Permissions,
        PropertyPermissionCollection, Sealed,
    };

    // Observability types
    pub use bastion_observe::{
        AccessEvent, CollectingSubscriber, EventDispatcher, EventSubscriber, LoggingSubscriber,
        MetricsCollector, MetricsSnapshot,
    };

    // Common std types
    pub use std::sync::Arc;
}
