//! Collection of property permissions.
//!
//! Grants are keyed by name. Granting the same name twice merges the actions,
//! so each name maps to exactly one stored permission. Queries combine the
//! actions of every grant that covers the requested name: the global `*`, the
//! exact name, and each `prefix.*` above it.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::action::ActionMask;
use crate::collection::{Elements, PermissionCollection, fmt_elements};
use crate::error::{PermissionError, PermissionResult};
use crate::name;
use crate::permission::{Permission, PermissionKind, PropertyPermission};

/// Initial map capacity, sized for a typical default policy.
const DEFAULT_CAPACITY: usize = 32;

/// A collection of [`PropertyPermission`]s.
///
/// # Example
///
/// ```
/// use bastion_permission::{Permission, PermissionCollection, PropertyPermissionCollection};
///
/// let mut grants = PropertyPermissionCollection::new();
/// grants.add(Permission::property("a.*", "read")?)?;
/// grants.add(Permission::property("a.b.*", "write")?)?;
///
/// // Actions accumulate along the walk from `a.b.c` up to `a.*`.
/// assert!(grants.implies(&Permission::property("a.b.c", "read,write")?));
/// assert!(!grants.implies(&Permission::property("x.y", "read")?));
/// # Ok::<(), bastion_permission::PermissionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PropertyPermissionCollection {
    /// Merged permission per distinct name.
    perms: HashMap<String, PropertyPermission>,
    /// Set once a grant for the global wildcard `*` has been added.
    all_allowed: bool,
    read_only: bool,
}

impl Default for PropertyPermissionCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyPermissionCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty collection with room for `capacity` distinct names.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            perms: HashMap::with_capacity(capacity),
            all_allowed: false,
            read_only: false,
        }
    }

    /// Get the stored (merged) permission for an exact name.
    pub fn get(&self, name: &str) -> Option<&PropertyPermission> {
        self.perms.get(name)
    }

    /// Check whether the global wildcard `*` has been granted.
    pub fn all_allowed(&self) -> bool {
        self.all_allowed
    }

    /// Add a property permission, merging actions with any existing grant
    /// under the same name.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::CollectionSealed`] if the collection is
    /// read-only.
    pub fn add_property(&mut self, permission: PropertyPermission) -> PermissionResult<()> {
        if self.read_only {
            return Err(PermissionError::CollectionSealed);
        }
        self.insert(permission);
        Ok(())
    }

    /// Store a grant, merging with any existing entry. Ignores `read_only`.
    pub(crate) fn insert(&mut self, permission: PropertyPermission) {
        let is_wildcard = permission.name() == name::WILDCARD;

        match self.perms.get_mut(permission.name()) {
            Some(existing) => {
                if !existing.mask().covers(permission.mask()) {
                    *existing = existing.merged_with(permission.mask());
                }
                debug!(
                    name = existing.name(),
                    actions = existing.actions(),
                    "Property grant merged"
                );
            }
            None => {
                debug!(
                    name = permission.name(),
                    actions = permission.actions(),
                    "Property grant added"
                );
                self.perms.insert(permission.name().to_string(), permission);
            }
        }

        if is_wildcard {
            self.all_allowed = true;
        }
    }

    /// Check whether the granted permissions imply a property permission.
    pub fn implies_property(&self, requested: &PropertyPermission) -> bool {
        let desired = requested.mask();
        let mut effective = ActionMask::empty();

        // The global wildcard alone often settles the query.
        if self.all_allowed {
            if let Some(all) = self.perms.get(name::WILDCARD) {
                effective |= all.mask();
                if effective.covers(desired) {
                    return true;
                }
            }
        }

        if let Some(exact) = self.perms.get(requested.name()) {
            effective |= exact.mask();
            if effective.covers(desired) {
                return true;
            }
        }

        for candidate in name::wildcard_ancestors(requested.name()) {
            if let Some(granted) = self.perms.get(candidate.as_str()) {
                effective |= granted.mask();
                if effective.covers(desired) {
                    return true;
                }
            }
        }

        // `*` was covered by the shortcut above.
        false
    }
}

impl PermissionCollection for PropertyPermissionCollection {
    fn add(&mut self, permission: Permission) -> PermissionResult<()> {
        match permission {
            Permission::Property(property) => self.add_property(property),
            other => Err(PermissionError::WrongPermissionKind {
                expected: PermissionKind::Property,
                actual: other.kind(),
            }),
        }
    }

    fn implies(&self, permission: &Permission) -> bool {
        let Permission::Property(requested) = permission else {
            return false;
        };

        let implied = self.implies_property(requested);
        trace!(
            name = requested.name(),
            actions = requested.actions(),
            implied,
            "Property permission checked"
        );
        implied
    }

    fn elements(&self) -> Elements<'_> {
        Box::new(self.perms.values().cloned().map(Permission::Property))
    }

    fn set_read_only(&mut self) {
        self.read_only = true;
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn len(&self) -> usize {
        self.perms.len()
    }
}

impl fmt::Display for PropertyPermissionCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_elements(f, "PropertyPermissionCollection", self)
    }
}
