//! Collection of runtime permissions.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace};

use crate::collection::{Elements, PermissionCollection, fmt_elements};
use crate::error::{PermissionError, PermissionResult};
use crate::name;
use crate::permission::{Permission, PermissionKind, RuntimePermission};

/// A collection of [`RuntimePermission`]s.
///
/// Runtime permissions have no actions, so a query is implied as soon as any
/// stored name covers the requested one.
#[derive(Debug, Clone, Default)]
pub struct RuntimePermissionCollection {
    perms: HashMap<String, RuntimePermission>,
    all_allowed: bool,
    read_only: bool,
}

impl RuntimePermissionCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a runtime permission. Adding a name twice has no effect.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::CollectionSealed`] if the collection is
    /// read-only.
    pub fn add_runtime(&mut self, permission: RuntimePermission) -> PermissionResult<()> {
        if self.read_only {
            return Err(PermissionError::CollectionSealed);
        }
        self.insert(permission);
        Ok(())
    }

    pub(crate) fn insert(&mut self, permission: RuntimePermission) {
        if permission.name() == name::WILDCARD {
            self.all_allowed = true;
        }
        if !self.perms.contains_key(permission.name()) {
            debug!(name = permission.name(), "Runtime grant added");
            self.perms.insert(permission.name().to_string(), permission);
        }
    }

    /// Check whether the granted names cover a runtime permission.
    pub fn implies_runtime(&self, requested: &RuntimePermission) -> bool {
        if self.all_allowed || self.perms.contains_key(requested.name()) {
            return true;
        }

        name::wildcard_ancestors(requested.name())
            .any(|candidate| self.perms.contains_key(candidate.as_str()))
    }
}

impl PermissionCollection for RuntimePermissionCollection {
    fn add(&mut self, permission: Permission) -> PermissionResult<()> {
        match permission {
            Permission::Runtime(runtime) => self.add_runtime(runtime),
            other => Err(PermissionError::WrongPermissionKind {
                expected: PermissionKind::Runtime,
                actual: other.kind(),
            }),
        }
    }

    fn implies(&self, permission: &Permission) -> bool {
        let Permission::Runtime(requested) = permission else {
            return false;
        };

        let implied = self.implies_runtime(requested);
        trace!(name = requested.name(), implied, "Runtime permission checked");
        implied
    }

    fn elements(&self) -> Elements<'_> {
        Box::new(self.perms.values().cloned().map(Permission::Runtime))
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

impl fmt::Display for RuntimePermissionCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_elements(f, "RuntimePermissionCollection", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime(name: &str) -> Permission {
        Permission::runtime(name).unwrap()
    }

    #[test]
    fn test_exact_and_wildcard() {
        let mut perms = RuntimePermissionCollection::new();
        perms.add(runtime("exitVM")).unwrap();
        perms.add(runtime("thread.*")).unwrap();

        assert!(perms.implies(&runtime("exitVM")));
        assert!(perms.implies(&runtime("thread.modify")));
        assert!(perms.implies(&runtime("thread.group.modify")));
        assert!(!perms.implies(&runtime("thread")));
        assert!(!perms.implies(&runtime("loadLibrary")));
    }

    #[test]
    fn test_global_wildcard() {
        let mut perms = RuntimePermissionCollection::new();
        perms.add(runtime("*")).unwrap();

        assert!(perms.implies(&runtime("anything.at.all")));
    }

    #[test]
    fn test_duplicate_names_stored_once() {
        let mut perms = RuntimePermissionCollection::new();
        perms.add(runtime("exitVM")).unwrap();
        perms.add(runtime("exitVM")).unwrap();

        assert_eq!(perms.len(), 1);
    }

    #[test]
    fn test_rejects_property_permission() {
        let mut perms = RuntimePermissionCollection::new();
        let err = perms
            .add(Permission::property("a", "read").unwrap())
            .unwrap_err();

        assert_eq!(
            err,
            PermissionError::WrongPermissionKind {
                expected: PermissionKind::Runtime,
                actual: PermissionKind::Property,
            }
        );
        assert!(perms.is_empty());
        assert!(!perms.implies(&Permission::property("a", "read").unwrap()));
    }

    #[test]
    fn test_read_only() {
        let mut perms = RuntimePermissionCollection::new();
        perms.set_read_only();

        assert_eq!(
            perms.add(runtime("exitVM")).unwrap_err(),
            PermissionError::CollectionSealed
        );
        assert!(perms.is_empty());
    }
}
