//! Heterogeneous permission container.
//!
//! [`Permissions`] holds one collection per permission family and routes each
//! grant and query to the collection of the matching family.

use std::fmt;

use tracing::info;

use crate::collection::{Elements, PermissionCollection, fmt_elements};
use crate::error::{PermissionError, PermissionResult};
use crate::permission::Permission;
use crate::property::PropertyPermissionCollection;
use crate::runtime::RuntimePermissionCollection;

/// Permissions of every family.
///
/// Family collections are created on the first grant of that family.
/// Unlike the per-family collections, `add` never fails with
/// [`PermissionError::WrongPermissionKind`].
///
/// # Example
///
/// ```
/// use bastion_permission::{Permission, PermissionCollection, Permissions};
///
/// let mut perms = Permissions::new();
/// perms.add(Permission::property("user.*", "read")?)?;
/// perms.add(Permission::runtime("exitVM")?)?;
///
/// assert!(perms.implies(&Permission::property("user.home", "read")?));
/// assert!(perms.implies(&Permission::runtime("exitVM")?));
/// assert!(!perms.implies(&Permission::runtime("loadLibrary")?));
/// # Ok::<(), bastion_permission::PermissionError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Permissions {
    property: Option<PropertyPermissionCollection>,
    runtime: Option<RuntimePermissionCollection>,
    read_only: bool,
}

impl Permissions {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a container whose property collection has room for
    /// `capacity` distinct names.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            property: Some(PropertyPermissionCollection::with_capacity(capacity)),
            ..Self::default()
        }
    }

    /// Get the property collection, if any property permission was granted.
    pub fn property(&self) -> Option<&PropertyPermissionCollection> {
        self.property.as_ref()
    }

    /// Get the runtime collection, if any runtime permission was granted.
    pub fn runtime(&self) -> Option<&RuntimePermissionCollection> {
        self.runtime.as_ref()
    }
}

impl PermissionCollection for Permissions {
    fn add(&mut self, permission: Permission) -> PermissionResult<()> {
        if self.read_only {
            return Err(PermissionError::CollectionSealed);
        }

        match permission {
            Permission::Property(p) => self
                .property
                .get_or_insert_with(PropertyPermissionCollection::new)
                .add_property(p),
            Permission::Runtime(p) => self
                .runtime
                .get_or_insert_with(RuntimePermissionCollection::new)
                .add_runtime(p),
        }
    }

    fn implies(&self, permission: &Permission) -> bool {
        match permission {
            Permission::Property(p) => self
                .property
                .as_ref()
                .is_some_and(|perms| perms.implies_property(p)),
            Permission::Runtime(p) => self
                .runtime
                .as_ref()
                .is_some_and(|perms| perms.implies_runtime(p)),
        }
    }

    fn elements(&self) -> Elements<'_> {
        let property = self.property.iter().flat_map(|perms| perms.elements());
        let runtime = self.runtime.iter().flat_map(|perms| perms.elements());
        Box::new(property.chain(runtime))
    }

    fn set_read_only(&mut self) {
        if self.read_only {
            return;
        }
        self.read_only = true;
        if let Some(perms) = self.property.as_mut() {
            perms.set_read_only();
        }
        if let Some(perms) = self.runtime.as_mut() {
            perms.set_read_only();
        }
        info!(permissions = self.len(), "Permissions sealed");
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn len(&self) -> usize {
        self.property.as_ref().map_or(0, |perms| perms.len())
            + self.runtime.as_ref().map_or(0, |perms| perms.len())
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_elements(f, "Permissions", self)
    }
}

impl FromIterator<Permission> for Permissions {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut perms = Self::new();
        for permission in iter {
            match permission {
                Permission::Property(p) => perms
                    .property
                    .get_or_insert_with(PropertyPermissionCollection::new)
                    .insert(p),
                Permission::Runtime(p) => perms
                    .runtime
                    .get_or_insert_with(RuntimePermissionCollection::new)
                    .insert(p),
            }
        }
        perms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_by_family() {
        let mut perms = Permissions::new();
        perms.add(Permission::property("a.*", "read").unwrap()).unwrap();
        perms.add(Permission::runtime("exitVM").unwrap()).unwrap();

        assert_eq!(perms.len(), 2);
        assert_eq!(perms.property().unwrap().len(), 1);
        assert_eq!(perms.runtime().unwrap().len(), 1);

        assert!(perms.implies(&Permission::property("a.b", "read").unwrap()));
        assert!(perms.implies(&Permission::runtime("exitVM").unwrap()));
        // Same name, different family.
        assert!(!perms.implies(&Permission::runtime("a.b").unwrap()));
    }

    #[test]
    fn test_absent_family_implies_nothing() {
        let mut perms = Permissions::new();
        perms.add(Permission::runtime("*").unwrap()).unwrap();

        assert!(perms.property().is_none());
        assert!(!perms.implies(&Permission::property("a", "read").unwrap()));
    }

    #[test]
    fn test_seal_propagates() {
        let mut perms = Permissions::new();
        perms.add(Permission::property("a", "read").unwrap()).unwrap();

        let sealed = perms.seal();
        assert!(sealed.is_read_only());
        assert!(sealed.property().unwrap().is_read_only());
    }

    #[test]
    fn test_read_only_rejects_every_family() {
        let mut perms = Permissions::new();
        perms.set_read_only();

        assert_eq!(
            perms.add(Permission::property("a", "read").unwrap()).unwrap_err(),
            PermissionError::CollectionSealed
        );
        assert_eq!(
            perms.add(Permission::runtime("exitVM").unwrap()).unwrap_err(),
            PermissionError::CollectionSealed
        );
        assert!(perms.is_empty());
        assert!(perms.property().is_none());
    }

    #[test]
    fn test_collect_merges_and_stays_writable() {
        let mut perms: Permissions = [
            Permission::property("a.*", "read").unwrap(),
            Permission::property("a.*", "write").unwrap(),
            Permission::runtime("*").unwrap(),
            Permission::runtime("*").unwrap(),
        ]
        .into_iter()
        .collect();

        assert_eq!(perms.len(), 2);
        assert!(!perms.is_read_only());
        assert!(!perms.property().unwrap().all_allowed());
        assert_eq!(perms.runtime().unwrap().len(), 1);
        assert!(perms.implies(&Permission::runtime("exitVM").unwrap()));
        assert!(perms.implies(&Permission::property("a.b", "read,write").unwrap()));

        perms.add(Permission::property("b", "read").unwrap()).unwrap();
        assert_eq!(perms.len(), 3);
    }

    #[test]
    fn test_elements_chain_families() {
        let perms: Permissions = [
            Permission::property("a", "read").unwrap(),
            Permission::property("a", "write").unwrap(),
            Permission::runtime("exitVM").unwrap(),
        ]
        .into_iter()
        .collect();

        let elements: Vec<_> = perms.elements().collect();
        assert_eq!(elements.len(), 2);
        assert!(elements.contains(&Permission::property("a", "read,write").unwrap()));
        assert!(elements.contains(&Permission::runtime("exitVM").unwrap()));
    }
}
