//! The permission collection contract.
//!
//! A collection is populated through `&mut self` and queried through `&self`,
//! so the borrow checker enforces the "insert, then share for reading" usage
//! pattern. [`PermissionCollection::seal`] ends the insertion phase for good
//! and hands back a cheaply cloneable [`Sealed`] handle.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::PermissionResult;
use crate::permission::Permission;

/// Lazy iteration over the permissions stored in a collection.
pub type Elements<'a> = Box<dyn Iterator<Item = Permission> + 'a>;

/// Aggregates granted permissions and answers implication queries.
///
/// # Implementing a Collection
///
/// ```ignore
/// impl PermissionCollection for MyCollection {
///     fn add(&mut self, permission: Permission) -> PermissionResult<()> {
///         if self.read_only {
///             return Err(PermissionError::CollectionSealed);
///         }
///         self.granted.push(permission);
///         Ok(())
///     }
///
///     fn implies(&self, permission: &Permission) -> bool {
///         self.granted.iter().any(|p| p.implies(permission))
///     }
///
///     fn elements(&self) -> Elements<'_> {
///         Box::new(self.granted.iter().cloned())
///     }
///
///     fn set_read_only(&mut self) {
///         self.read_only = true;
///     }
///
///     fn is_read_only(&self) -> bool {
///         self.read_only
///     }
/// }
/// ```
pub trait PermissionCollection: fmt::Debug + Send + Sync {
    /// Add a granted permission.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::CollectionSealed`](crate::PermissionError::CollectionSealed)
    /// once the collection is read-only. A failed add leaves the collection
    /// unchanged.
    fn add(&mut self, permission: Permission) -> PermissionResult<()>;

    /// Check whether the granted permissions imply `permission`.
    ///
    /// Never fails: a permission the collection cannot grant, including one
    /// of a foreign family, is simply not implied.
    fn implies(&self, permission: &Permission) -> bool;

    /// Iterate over the stored permissions. No ordering is guaranteed.
    fn elements(&self) -> Elements<'_>;

    /// Make the collection read-only. Calling this again has no effect.
    fn set_read_only(&mut self);

    /// Check whether the collection is read-only.
    fn is_read_only(&self) -> bool;

    /// Number of stored permissions.
    fn len(&self) -> usize {
        self.elements().count()
    }

    /// Check whether the collection holds no permissions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make the collection read-only and freeze it behind a shared handle.
    fn seal(mut self) -> Sealed<Self>
    where
        Self: Sized,
    {
        self.set_read_only();
        Sealed::new(self)
    }
}

/// A read-only collection that can be shared across threads.
///
/// Only the query half of [`PermissionCollection`] is reachable through a
/// `Sealed` handle; cloning it shares the same underlying collection.
///
/// # Example
///
/// ```
/// use bastion_permission::{Permission, PermissionCollection, PropertyPermissionCollection};
///
/// let mut grants = PropertyPermissionCollection::new();
/// grants.add(Permission::property("user.*", "read")?)?;
///
/// let sealed = grants.seal();
/// let reader = sealed.clone();
/// assert!(reader.implies(&Permission::property("user.home", "read")?));
/// assert!(sealed.is_read_only());
/// # Ok::<(), bastion_permission::PermissionError>(())
/// ```
pub struct Sealed<C> {
    inner: Arc<C>,
}

impl<C: PermissionCollection> Sealed<C> {
    fn new(collection: C) -> Self {
        Self {
            inner: Arc::new(collection),
        }
    }
}

impl<C> Clone for Sealed<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<C> Deref for Sealed<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.inner
    }
}

impl<C: fmt::Debug> fmt::Debug for Sealed<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sealed").field(&self.inner).finish()
    }
}

impl<C: fmt::Display> fmt::Display for Sealed<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

/// Write a collection as its type name followed by one permission per line.
pub(crate) fn fmt_elements(
    f: &mut fmt::Formatter<'_>,
    type_name: &str,
    collection: &dyn PermissionCollection,
) -> fmt::Result {
    writeln!(f, "{} (", type_name)?;
    for permission in collection.elements() {
        writeln!(f, " {}", permission)?;
    }
    writeln!(f, ")")
}
