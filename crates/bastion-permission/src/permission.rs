//! Permission values.
//!
//! A permission is an immutable grant of actions on a named resource. The set
//! of permission families is closed: every family is a variant of
//! [`Permission`], and cross-family comparisons are answered by a `match`
//! rather than by dynamic dispatch.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::OnceLock;

use crate::action::ActionMask;
use crate::error::{PermissionError, PermissionResult};
use crate::name;

/// The family a permission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionKind {
    /// Named configuration properties with `read` / `write` actions.
    Property,
    /// Named runtime operations without actions.
    Runtime,
}

impl PermissionKind {
    /// Get the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionKind::Property => "property",
            PermissionKind::Runtime => "runtime",
        }
    }
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn validate_name(name: String) -> PermissionResult<String> {
    if name.is_empty() {
        return Err(PermissionError::InvalidName);
    }
    Ok(name)
}

/// Permission to read and/or write a named property.
///
/// # Example
///
/// ```
/// use bastion_permission::PropertyPermission;
///
/// let granted = PropertyPermission::new("java.*", "read,write")?;
/// let requested = PropertyPermission::new("java.home", "read")?;
///
/// assert!(granted.implies(&requested));
/// assert!(!requested.implies(&granted));
/// # Ok::<(), bastion_permission::PermissionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct PropertyPermission {
    name: String,
    mask: ActionMask,
    /// Canonical action string, rendered on first request.
    actions: OnceLock<String>,
}

impl PropertyPermission {
    /// Create a property permission from a name and an action string.
    ///
    /// # Errors
    ///
    /// - [`PermissionError::InvalidName`] if `name` is empty
    /// - [`PermissionError::InvalidActionString`] if `actions` is malformed
    /// - [`PermissionError::EmptyActionMask`] if `actions` names no action
    pub fn new(name: impl Into<String>, actions: &str) -> PermissionResult<Self> {
        let mask = ActionMask::parse(actions)?;
        Self::from_mask(name, mask)
    }

    /// Create a property permission from an already parsed mask.
    ///
    /// # Errors
    ///
    /// - [`PermissionError::InvalidName`] if `name` is empty
    /// - [`PermissionError::InvalidActionMask`] if `mask` has unknown bits
    /// - [`PermissionError::EmptyActionMask`] if `mask` is empty
    pub fn from_mask(name: impl Into<String>, mask: ActionMask) -> PermissionResult<Self> {
        let name = validate_name(name.into())?;
        if !ActionMask::all().contains(mask) {
            return Err(PermissionError::InvalidActionMask { bits: mask.bits() });
        }
        if mask.is_empty() {
            return Err(PermissionError::EmptyActionMask);
        }
        Ok(Self {
            name,
            mask,
            actions: OnceLock::new(),
        })
    }

    /// Get the permission name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the granted actions.
    pub fn mask(&self) -> ActionMask {
        self.mask
    }

    /// Get the canonical action string, e.g. `"read,write"`.
    pub fn actions(&self) -> &str {
        self.actions.get_or_init(|| self.mask.render())
    }

    /// Check whether this permission grants everything `other` asks for.
    pub fn implies(&self, other: &PropertyPermission) -> bool {
        self.mask.covers(other.mask) && name::matches(&self.name, &other.name)
    }

    /// Combine with additional actions under the same name.
    pub(crate) fn merged_with(&self, mask: ActionMask) -> Self {
        Self {
            name: self.name.clone(),
            mask: self.mask | mask,
            actions: OnceLock::new(),
        }
    }
}

impl PartialEq for PropertyPermission {
    fn eq(&self, other: &Self) -> bool {
        self.mask == other.mask && self.name == other.name
    }
}

impl Eq for PropertyPermission {}

impl Hash for PropertyPermission {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.mask.hash(state);
    }
}

/// Permission to perform a named runtime operation, such as `exitVM`.
///
/// Runtime permissions carry no actions; holding the name is the grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuntimePermission {
    name: String,
}

impl RuntimePermission {
    /// Create a runtime permission.
    ///
    /// # Errors
    ///
    /// Returns [`PermissionError::InvalidName`] if `name` is empty.
    pub fn new(name: impl Into<String>) -> PermissionResult<Self> {
        Ok(Self {
            name: validate_name(name.into())?,
        })
    }

    /// Get the permission name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check whether this permission's name covers `other`'s.
    pub fn implies(&self, other: &RuntimePermission) -> bool {
        name::matches(&self.name, &other.name)
    }
}

/// A permission of any known family.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Permission {
    /// A property permission.
    Property(PropertyPermission),
    /// A runtime permission.
    Runtime(RuntimePermission),
}

impl Permission {
    /// Create a property permission.
    pub fn property(name: impl Into<String>, actions: &str) -> PermissionResult<Self> {
        PropertyPermission::new(name, actions).map(Permission::Property)
    }

    /// Create a runtime permission.
    pub fn runtime(name: impl Into<String>) -> PermissionResult<Self> {
        RuntimePermission::new(name).map(Permission::Runtime)
    }

    /// Get the family of this permission.
    pub fn kind(&self) -> PermissionKind {
        match self {
            Permission::Property(_) => PermissionKind::Property,
            Permission::Runtime(_) => PermissionKind::Runtime,
        }
    }

    /// Get the permission name.
    pub fn name(&self) -> &str {
        match self {
            Permission::Property(p) => p.name(),
            Permission::Runtime(p) => p.name(),
        }
    }

    /// Get the canonical action string; empty for families without actions.
    pub fn actions(&self) -> &str {
        match self {
            Permission::Property(p) => p.actions(),
            Permission::Runtime(_) => "",
        }
    }

    /// Check whether this permission implies `other`.
    ///
    /// Permissions of different families never imply each other.
    pub fn implies(&self, other: &Permission) -> bool {
        match (self, other) {
            (Permission::Property(granted), Permission::Property(requested)) => {
                granted.implies(requested)
            }
            (Permission::Runtime(granted), Permission::Runtime(requested)) => {
                granted.implies(requested)
            }
            _ => false,
        }
    }
}

impl From<PropertyPermission> for Permission {
    fn from(p: PropertyPermission) -> Self {
        Permission::Property(p)
    }
}

impl From<RuntimePermission> for Permission {
    fn from(p: RuntimePermission) -> Self {
        Permission::Runtime(p)
    }
}

impl fmt::Display for PropertyPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(property {:?} {:?})", self.name, self.actions())
    }
}

impl fmt::Display for RuntimePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(runtime {:?})", self.name)
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Property(p) => fmt::Display::fmt(p, f),
            Permission::Runtime(p) => fmt::Display::fmt(p, f),
        }
    }
}
