//! Bastion Permissions
//!
//! This crate provides the permission model for the Bastion access-control
//! core: permission values, action masks, hierarchical name matching and the
//! collections that answer "do the granted permissions imply this request?".
//!
//! # Permission Model
//!
//! - A permission names a resource and, for the property family, the
//!   actions (`read`, `write`) allowed on it
//! - Names are `.`-separated; a trailing `*` segment grants the whole subtree
//!   and the bare name `*` grants everything
//! - Collections are filled first, then sealed and shared for reading
//! - Absence of a covering grant means denial
//!
//! # Usage
//!
//! ```
//! use bastion_permission::{Permission, PermissionCollection, PropertyPermissionCollection};
//!
//! let mut grants = PropertyPermissionCollection::new();
//! grants.add(Permission::property("java.*", "read")?)?;
//! grants.add(Permission::property("user.home", "read,write")?)?;
//!
//! let grants = grants.seal();
//! assert!(grants.implies(&Permission::property("java.home", "read")?));
//! assert!(!grants.implies(&Permission::property("java.home", "write")?));
//! # Ok::<(), bastion_permission::PermissionError>(())
//! ```

pub mod action;
pub mod collection;
pub mod error;
pub mod name;
pub mod permission;
pub mod permissions;
pub mod property;
pub mod runtime;

// Re-export main types
pub use action::ActionMask;
pub use collection::{Elements, PermissionCollection, Sealed};
pub use error::{PermissionError, PermissionResult};
pub use permission::{Permission, PermissionKind, PropertyPermission, RuntimePermission};
pub use permissions::Permissions;
pub use property::PropertyPermissionCollection;
pub use runtime::RuntimePermissionCollection;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::action::ActionMask;
    pub use crate::collection::{PermissionCollection, Sealed};
    pub use crate::error::{PermissionError, PermissionResult};
    pub use crate::permission::{Permission, PermissionKind};
    pub use crate::permissions::Permissions;
    pub use crate::property::PropertyPermissionCollection;
}
