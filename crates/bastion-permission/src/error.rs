//! Error types for the permission system.

use thiserror::Error;

use crate::permission::PermissionKind;

/// Errors raised while constructing permissions or populating collections.
///
/// Implication queries never produce these: a query that cannot be answered
/// positively simply returns `false`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    /// The permission name was empty.
    #[error("Invalid permission name: name must not be empty")]
    InvalidName,

    /// The action string contained an unrecognized or malformed token.
    #[error("Invalid action string: {actions:?}")]
    InvalidActionString {
        /// The action string as supplied by the caller.
        actions: String,
    },

    /// An action mask carried bits outside the known actions.
    #[error("Invalid action mask: {bits:#04x}")]
    InvalidActionMask {
        /// The raw bits of the rejected mask.
        bits: u8,
    },

    /// The action string parsed to zero actions.
    #[error("Empty action mask: at least one action is required")]
    EmptyActionMask,

    /// A permission of one family was handed to a collection of another.
    #[error("Wrong permission kind: expected {expected}, got {actual}")]
    WrongPermissionKind {
        /// The family the collection holds.
        expected: PermissionKind,
        /// The family of the rejected permission.
        actual: PermissionKind,
    },

    /// The collection has been made read-only.
    #[error("Attempt to add a permission to a read-only collection")]
    CollectionSealed,
}

impl PermissionError {
    pub(crate) fn invalid_actions(actions: &str) -> Self {
        Self::InvalidActionString {
            actions: actions.to_string(),
        }
    }
}

/// Result type for permission operations.
pub type PermissionResult<T> = std::result::Result<T, PermissionError>;
