//! Action masks.
//!
//! An action string such as `"read,write"` is parsed into an [`ActionMask`],
//! a small bitset over the fixed set of action kinds. Masks render back to a
//! canonical string: lowest-valued action first, joined by single commas.
//!
//! ```
//! use bastion_permission::ActionMask;
//!
//! let mask = ActionMask::parse(" Write , READ ")?;
//! assert_eq!(mask, ActionMask::READ | ActionMask::WRITE);
//! assert_eq!(mask.render(), "read,write");
//! # Ok::<(), bastion_permission::PermissionError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use crate::error::{PermissionError, PermissionResult};

bitflags! {
    /// Set of actions granted or requested on a named resource.
    ///
    /// | Flag | Action name |
    /// |------|-------------|
    /// | [`READ`](Self::READ) | `read` |
    /// | [`WRITE`](Self::WRITE) | `write` |
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ActionMask: u8 {
        /// Permission to read the resource.
        const READ  = 0x1;
        /// Permission to write the resource.
        const WRITE = 0x2;
    }
}

/// Action names in canonical rendering order.
const ACTION_NAMES: [(&str, ActionMask); 2] =
    [("read", ActionMask::READ), ("write", ActionMask::WRITE)];

/// Characters trimmed around each comma-separated token.
const ACTION_WHITESPACE: &[char] = &[' ', '\t', '\r', '\n', '\x0c'];

impl ActionMask {
    /// Parse a comma-separated action string.
    ///
    /// An empty string yields the empty mask; rejecting that is left to
    /// permission construction. Tokens are trimmed and matched
    /// case-insensitively. An empty token, an unknown name or a partial
    /// name fails with [`PermissionError::InvalidActionString`].
    pub fn parse(actions: &str) -> PermissionResult<Self> {
        if actions.is_empty() {
            return Ok(Self::empty());
        }

        actions.split(',').try_fold(Self::empty(), |mask, token| {
            let token = token.trim_matches(ACTION_WHITESPACE);
            Self::from_action_name(token)
                .map(|flag| mask | flag)
                .ok_or_else(|| PermissionError::invalid_actions(actions))
        })
    }

    /// Look up a single action name, ignoring ASCII case.
    pub fn from_action_name(name: &str) -> Option<Self> {
        ACTION_NAMES
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|(_, flag)| *flag)
    }

    /// Iterate over the action names set in this mask, in canonical order.
    pub fn action_names(self) -> impl Iterator<Item = &'static str> {
        ACTION_NAMES
            .iter()
            .filter(move |(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
    }

    /// Render the mask as its canonical action string.
    pub fn render(self) -> String {
        self.action_names().collect::<Vec<_>>().join(",")
    }

    /// Check whether this mask grants every action in `requested`.
    pub fn covers(self, requested: Self) -> bool {
        self & requested == requested
    }
}

impl fmt::Display for ActionMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromStr for ActionMask {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_action_any_case() {
        assert_eq!(ActionMask::parse("read").unwrap(), ActionMask::READ);
        assert_eq!(ActionMask::parse("Read").unwrap(), ActionMask::READ);
        assert_eq!(ActionMask::parse(" READ ").unwrap(), ActionMask::READ);
        assert_eq!(ActionMask::parse("wRiTe").unwrap(), ActionMask::WRITE);
    }

    #[test]
    fn test_parse_order_independent() {
        let a = ActionMask::parse("read,write").unwrap();
        let b = ActionMask::parse("write,read").unwrap();

        assert_eq!(a, b);
        assert_eq!(a, ActionMask::all());
        assert_eq!(b.render(), "read,write");
    }

    #[test]
    fn test_parse_trims_all_whitespace_kinds() {
        let mask = ActionMask::parse("\tread\r\n,\x0c write ").unwrap();
        assert_eq!(mask, ActionMask::all());
    }

    #[test]
    fn test_parse_duplicates_idempotent() {
        assert_eq!(ActionMask::parse("read,READ,read").unwrap(), ActionMask::READ);
    }

    #[test]
    fn test_parse_empty_is_empty_mask() {
        assert!(ActionMask::parse("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["readx", "rea", "ead", ",", "read,", ",write", "   ", "read write", "execute"] {
            let err = ActionMask::parse(bad).unwrap_err();
            assert_eq!(
                err,
                PermissionError::InvalidActionString {
                    actions: bad.to_string()
                },
                "expected {bad:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_render_canonical() {
        assert_eq!(ActionMask::READ.render(), "read");
        assert_eq!(ActionMask::WRITE.render(), "write");
        assert_eq!(ActionMask::all().render(), "read,write");
        assert_eq!(ActionMask::empty().render(), "");
    }

    #[test]
    fn test_render_parse_stable() {
        for input in ["read", " Write", "write , read", "READ,read"] {
            let mask = ActionMask::parse(input).unwrap();
            let rendered = mask.render();
            assert_eq!(ActionMask::parse(&rendered).unwrap(), mask);
            assert_eq!(ActionMask::parse(&rendered).unwrap().render(), rendered);
        }
    }

    #[test]
    fn test_covers() {
        let all = ActionMask::all();
        assert!(all.covers(ActionMask::READ));
        assert!(all.covers(all));
        assert!(!ActionMask::READ.covers(all));
        assert!(ActionMask::WRITE.covers(ActionMask::empty()));
    }

    #[test]
    fn test_from_str() {
        let mask: ActionMask = "write".parse().unwrap();
        assert_eq!(mask, ActionMask::WRITE);
        assert_eq!(mask.to_string(), "write");
    }
}
