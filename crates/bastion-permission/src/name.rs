//! Hierarchical permission names.
//!
//! Names are `.`-separated segments such as `java.home`. A name whose last
//! segment is the literal `*` grants everything below its prefix, and the bare
//! name `*` grants every name.

/// The global wildcard name.
pub const WILDCARD: &str = "*";

/// Suffix that turns a name into a prefix wildcard.
const WILDCARD_SUFFIX: &str = ".*";

/// Check whether a granted name covers a requested name.
///
/// - equal names always match;
/// - `*` matches every name;
/// - `prefix.*` matches `prefix.` followed by at least one character, so
///   `a.*` covers `a.b` and `a.*` but neither `a` nor `ab.c`;
/// - any other granted name matches only itself.
///
/// ```
/// use bastion_permission::name::matches;
///
/// assert!(matches("java.*", "java.home"));
/// assert!(!matches("java.*", "javax.home"));
/// assert!(!matches("java.*", "java"));
/// ```
pub fn matches(granted: &str, requested: &str) -> bool {
    if granted == requested || granted == WILDCARD {
        return true;
    }

    granted
        .strip_suffix(WILDCARD_SUFFIX)
        .and_then(|prefix| requested.strip_prefix(prefix))
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|rest| !rest.is_empty())
}

/// Iterate over the wildcard names that could grant `name`, nearest first.
///
/// For `a.b.c` this yields `a.b.*` then `a.*`. The global wildcard is not
/// included. A name ending in `.*` yields itself first.
pub fn wildcard_ancestors(name: &str) -> WildcardAncestors<'_> {
    WildcardAncestors {
        name,
        end: name.len(),
    }
}

/// Iterator returned by [`wildcard_ancestors`].
#[derive(Debug, Clone)]
pub struct WildcardAncestors<'a> {
    name: &'a str,
    // Only dots before this byte offset are still to be visited.
    end: usize,
}

impl Iterator for WildcardAncestors<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let last = self.name[..self.end].rfind('.')?;
        self.end = last;

        let mut candidate = String::with_capacity(last + 2);
        candidate.push_str(&self.name[..=last]);
        candidate.push_str(WILDCARD);
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches("java.home", "java.home"));
        assert!(!matches("java.home", "java.homes"));
        assert!(!matches("java", "java.home"));
    }

    #[test]
    fn test_prefix_wildcard() {
        assert!(matches("java.*", "java.home"));
        assert!(matches("java.*", "java.vm.version"));
        assert!(matches("java.*", "java.*"));
        assert!(!matches("java.*", "javax.home"));
        assert!(!matches("java.*", "java"));
        assert!(!matches("java.*", "java."));
    }

    #[test]
    fn test_no_non_dot_bounded_prefix() {
        assert!(!matches("a.*", "ab.c"));
        assert!(!matches("a.b.*", "a.bc"));
    }

    #[test]
    fn test_global_wildcard() {
        assert!(matches("*", "anything"));
        assert!(matches("*", "a.b.c"));
        assert!(matches("*", "*"));
        assert!(!matches("a.b", "*"));
    }

    #[test]
    fn test_wildcard_only_at_end() {
        // A star in the middle is an ordinary character.
        assert!(!matches("a.*.c", "a.b.c"));
        assert!(matches("a.*.c", "a.*.c"));
    }

    #[test]
    fn test_wildcard_ancestors() {
        let walk: Vec<_> = wildcard_ancestors("a.b.c").collect();
        assert_eq!(walk, vec!["a.b.*", "a.*"]);

        assert_eq!(wildcard_ancestors("plain").count(), 0);
        assert_eq!(wildcard_ancestors("").count(), 0);
    }

    #[test]
    fn test_wildcard_ancestors_of_wildcard_name() {
        let walk: Vec<_> = wildcard_ancestors("a.b.*").collect();
        assert_eq!(walk, vec!["a.b.*", "a.*"]);
    }

    #[test]
    fn test_wildcard_ancestors_trailing_dot() {
        let walk: Vec<_> = wildcard_ancestors("a.b.").collect();
        assert_eq!(walk, vec!["a.b.*", "a.*"]);
    }
}
