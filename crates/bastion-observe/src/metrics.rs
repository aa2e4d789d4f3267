//! Metrics collection for access checks.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use bastion_permission::Permission;

/// Default number of denied checks retained for inspection.
const DEFAULT_MAX_DENIALS: usize = 256;

/// Default number of distinct names given their own check counter.
const DEFAULT_MAX_TRACKED_NAMES: usize = 1024;

/// Collects metrics about permission checks.
///
/// Checks arrive from many threads at once; per-name counters live in a
/// concurrent map so concurrent readers do not serialize on a single lock.
///
/// Requested names are caller-supplied, so only the first
/// `max_tracked_names` distinct names get a counter. Checks for any other
/// name are counted in [`CheckTotals::untracked`].
pub struct MetricsCollector {
    /// Totals across all checks.
    totals: RwLock<CheckTotals>,
    /// Check count per requested name.
    per_name: DashMap<String, u64>,
    /// Most recent denied checks, oldest first.
    denials: RwLock<VecDeque<DeniedCheck>>,
    max_denials: usize,
    max_tracked_names: usize,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsCollector {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::with_max_denials(DEFAULT_MAX_DENIALS)
    }

    /// Create a collector that retains at most `max_denials` denied checks.
    pub fn with_max_denials(max_denials: usize) -> Self {
        Self::with_limits(max_denials, DEFAULT_MAX_TRACKED_NAMES)
    }

    /// Create a collector with explicit bounds on retained denials and on
    /// distinct names counted individually.
    pub fn with_limits(max_denials: usize, max_tracked_names: usize) -> Self {
        Self {
            totals: RwLock::new(CheckTotals::default()),
            per_name: DashMap::new(),
            denials: RwLock::new(VecDeque::new()),
            max_denials,
            max_tracked_names,
        }
    }

    /// Record a granted permission.
    pub fn record_grant(&self) {
        self.totals.write().grants += 1;
    }

    /// Record an answered check.
    pub fn record_check(&self, permission: &Permission, permitted: bool, duration: Duration) {
        let tracked = self.count_name(permission.name());
        {
            let mut totals = self.totals.write();
            totals.checks += 1;
            if permitted {
                totals.permitted += 1;
            } else {
                totals.denied += 1;
            }
            if !tracked {
                totals.untracked += 1;
            }
            totals.check_time += duration;
        }

        if !permitted {
            self.record_denial(permission);
        }
    }

    /// Bump the counter for `name`, returning `false` if the map is full.
    fn count_name(&self, name: &str) -> bool {
        if let Some(mut count) = self.per_name.get_mut(name) {
            *count += 1;
            return true;
        }
        // Concurrent first sightings may overshoot the bound by a few entries.
        if self.per_name.len() >= self.max_tracked_names {
            return false;
        }
        *self.per_name.entry(name.to_string()).or_insert(0) += 1;
        true
    }

    fn record_denial(&self, permission: &Permission) {
        if self.max_denials == 0 {
            return;
        }

        let mut denials = self.denials.write();
        if denials.len() == self.max_denials {
            denials.pop_front();
        }
        denials.push_back(DeniedCheck {
            permission: permission.to_string(),
            timestamp: Instant::now(),
        });
    }

    /// Get the number of checks recorded for a name.
    pub fn checks_for(&self, name: &str) -> u64 {
        self.per_name.get(name).map_or(0, |count| *count)
    }

    /// Get the retained denied checks, oldest first.
    pub fn denials(&self) -> Vec<DeniedCheck> {
        self.denials.read().iter().cloned().collect()
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            totals: self.totals.read().clone(),
            per_name: self
                .per_name
                .iter()
                .map(|entry| (entry.key().clone(), *entry.value()))
                .collect(),
            recent_denials: self
                .denials
                .read()
                .iter()
                .map(|denial| denial.permission.clone())
                .collect(),
        }
    }

    /// Reset all metrics.
    pub fn reset(&self) {
        *self.totals.write() = CheckTotals::default();
        self.per_name.clear();
        self.denials.write().clear();
    }
}

impl std::fmt::Debug for MetricsCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsCollector")
            .field("totals", &*self.totals.read())
            .field("names", &self.per_name.len())
            .finish()
    }
}

/// Snapshot of collected metrics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Totals across all checks.
    pub totals: CheckTotals,
    /// Check count per requested name.
    pub per_name: HashMap<String, u64>,
    /// Rendered permissions of the retained denied checks.
    pub recent_denials: Vec<String>,
}

impl MetricsSnapshot {
    /// Fraction of checks that were denied, or `0.0` when nothing was checked.
    pub fn denial_rate(&self) -> f64 {
        if self.totals.checks == 0 {
            return 0.0;
        }
        self.totals.denied as f64 / self.totals.checks as f64
    }

    /// Render the snapshot as pretty-printed JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Counters across all checks.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckTotals {
    /// Permissions granted.
    pub grants: u64,
    /// Checks answered.
    pub checks: u64,
    /// Checks that were implied.
    pub permitted: u64,
    /// Checks that were not implied.
    pub denied: u64,
    /// Checks whose name had no per-name counter left.
    pub untracked: u64,
    /// Total time spent answering checks.
    #[serde(with = "duration_serde")]
    pub check_time: Duration,
}

/// A denied check.
#[derive(Debug, Clone)]
pub struct DeniedCheck {
    /// The requested permission, rendered.
    pub permission: String,
    /// When the denial occurred.
    pub timestamp: Instant,
}

/// Custom serde for Duration.
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_nanos() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn property(name: &str, actions: &str) -> Permission {
        Permission::property(name, actions).unwrap()
    }

    #[test]
    fn test_record_checks() {
        let collector = MetricsCollector::new();
        let home = property("java.home", "read");

        collector.record_grant();
        collector.record_check(&home, true, Duration::from_nanos(40));
        collector.record_check(&home, false, Duration::from_nanos(60));

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.totals.grants, 1);
        assert_eq!(snapshot.totals.checks, 2);
        assert_eq!(snapshot.totals.permitted, 1);
        assert_eq!(snapshot.totals.denied, 1);
        assert_eq!(snapshot.totals.check_time, Duration::from_nanos(100));
        assert_eq!(collector.checks_for("java.home"), 2);
        assert_eq!(collector.checks_for("other"), 0);
        assert_eq!(snapshot.denial_rate(), 0.5);
    }

    #[test]
    fn test_denials_are_bounded() {
        let collector = MetricsCollector::with_max_denials(2);

        for name in ["a", "b", "c"] {
            collector.record_check(&property(name, "write"), false, Duration::ZERO);
        }

        let denials = collector.denials();
        assert_eq!(denials.len(), 2);
        assert_eq!(denials[0].permission, r#"(property "b" "write")"#);
        assert_eq!(denials[1].permission, r#"(property "c" "write")"#);
    }

    #[test]
    fn test_tracked_names_are_bounded() {
        let collector = MetricsCollector::with_limits(0, 3);

        for i in 0..100 {
            collector.record_check(&property(&format!("n{i}"), "read"), false, Duration::ZERO);
        }
        // Names already tracked keep counting once the map is full.
        collector.record_check(&property("n0", "read"), true, Duration::ZERO);

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.per_name.len(), 3);
        assert_eq!(collector.checks_for("n0"), 2);
        assert_eq!(collector.checks_for("n99"), 0);
        assert_eq!(snapshot.totals.checks, 101);
        assert_eq!(snapshot.totals.untracked, 97);
    }

    #[test]
    fn test_zero_denials_retained() {
        let collector = MetricsCollector::with_max_denials(0);
        collector.record_check(&property("a", "read"), false, Duration::ZERO);

        assert!(collector.denials().is_empty());
        assert_eq!(collector.snapshot().totals.denied, 1);
    }

    #[test]
    fn test_snapshot_json() {
        let collector = MetricsCollector::new();
        collector.record_check(&property("a.b", "read"), false, Duration::from_nanos(5));

        let json = collector.snapshot().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["totals"]["denied"], 1);
        assert_eq!(value["totals"]["check_time"], 5);
        assert_eq!(value["per_name"]["a.b"], 1);
        assert_eq!(value["recent_denials"][0], r#"(property "a.b" "read")"#);
    }

    #[test]
    fn test_reset() {
        let collector = MetricsCollector::new();
        collector.record_check(&property("a", "read"), false, Duration::ZERO);

        collector.reset();

        let snapshot = collector.snapshot();
        assert_eq!(snapshot.totals.checks, 0);
        assert!(snapshot.per_name.is_empty());
        assert!(collector.denials().is_empty());
        assert_eq!(snapshot.denial_rate(), 0.0);
    }
}
