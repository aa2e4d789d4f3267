//! Configuration types for the access controller.
//!
//! Configuration is plain data assembled in code; there is no file format.

/// Configuration for an [`AccessController`](crate::AccessController).
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Record every check in the controller's metrics collector.
    pub collect_metrics: bool,

    /// Emit grant and check events to subscribers.
    ///
    /// Events are only built when at least one subscriber is registered.
    pub emit_events: bool,

    /// Maximum number of denied checks kept for inspection.
    ///
    /// Defaults to 256.
    pub max_denials_retained: usize,

    /// Maximum number of distinct requested names given their own check
    /// counter. Checks for further names only count toward the totals.
    ///
    /// Defaults to 1024.
    pub max_tracked_names: usize,

    /// Initial capacity of the property permission map.
    ///
    /// Defaults to 32, enough for a typical default policy.
    pub initial_capacity: usize,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            collect_metrics: true,
            emit_events: true,
            max_denials_retained: 256,
            max_tracked_names: 1024,
            initial_capacity: 32,
        }
    }
}

impl ControllerConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable metrics collection.
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.collect_metrics = enabled;
        self
    }

    /// Enable or disable event emission.
    pub fn with_events(mut self, enabled: bool) -> Self {
        self.emit_events = enabled;
        self
    }

    /// Set how many denied checks are retained.
    pub fn with_max_denials(mut self, count: usize) -> Self {
        self.max_denials_retained = count;
        self
    }

    /// Set how many distinct names get their own check counter.
    pub fn with_max_tracked_names(mut self, count: usize) -> Self {
        self.max_tracked_names = count;
        self
    }

    /// Set the initial capacity of the property permission map.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Create a configuration that only answers checks.
    ///
    /// No metrics are recorded and no events are emitted.
    pub fn quiet() -> Self {
        Self {
            collect_metrics: false,
            emit_events: false,
            max_denials_retained: 0,
            max_tracked_names: 0,
            ..Self::default()
        }
    }

    /// Create a configuration for auditing, retaining many more denials.
    pub fn audited() -> Self {
        Self {
            collect_metrics: true,
            emit_events: true,
            max_denials_retained: 4096,
            max_tracked_names: 16_384,
            ..Self::default()
        }
    }

    /// Check whether checks need to be timed at all.
    pub(crate) fn observes_checks(&self) -> bool {
        self.collect_metrics || self.emit_events
    }
}
