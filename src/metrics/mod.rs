use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;

/// Operation counters accumulated by a map session.
#[derive(Debug, Default, Clone)]
pub struct MapMetrics {
    lookups: u64,
    misses: u64,
    removals: u64,
    noop_removals: u64,
    replacements: u64,
}

impl MapMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_lookup(&mut self, hit: bool) {
        self.lookups = self.lookups.saturating_add(1);
        if !hit {
            self.misses = self.misses.saturating_add(1);
        }
    }

    pub fn record_removal(&mut self, effective: bool) {
        if effective {
            self.removals = self.removals.saturating_add(1);
        } else {
            self.noop_removals = self.noop_removals.saturating_add(1);
        }
    }

    pub fn record_replacement(&mut self) {
        self.replacements = self.replacements.saturating_add(1);
    }

    pub fn snapshot(&self) -> MetricSnapshot {
        MetricSnapshot {
            lookups: self.lookups,
            misses: self.misses,
            removals: self.removals,
            noop_removals: self.noop_removals,
            replacements: self.replacements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub lookups: u64,
    pub misses: u64,
    pub removals: u64,
    pub noop_removals: u64,
    pub replacements: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(
            LogLevel::Info,
            target.to_string(),
            "session_metrics".to_string(),
            self.as_fields(),
        )
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("lookups".to_string(), json!(self.lookups));
        map.insert("misses".to_string(), json!(self.misses));
        map.insert("removals".to_string(), json!(self.removals));
        map.insert("noop_removals".to_string(), json!(self.noop_removals));
        map.insert("replacements".to_string(), json!(self.replacements));
        map
    }
}
