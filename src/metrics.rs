//! # Notification Metrics
//!
//! In-process counters and gauges read by an external collector. Counter values
//! only ever increase; gauges hold the last value set.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct NotificationMetrics {
    counters: DashMap<String, u64>,
    error_counters: DashMap<String, u64>,
    gauges: DashMap<String, i64>,
    help: DashMap<String, String>,
}

/// Point-in-time copy of every metric
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<String, u64>,
    pub error_counters: BTreeMap<String, u64>,
    pub gauges: BTreeMap<String, i64>,
}

impl NotificationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_counter(&self, name: &str, help: &str) {
        self.counters.entry(name.to_string()).or_insert(0);
        self.error_counters.entry(name.to_string()).or_insert(0);
        self.help.insert(name.to_string(), help.to_string());
    }

    pub fn register_gauge(&self, name: &str, help: &str) {
        self.gauges.entry(name.to_string()).or_insert(0);
        self.help.insert(name.to_string(), help.to_string());
    }

    pub fn increment_count(&self, name: &str) {
        *self.counters.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn increment_error_count(&self, name: &str) {
        *self.error_counters.entry(name.to_string()).or_insert(0) += 1;
    }

    pub fn set_gauge(&self, name: &str, value: i64) {
        self.gauges.insert(name.to_string(), value);
    }

    pub fn count(&self, name: &str) -> u64 {
        self.counters.get(name).map_or(0, |v| *v)
    }

    pub fn error_count(&self, name: &str) -> u64 {
        self.error_counters.get(name).map_or(0, |v| *v)
    }

    pub fn gauge(&self, name: &str) -> Option<i64> {
        self.gauges.get(name).map(|v| *v)
    }

    pub fn help(&self, name: &str) -> Option<String> {
        self.help.get(name).map(|v| v.clone())
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            counters: self
                .counters
                .iter()
                .map(|e| (e.key().clone(), *e.value()))
                .collect(),
            error_counters: self
                .error_counters
                .iter()
                .map(|e| (e.key().clone(), *e.value()))
                .collect(),
            gauges: self
                .gauges
                .iter()
                .map(|e| (e.key().clone(), *e.value()))
                .collect(),
        }
    }
}
