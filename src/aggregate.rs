//! Fan-in of one metric across all reporting hosts.

use crate::series::{MetricSeries, ValueKind};
use std::collections::HashMap;

/// One metric, summed over hosts.
#[derive(Debug, Clone, Default)]
pub struct MetricAggregate {
    hosts: HashMap<String, MetricSeries>,
    peak_rate: f64,
}

impl MetricAggregate {
    /// Creates an aggregate with no hosts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one sample from `host`, creating its series on first use.
    /// The kind of an existing series is never changed.
    pub fn record(&mut self, host: &str, kind: ValueKind, value: i64, now: f64) {
        if let Some(series) = self.hosts.get_mut(host) {
            series.apply(value, now);
            return;
        }
        let mut series = MetricSeries::new(kind);
        series.apply(value, now);
        self.hosts.insert(host.to_string(), series);
    }

    /// Sum of the latest values of all hosts.
    #[must_use]
    pub fn total_value(&self) -> f64 {
        self.hosts.values().map(|s| s.value() as f64).sum()
    }

    /// Sum of the smoothed rates of all hosts. Does not touch the peak.
    #[must_use]
    pub fn total_rate(&self, now: f64) -> f64 {
        self.hosts.values().map(|s| s.rate(now)).sum()
    }

    /// Highest total rate returned by [`Self::record_and_get_rate`] so far.
    #[must_use]
    pub fn peak_rate(&self) -> f64 {
        self.peak_rate
    }

    /// Computes the total rate and folds it into the peak.
    ///
    /// Renderers color a rate relative to the peak seen *before* this
    /// tick, so read [`Self::peak_rate`] first and call this afterwards.
    /// Reversing the two calls makes the current rate its own reference
    /// and shifts every tick toward the top tier.
    pub fn record_and_get_rate(&mut self, now: f64) -> f64 {
        let rate = self.total_rate(now);
        self.peak_rate = self.peak_rate.max(rate);
        rate
    }

    /// True if any host reported recently.
    #[must_use]
    pub fn is_fresh(&self, now: f64) -> bool {
        self.hosts.values().any(|s| s.is_fresh(now))
    }

    /// Number of hosts that reported this metric.
    #[must_use]
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Series for one host.
    #[must_use]
    pub fn host(&self, host: &str) -> Option<&MetricSeries> {
        self.hosts.get(host)
    }
}
