//! Per-host metric state and rate smoothing.
//!
//! A [`MetricSeries`] keeps three snapshots of one metric on one host:
//!
//! - `latest`: updated by every sample, read by [`MetricSeries::value`]
//! - `previous` / `current`: a window at least [`WINDOW_SECS`] wide, read by
//!   [`MetricSeries::rate`]
//!
//! Samples can arrive milliseconds apart. Computing a rate from two samples
//! that close together makes the displayed number jump around, so the rate
//! window only rotates once `latest` has moved half a second past `current`.

use crate::error::TableError;
use serde::{Deserialize, Serialize};

/// Minimum width of the rate window, and the idle gap after which the
/// window is discarded.
pub const WINDOW_SECS: f64 = 0.5;

/// How long after its last sample a series is still displayed.
pub const FRESHNESS_SECS: f64 = 3.0;

/// How far back the window start is placed when it is rebased.
const REBASE_OFFSET_SECS: f64 = 1.0;

/// How an incoming sample combines with the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// The sample is a delta added to a running total.
    Cumulative,
    /// The sample replaces the stored value.
    Gauge,
}

impl TryFrom<i64> for ValueKind {
    type Error = TableError;

    fn try_from(raw: i64) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Cumulative),
            1 => Ok(Self::Gauge),
            other => Err(TableError::InvalidKind(other)),
        }
    }
}

/// A value observed at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Snapshot {
    /// Metric value.
    pub value: i64,
    /// Seconds since the registry clock started.
    pub time: f64,
}

impl Snapshot {
    /// Creates a snapshot.
    #[must_use]
    pub const fn new(value: i64, time: f64) -> Self {
        Self { value, time }
    }
}

/// One metric reported by one host.
#[derive(Debug, Clone)]
pub struct MetricSeries {
    kind: ValueKind,
    previous: Snapshot,
    current: Snapshot,
    latest: Snapshot,
    last_update: Option<f64>,
}

impl MetricSeries {
    /// Creates an empty series. The kind never changes afterwards.
    #[must_use]
    pub fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            previous: Snapshot::default(),
            current: Snapshot::default(),
            latest: Snapshot::default(),
            last_update: None,
        }
    }

    /// Folds one sample into the series.
    pub fn apply(&mut self, value: i64, now: f64) {
        if self.last_update.is_none() || now - self.latest.time >= WINDOW_SECS {
            self.rebase(now);
        }

        self.latest.value = match self.kind {
            ValueKind::Cumulative => self.latest.value.saturating_add(value),
            ValueKind::Gauge => value,
        };
        self.latest.time = now;

        if self.latest.time - self.current.time >= WINDOW_SECS {
            self.previous = std::mem::replace(&mut self.current, self.latest);
        }

        self.last_update = Some(now);
    }

    /// Drops the in-flight window after an idle gap. Both window ends are
    /// pinned to the last known value one second in the past, so a burst
    /// after silence is measured against a flat baseline.
    fn rebase(&mut self, now: f64) {
        let anchor = Snapshot::new(self.latest.value, now - REBASE_OFFSET_SECS);
        self.previous = anchor;
        self.current = anchor;
    }

    /// Smoothed per-second change. Zero when nothing arrived in the last
    /// half second.
    #[must_use]
    pub fn rate(&self, now: f64) -> f64 {
        if self.last_update.is_none() || now - self.latest.time >= WINDOW_SECS {
            return 0.0;
        }

        let span = self.current.time - self.previous.time;
        if span <= 0.0 {
            return 0.0;
        }
        // Gauges may span the whole i64 range; the difference may not fit.
        (self.current.value as f64 - self.previous.value as f64) / span
    }

    /// Latest value.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.latest.value
    }

    /// True if a sample arrived within [`FRESHNESS_SECS`] of `now`.
    ///
    /// A series that was never updated is stale. Unlike a zero-timestamp
    /// sentinel, a sample taken exactly at clock zero still counts as fresh.
    #[must_use]
    pub fn is_fresh(&self, now: f64) -> bool {
        self.last_update
            .is_some_and(|updated| now - updated <= FRESHNESS_SECS)
    }

    /// Value kind fixed at creation.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Start of the rate window.
    #[must_use]
    pub fn previous(&self) -> Snapshot {
        self.previous
    }

    /// End of the rate window.
    #[must_use]
    pub fn current(&self) -> Snapshot {
        self.current
    }

    /// Most recent sample.
    #[must_use]
    pub fn latest(&self) -> Snapshot {
        self.latest
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_kind_from_raw() {
        assert_eq!(ValueKind::try_from(0).unwrap(), ValueKind::Cumulative);
        assert_eq!(ValueKind::try_from(1).unwrap(), ValueKind::Gauge);
        assert!(matches!(
            ValueKind::try_from(2),
            Err(TableError::InvalidKind(2))
        ));
    }

    #[test]
    fn test_rebase_pins_window_one_second_back() {
        let mut series = MetricSeries::new(ValueKind::Cumulative);
        series.apply(10, 0.0);

        series.rebase(10.0);
        assert_eq!(series.previous(), Snapshot::new(10, 9.0));
        assert_eq!(series.current(), Snapshot::new(10, 9.0));
    }

    #[test]
    fn test_sample_after_idle_measures_burst_only() {
        let mut series = MetricSeries::new(ValueKind::Cumulative);
        series.apply(10, 0.0);
        series.apply(5, 10.0);

        assert_eq!(series.value(), 15);
        assert_eq!(series.previous(), Snapshot::new(10, 9.0));
        assert_eq!(series.current(), Snapshot::new(15, 10.0));
        assert_relative_eq!(series.rate(10.0), 5.0);
    }

    #[test]
    fn test_cumulative_rate_over_one_second_window() {
        let mut series = MetricSeries::new(ValueKind::Cumulative);
        series.apply(100, 0.0);
        series.apply(150, 1.0);

        assert_eq!(series.value(), 250);
        assert_relative_eq!(series.rate(1.0), 150.0, epsilon = 1e-9);
    }

    #[test]
    fn test_gauge_rate_is_difference_of_readings() {
        let mut series = MetricSeries::new(ValueKind::Gauge);
        series.apply(100, 0.0);
        series.apply(150, 1.0);

        assert_relative_eq!(series.rate(1.0), 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_gauge_replaces_value() {
        let mut series = MetricSeries::new(ValueKind::Gauge);
        series.apply(10, 0.0);
        series.apply(3, 1.0);
        assert_eq!(series.value(), 3);
    }

    #[test]
    fn test_close_samples_do_not_rotate_window() {
        let mut series = MetricSeries::new(ValueKind::Cumulative);
        series.apply(100, 1.0);
        let window = (series.previous(), series.current());

        series.apply(1, 1.1);
        series.apply(1, 1.2);

        assert_eq!((series.previous(), series.current()), window);
        assert_eq!(series.latest(), Snapshot::new(102, 1.2));
    }

    #[test]
    fn test_window_rotates_after_half_second() {
        let mut series = MetricSeries::new(ValueKind::Cumulative);
        series.apply(100, 1.0);
        series.apply(10, 1.3);
        series.apply(10, 1.6);
        series.apply(10, 1.9);
        series.apply(10, 2.2);

        // Rotated at 1.6 (window 1.0..1.6) and again at 2.2.
        assert_eq!(series.previous(), Snapshot::new(120, 1.6));
        assert_eq!(series.current(), Snapshot::new(140, 2.2));
        assert_relative_eq!(series.rate(2.2), 20.0 / 0.6, epsilon = 1e-9);
    }

    #[test]
    fn test_rate_drops_to_zero_without_recent_sample() {
        let mut series = MetricSeries::new(ValueKind::Cumulative);
        series.apply(100, 1.0);

        assert!(series.rate(1.4) > 0.0);
        assert_eq!(series.rate(1.5), 0.0);
        assert_eq!(series.rate(7.0), 0.0);
    }

    #[test]
    fn test_reads_are_idempotent() {
        let mut series = MetricSeries::new(ValueKind::Cumulative);
        series.apply(40, 0.0);
        series.apply(20, 0.7);

        assert_eq!(series.value(), series.value());
        assert_eq!(series.rate(0.8), series.rate(0.8));
    }

    #[test]
    fn test_freshness_boundary() {
        let mut series = MetricSeries::new(ValueKind::Gauge);
        series.apply(1, 5.0);

        assert!(series.is_fresh(8.0));
        assert!(!series.is_fresh(8.01));
    }

    #[test]
    fn test_empty_series_is_not_fresh() {
        let series = MetricSeries::new(ValueKind::Cumulative);
        assert!(!series.is_fresh(0.0));
        assert_eq!(series.rate(0.0), 0.0);
        assert_eq!(series.value(), 0);
    }

    #[test]
    fn test_sample_at_time_zero_is_fresh() {
        let mut series = MetricSeries::new(ValueKind::Cumulative);
        series.apply(1, 0.0);
        assert!(series.is_fresh(0.0));
    }

    #[test]
    fn test_gauge_rate_across_full_i64_range() {
        let mut series = MetricSeries::new(ValueKind::Gauge);
        series.apply(i64::MIN, 0.0);
        series.apply(i64::MAX, 1.0);

        let expected = i64::MAX as f64 - i64::MIN as f64;
        assert_relative_eq!(series.rate(1.0), expected, max_relative = 1e-12);
        assert!(series.rate(1.0) > 0.0);
    }

    #[test]
    fn test_cumulative_saturates_instead_of_wrapping() {
        let mut series = MetricSeries::new(ValueKind::Cumulative);
        series.apply(i64::MAX, 0.0);
        series.apply(i64::MAX, 1.0);

        assert_eq!(series.value(), i64::MAX);
        assert!(series.rate(1.0).is_finite());
    }
}
