//! Metric registry: ingestion, recency ordering and lifecycle.
//!
//! The registry owns every [`MetricAggregate`], the elapsed-time clock and
//! the name column width. It is not synchronised on its own;
//! [`crate::table::ProgressTable`] wraps it in a mutex.

use crate::aggregate::MetricAggregate;
use crate::batch::{EventRecord, AGGREGATE_SCOPE};
use crate::catalog::{MetricCatalog, MetricInfo, Unit};
use crate::clock::{Clock, Stopwatch};
use crate::order::RecencyList;
use tracing::{debug, trace};

/// Default floor for the name column.
pub const DEFAULT_NAME_WIDTH: usize = 20;

/// A registered metric: catalog info plus per-host state.
#[derive(Debug, Clone)]
pub struct MetricEntry {
    info: MetricInfo,
    aggregate: MetricAggregate,
}

impl MetricEntry {
    fn new(info: MetricInfo) -> Self {
        Self { info, aggregate: MetricAggregate::new() }
    }

    /// Catalog info captured when the metric was first seen.
    #[must_use]
    pub fn info(&self) -> &MetricInfo {
        &self.info
    }

    /// Per-host state.
    #[must_use]
    pub fn aggregate(&self) -> &MetricAggregate {
        &self.aggregate
    }

    /// Mutable per-host state.
    pub fn aggregate_mut(&mut self) -> &mut MetricAggregate {
        &mut self.aggregate
    }
}

/// What happened to the rows of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Rows folded into the registry.
    pub accepted: usize,
    /// Rows for a per-thread scope.
    pub foreign_scope: usize,
    /// Rows carrying zero.
    pub zero_value: usize,
    /// Rows whose name the catalog does not know.
    pub unknown_name: usize,
}

/// One line of the final summary.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// Metric name.
    pub name: String,
    /// Unit, for formatting.
    pub unit: Unit,
    /// Latest value summed over hosts.
    pub value: f64,
}

/// Ordered collection of metrics, most recently updated first.
#[derive(Debug)]
pub struct MetricRegistry<C: Clock = Stopwatch> {
    metrics: RecencyList<MetricEntry>,
    clock: C,
    name_width: usize,
}

impl Default for MetricRegistry<Stopwatch> {
    fn default() -> Self {
        Self::new(Stopwatch::new())
    }
}

impl<C: Clock> MetricRegistry<C> {
    /// Creates an empty registry with the default name column floor.
    pub fn new(clock: C) -> Self {
        Self::with_min_name_width(clock, DEFAULT_NAME_WIDTH)
    }

    /// Creates an empty registry whose name column is at least
    /// `min_name_width` wide.
    pub fn with_min_name_width(clock: C, min_name_width: usize) -> Self {
        Self { metrics: RecencyList::new(), clock, name_width: min_name_width }
    }

    /// Seconds since the registry was created or last reset.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.clock.elapsed_seconds()
    }

    /// Folds a batch of rows into the registry.
    ///
    /// Only whole-query rows with a non-zero value and a catalog-known name
    /// are kept. Rows are applied sorted by name descending, then by their
    /// position in the batch, so that after the batch the touched names sit
    /// at the front in ascending name order while per-host updates keep
    /// their arrival order.
    pub fn ingest(&mut self, batch: &[EventRecord], catalog: &dyn MetricCatalog) -> IngestStats {
        let now = self.now();
        let mut stats = IngestStats::default();

        let mut rows: Vec<(&str, usize)> = Vec::with_capacity(batch.len());
        for (position, record) in batch.iter().enumerate() {
            if record.scope_id == AGGREGATE_SCOPE {
                rows.push((record.name.as_str(), position));
            } else {
                stats.foreign_scope += 1;
            }
        }
        rows.sort_by(|a, b| b.0.cmp(a.0).then(a.1.cmp(&b.1)));

        for (name, position) in rows {
            let record = &batch[position];

            let Some(info) = catalog.lookup(name) else {
                trace!(name, "skipping metric unknown to the catalog");
                stats.unknown_name += 1;
                continue;
            };
            if record.value == 0 {
                stats.zero_value += 1;
                continue;
            }

            self.metrics
                .touch_or_insert_with(name, || MetricEntry::new(info.clone()))
                .aggregate
                .record(&record.host, record.kind, record.value, now);

            // One blank column after the longest name.
            self.name_width = self.name_width.max(name.chars().count() + 1);
            stats.accepted += 1;
        }

        debug!(
            rows = batch.len(),
            accepted = stats.accepted,
            foreign_scope = stats.foreign_scope,
            zero_value = stats.zero_value,
            unknown_name = stats.unknown_name,
            "ingested batch"
        );
        stats
    }

    /// Number of metrics with at least one fresh host.
    #[must_use]
    pub fn fresh_count(&self, now: f64) -> usize {
        self.metrics.iter().filter(|(_, entry)| entry.aggregate.is_fresh(now)).count()
    }

    /// Every metric ever recorded, in display order, with its latest value.
    /// Does not change the order.
    #[must_use]
    pub fn finalize(&self) -> Vec<SummaryRow> {
        self.metrics
            .iter()
            .map(|(name, entry)| SummaryRow {
                name: name.to_string(),
                unit: entry.info.unit,
                value: entry.aggregate.total_value(),
            })
            .collect()
    }

    /// Drops every metric and restarts the clock.
    pub fn reset(&mut self) {
        debug!(metrics = self.metrics.len(), "resetting registry");
        self.metrics.clear();
        self.clock.restart();
    }

    /// Width of the name column: the floor, or the widest name seen plus
    /// one separating column.
    #[must_use]
    pub fn name_column_width(&self) -> usize {
        self.name_width
    }

    /// Number of registered metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    /// True if nothing has been recorded since the last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }

    /// Metric by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&MetricEntry> {
        self.metrics.get(name)
    }

    /// Metric names, front to back.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.metrics.iter().map(|(name, _)| name).collect()
    }

    /// Front-to-back iterator over `(name, entry)`.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &MetricEntry)> {
        self.metrics.iter()
    }

    /// Visits every metric front to back with mutable access.
    pub fn try_for_each_mut<E>(
        &mut self,
        f: impl FnMut(&str, &mut MetricEntry) -> Result<(), E>,
    ) -> Result<(), E> {
        self.metrics.try_for_each_mut(f)
    }
}
