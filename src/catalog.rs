//! Metric catalog: which event names are known, and how to show them.
//!
//! The catalog is closed: names it does not know are dropped at ingest
//! time, so a client and server built from different catalog versions
//! simply ignore each other's extra events.

use crate::series::ValueKind::{self, Cumulative, Gauge};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Unit a metric is measured in. Drives formatting and rate coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Plain count.
    Number,
    /// Bytes.
    Bytes,
    /// Nanoseconds.
    Nanoseconds,
    /// Microseconds.
    Microseconds,
    /// Milliseconds.
    Milliseconds,
}

impl Unit {
    /// All units, in declaration order.
    pub const ALL: [Unit; 5] = [
        Unit::Number,
        Unit::Bytes,
        Unit::Nanoseconds,
        Unit::Microseconds,
        Unit::Milliseconds,
    ];

    /// Position in [`Unit::ALL`]; used to index per-unit lookup tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// What the catalog knows about one metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricInfo {
    /// How the producer usually reports this metric.
    pub kind: ValueKind,
    /// Measurement unit.
    pub unit: Unit,
    /// One-line human description, shown in the documentation column.
    pub description: String,
}

/// Lookup of metric names.
pub trait MetricCatalog {
    /// Returns the metric's info, or `None` if the name is not known.
    fn lookup(&self, name: &str) -> Option<&MetricInfo>;
}

/// A user-defined catalog entry, as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomMetric {
    /// Event name as it appears in the stream.
    pub name: String,
    /// Value kind.
    #[serde(default = "default_custom_kind")]
    pub kind: ValueKind,
    /// Unit.
    #[serde(default = "default_custom_unit")]
    pub unit: Unit,
    /// Description for the documentation column.
    #[serde(default)]
    pub description: String,
}

fn default_custom_kind() -> ValueKind {
    ValueKind::Cumulative
}
fn default_custom_unit() -> Unit {
    Unit::Number
}

/// Profiling events every build knows about.
const BUILTIN_EVENTS: &[(&str, ValueKind, Unit, &str)] = &[
    ("Query", Cumulative, Unit::Number, "Number of queries to be interpreted and potentially executed."),
    ("SelectQuery", Cumulative, Unit::Number, "Same as Query, but only for SELECT queries."),
    ("InsertQuery", Cumulative, Unit::Number, "Same as Query, but only for INSERT queries."),
    ("FileOpen", Cumulative, Unit::Number, "Number of files opened."),
    ("Seek", Cumulative, Unit::Number, "Number of times the 'lseek' function was called."),
    ("ReadBufferFromFileDescriptorRead", Cumulative, Unit::Number, "Number of reads (read/pread) from a file descriptor. Does not include sockets."),
    ("ReadBufferFromFileDescriptorReadBytes", Cumulative, Unit::Bytes, "Number of bytes read from file descriptors. If the file is compressed, this will show the compressed data size."),
    ("WriteBufferFromFileDescriptorWriteBytes", Cumulative, Unit::Bytes, "Number of bytes written to file descriptors. If the file is compressed, this will show compressed data size."),
    ("ReadCompressedBytes", Cumulative, Unit::Bytes, "Number of bytes (the number of bytes before decompression) read from compressed sources (files, network)."),
    ("CompressedReadBufferBlocks", Cumulative, Unit::Number, "Number of compressed blocks (the blocks of data that are compressed independent of each other) read from compressed sources (files, network)."),
    ("CompressedReadBufferBytes", Cumulative, Unit::Bytes, "Number of uncompressed bytes (the number of bytes after decompression) read from compressed sources (files, network)."),
    ("SelectedParts", Cumulative, Unit::Number, "Number of data parts selected to read from a MergeTree table."),
    ("SelectedRanges", Cumulative, Unit::Number, "Number of (non-adjacent) ranges in all data parts selected to read from a MergeTree table."),
    ("SelectedMarks", Cumulative, Unit::Number, "Number of marks (index granules) selected to read from a MergeTree table."),
    ("SelectedRows", Cumulative, Unit::Number, "Number of rows SELECTed from all tables."),
    ("SelectedBytes", Cumulative, Unit::Bytes, "Number of bytes (uncompressed; for columns as they stored in memory) SELECTed from all tables."),
    ("InsertedRows", Cumulative, Unit::Number, "Number of rows INSERTed to all tables."),
    ("InsertedBytes", Cumulative, Unit::Bytes, "Number of bytes (uncompressed; for columns as they stored in memory) INSERTed to all tables."),
    ("NetworkReceiveBytes", Cumulative, Unit::Bytes, "Total number of bytes received from network."),
    ("NetworkSendBytes", Cumulative, Unit::Bytes, "Total number of bytes sent to network."),
    ("NetworkReceiveElapsedMicroseconds", Cumulative, Unit::Microseconds, "Total time spent waiting for data to receive or receiving data from network."),
    ("NetworkSendElapsedMicroseconds", Cumulative, Unit::Microseconds, "Total time spent waiting for data to send to network or sending data to network."),
    ("DiskReadElapsedMicroseconds", Cumulative, Unit::Microseconds, "Total time spent waiting for read syscall. This include reads from page cache."),
    ("DiskWriteElapsedMicroseconds", Cumulative, Unit::Microseconds, "Total time spent waiting for write syscall. This include writes to page cache."),
    ("RealTimeMicroseconds", Cumulative, Unit::Microseconds, "Total (wall clock) time spent in processing (queries and other tasks) threads."),
    ("UserTimeMicroseconds", Cumulative, Unit::Microseconds, "Total time spent in processing (queries and other tasks) threads executing CPU instructions in user mode."),
    ("SystemTimeMicroseconds", Cumulative, Unit::Microseconds, "Total time spent in processing (queries and other tasks) threads executing CPU instructions in OS kernel mode."),
    ("OSCPUWaitMicroseconds", Cumulative, Unit::Microseconds, "Total time a thread was ready for execution but waiting to be scheduled by OS, from the OS point of view."),
    ("OSCPUVirtualTimeMicroseconds", Cumulative, Unit::Microseconds, "CPU time spent seen by OS. Does not include involuntary waits due to virtualization."),
    ("OSReadBytes", Cumulative, Unit::Bytes, "Number of bytes read from disks or block devices. Does not include bytes read from page cache."),
    ("OSWriteBytes", Cumulative, Unit::Bytes, "Number of bytes written to disks or block devices. Does not include bytes that are in page cache dirty pages."),
    ("OSReadChars", Cumulative, Unit::Bytes, "Number of bytes read from filesystem, including page cache."),
    ("OSWriteChars", Cumulative, Unit::Bytes, "Number of bytes written to filesystem, including page cache."),
    ("ContextLock", Cumulative, Unit::Number, "Number of times the lock of Context was acquired or tried to acquire."),
    ("ThreadPoolReaderPageCacheHitElapsedMicroseconds", Cumulative, Unit::Microseconds, "Time spent reading data from page cache in asynchronous reading from thread pool."),
    ("ConnectionPoolWaitNanoseconds", Cumulative, Unit::Nanoseconds, "Time spent waiting for a free connection in a pool."),
    ("MergeTotalMilliseconds", Cumulative, Unit::Milliseconds, "Total time spent for background merges."),
    ("MemoryTrackerUsage", Gauge, Unit::Bytes, "Memory currently tracked for the query."),
    ("MemoryTrackerPeakUsage", Gauge, Unit::Bytes, "Peak memory tracked for the query."),
];

/// Name-indexed catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, MetricInfo>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of the built-in profiling events.
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::new();
        for &(name, kind, unit, description) in BUILTIN_EVENTS {
            catalog.insert(name, MetricInfo { kind, unit, description: description.to_string() });
        }
        catalog
    }

    /// Adds (or replaces) a metric.
    pub fn insert(&mut self, name: impl Into<String>, info: MetricInfo) {
        self.entries.insert(name.into(), info);
    }

    /// Adds entries from the config file. Later entries win.
    #[must_use]
    pub fn with_custom(mut self, metrics: &[CustomMetric]) -> Self {
        for metric in metrics {
            self.insert(
                metric.name.clone(),
                MetricInfo {
                    kind: metric.kind,
                    unit: metric.unit,
                    description: metric.description.clone(),
                },
            );
        }
        self
    }

    /// Number of known metrics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no metric is known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl MetricCatalog for Catalog {
    fn lookup(&self, name: &str) -> Option<&MetricInfo> {
        self.entries.get(name)
    }
}
