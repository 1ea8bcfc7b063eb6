//! # progress-table
//!
//! Live in-terminal progress table for streamed profiling events.
//!
//! A producer pushes batches of `(scope, name, host, value, kind)` rows at
//! whatever cadence it likes; a ticker redraws a table of every metric that
//! changed in the last few seconds, with its total value and a per-second
//! rate that stays readable even when samples arrive milliseconds apart.
//!
//! ## Features
//!
//! - **Jitter-free rates**: rates are computed over a window at least half
//!   a second wide, and reset after idle gaps
//! - **Multi-host**: one row per metric, summed over every reporting host
//! - **Recency order**: the most recently updated metrics are at the top
//! - **Unit-aware**: counts, bytes and durations are formatted and colored
//!   by their own scales
//!
//! ## Quick Start
//!
//! ```rust
//! use progress_table::prelude::*;
//! use std::sync::Arc;
//!
//! let table = ProgressTable::new(Arc::new(Catalog::builtin()), Layout::default());
//! table.update_progress(&[EventRecord::aggregate(
//!     "SelectedRows",
//!     "node-1",
//!     1_500,
//!     ValueKind::Cumulative,
//! )]);
//!
//! let mut summary = Vec::new();
//! table.write_final_table(&mut summary)?;
//! # Ok::<(), progress_table::TableError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): the `progress-table` binary and its logging setup

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only - banned in production code
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Metric State
// ============================================================================

/// Elapsed-time sources.
pub mod clock;

/// Per-host snapshot triple and rate smoothing.
pub mod series;

/// Per-metric fan-in over hosts.
pub mod aggregate;

/// Move-to-front ordered map.
pub mod order;

/// Ingestion, ordering and lifecycle of all metrics.
pub mod registry;

// ============================================================================
// Input
// ============================================================================

/// Profiling-event rows.
pub mod batch;

/// Known metric names, units and descriptions.
pub mod catalog;

// ============================================================================
// Output
// ============================================================================

/// Human-readable number formatting.
pub mod readable;

/// Terminal geometry.
pub mod terminal;

/// Live and final table rendering.
pub mod render;

/// Mutex-guarded shared table.
pub mod table;

// ============================================================================
// Configuration and Logging
// ============================================================================

/// YAML configuration.
pub mod config;

/// Subscriber setup for the binary.
#[cfg(feature = "cli")]
#[cfg_attr(docsrs, doc(cfg(feature = "cli")))]
pub mod logging;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for progress table operations.
pub mod error;

pub use error::{Result, TableError};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types and traits for convenient imports.
///
/// ```rust
/// use progress_table::prelude::*;
/// ```
pub mod prelude {
    pub use crate::batch::{EventRecord, AGGREGATE_SCOPE};
    pub use crate::catalog::{Catalog, CustomMetric, MetricCatalog, MetricInfo, Unit};
    pub use crate::clock::{Clock, ManualClock, Stopwatch};
    pub use crate::config::Config;
    pub use crate::error::{Result, TableError};
    pub use crate::registry::{IngestStats, MetricRegistry, SummaryRow};
    pub use crate::render::{Layout, LiveMode, RenderOutcome, Renderer};
    pub use crate::series::ValueKind;
    pub use crate::table::ProgressTable;
    pub use crate::terminal::{CrosstermTerminal, FixedWidth, TerminalWidth};
}

// ============================================================================
// Tests
// ============================================================================
