//! Shared progress table.
//!
//! [`ProgressTable`] is the one piece of shared mutable state: a
//! [`MetricRegistry`] behind a single mutex. Ingestion, both render modes
//! and reset each hold the lock for their full duration, so a reader never
//! observes half of a batch. The table does no scheduling of its own; the
//! caller decides when to update and when to draw.

use crate::batch::EventRecord;
use crate::catalog::MetricCatalog;
use crate::clock::{Clock, Stopwatch};
use crate::error::Result;
use crate::registry::{IngestStats, MetricRegistry, SummaryRow};
use crate::render::{Layout, LiveMode, RenderOutcome, Renderer};
use crate::terminal::{CrosstermTerminal, TerminalWidth};
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::trace;

/// Catalog shared between the table and whoever built it.
pub type SharedCatalog = Arc<dyn MetricCatalog + Send + Sync>;

/// Thread-safe live progress table.
pub struct ProgressTable<T: TerminalWidth = CrosstermTerminal, C: Clock = Stopwatch> {
    registry: Mutex<MetricRegistry<C>>,
    catalog: SharedCatalog,
    terminal: T,
    renderer: Renderer,
}

impl ProgressTable {
    /// Table on the controlling terminal with a wall clock.
    pub fn new(catalog: SharedCatalog, layout: Layout) -> Self {
        Self::with_parts(catalog, layout, CrosstermTerminal, Stopwatch::new())
    }
}

impl<T: TerminalWidth, C: Clock> ProgressTable<T, C> {
    /// Table with an explicit terminal and clock.
    pub fn with_parts(catalog: SharedCatalog, layout: Layout, terminal: T, clock: C) -> Self {
        Self {
            registry: Mutex::new(MetricRegistry::with_min_name_width(clock, layout.min_name_width)),
            catalog,
            terminal,
            renderer: Renderer::new(layout),
        }
    }

    /// A panic while the lock was held leaves the registry consistent
    /// (every mutation is a single call), so poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, MetricRegistry<C>> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Folds one batch of events into the table.
    pub fn update_progress(&self, batch: &[EventRecord]) -> IngestStats {
        self.lock().ingest(batch, self.catalog.as_ref())
    }

    /// Draws one tick of the live view.
    pub fn write_table<W: Write>(&self, out: &mut W, mode: LiveMode) -> Result<RenderOutcome> {
        let mut registry = self.lock();
        let outcome = match mode {
            LiveMode::Table => self.renderer.live(&mut *registry, self.terminal.width(), out)?,
            LiveMode::Hidden => self.renderer.hint(out)?,
        };
        trace!(?outcome, "live tick");
        Ok(outcome)
    }

    /// Erases the live view and restores the cursor.
    pub fn clear_table_output<W: Write>(&self, out: &mut W) -> Result<()> {
        let _registry = self.lock();
        self.renderer.clear(out)?;
        Ok(())
    }

    /// Writes the permanent summary of every metric recorded.
    pub fn write_final_table<W: Write>(&self, out: &mut W) -> Result<RenderOutcome> {
        let registry = self.lock();
        Ok(self.renderer.final_table(&*registry, self.terminal.width(), out)?)
    }

    /// Forgets every metric and restarts the clock, e.g. on query restart.
    pub fn reset_table(&self) {
        self.lock().reset();
    }

    /// Number of metrics the next live tick would draw.
    pub fn fresh_count(&self) -> usize {
        let registry = self.lock();
        registry.fresh_count(registry.now())
    }

    /// Number of metrics recorded since the last reset.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if nothing has been recorded since the last reset.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Rows of the final summary, without drawing them.
    pub fn summary(&self) -> Vec<SummaryRow> {
        self.lock().finalize()
    }

    /// Column widths in use.
    pub fn layout(&self) -> &Layout {
        self.renderer.layout()
    }
}

impl<T: TerminalWidth, C: Clock> std::fmt::Debug for ProgressTable<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressTable")
            .field("metrics", &self.lock().len())
            .field("layout", self.renderer.layout())
            .finish_non_exhaustive()
    }
}
