//! Table rendering.
//!
//! The live table is redrawn in place: every tick hides the cursor, writes
//! the header and one row per fresh metric, then moves the cursor back up
//! over everything it wrote, so the next tick overwrites it instead of
//! scrolling. The final table is plain text with no control sequences.

pub mod ladder;
pub mod layout;

pub use ladder::{Ladder, Tint};
pub use layout::Layout;

use crate::clock::Clock;
use crate::readable::format_value;
use crate::registry::MetricRegistry;
use crossterm::cursor::{Hide, MoveUp, Show};
use crossterm::queue;
use crossterm::style::{Attribute, SetAttribute};
use crossterm::terminal::{Clear, ClearType};
use layout::{
    write_padded, write_truncated, COLUMN_DOCUMENTATION, COLUMN_EVENT_NAME, COLUMN_PROGRESS,
    COLUMN_VALUE,
};
use std::io::{self, Write};

/// Shown instead of the table while it is toggled off.
pub const HIDDEN_HINT: &str = "Press the space key to toggle the display of the progress table.";

/// What the live view should show this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LiveMode {
    /// The metrics table.
    #[default]
    Table,
    /// A one-line hint; the table is toggled off.
    Hidden,
}

/// What a render call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Table drawn with this many metric rows (header not counted).
    Drawn {
        /// Metric rows written.
        rows: usize,
    },
    /// Hint line drawn instead of the table.
    Hint,
    /// Nothing drawn: the terminal is narrower than the mandatory columns.
    TooNarrow {
        /// Terminal width.
        width: usize,
        /// Width the mandatory columns need.
        required: usize,
    },
    /// Nothing drawn: the terminal width is unknown.
    NoWidth,
    /// Nothing drawn: no metric recorded yet.
    Empty,
}

/// Draws a [`MetricRegistry`] with a fixed [`Layout`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Renderer {
    layout: Layout,
}

impl Renderer {
    /// Creates a renderer.
    #[must_use]
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    /// Column widths in use.
    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Draws one tick of the live table.
    ///
    /// Stale metrics are skipped. Each drawn row folds its current rate
    /// into the metric's peak, after the row's color was chosen from the
    /// previous peak.
    pub fn live<C: Clock, W: Write>(
        &self,
        registry: &mut MetricRegistry<C>,
        terminal_width: Option<usize>,
        out: &mut W,
    ) -> io::Result<RenderOutcome> {
        let Some(width) = terminal_width else {
            return Ok(RenderOutcome::NoWidth);
        };
        let name_width = registry.name_column_width();
        let required = self.layout.live_min_width(name_width);
        if width < required {
            return Ok(RenderOutcome::TooNarrow { width, required });
        }
        if registry.is_empty() {
            return Ok(RenderOutcome::Empty);
        }

        let layout = self.layout;
        let doc_width = layout.documentation_width(name_width, width);

        queue!(out, Hide)?;
        out.write_all(b"\n")?;
        write_padded(out, COLUMN_EVENT_NAME, name_width)?;
        write_padded(out, COLUMN_VALUE, layout.value_width)?;
        write_padded(out, COLUMN_PROGRESS, layout.rate_width)?;
        if let Some(doc_width) = doc_width {
            write_truncated(out, COLUMN_DOCUMENTATION, doc_width)?;
        }
        queue!(out, Clear(ClearType::UntilNewLine))?;

        let now = registry.now();
        let mut rows = 0usize;
        registry.try_for_each_mut(|name, entry| -> io::Result<()> {
            if !entry.aggregate().is_fresh(now) {
                return Ok(());
            }
            rows += 1;

            let unit = entry.info().unit;
            out.write_all(b"\n")?;
            write_padded(out, name, name_width)?;
            write_padded(out, &format_value(unit, entry.aggregate().total_value()), layout.value_width)?;

            let peak = entry.aggregate().peak_rate();
            let rate = entry.aggregate_mut().record_and_get_rate(now);
            Ladder::for_unit(unit).tint(rate, peak).queue(out)?;
            write_padded(out, &format!("{}/s", format_value(unit, rate)), layout.rate_width)?;

            if let Some(doc_width) = doc_width {
                Tint::DarkGrey.queue(out)?;
                write_truncated(out, &entry.info().description, doc_width)?;
            }

            queue!(out, SetAttribute(Attribute::Reset), Clear(ClearType::UntilNewLine))
        })?;

        let lines = u16::try_from(rows + 1).unwrap_or(u16::MAX);
        queue!(out, MoveUp(lines))?;
        out.flush()?;
        Ok(RenderOutcome::Drawn { rows })
    }

    /// Draws the hint line shown while the table is toggled off.
    pub fn hint<W: Write>(&self, out: &mut W) -> io::Result<RenderOutcome> {
        queue!(out, Clear(ClearType::FromCursorDown), Hide)?;
        write!(out, "\n{HIDDEN_HINT}")?;
        queue!(out, MoveUp(1))?;
        out.flush()?;
        Ok(RenderOutcome::Hint)
    }

    /// Erases whatever the live view left below the cursor and shows the
    /// cursor again.
    pub fn clear<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(b"\r")?;
        queue!(out, Clear(ClearType::FromCursorDown), Show)?;
        out.flush()
    }

    /// Writes the plain summary: every metric, fresh or not, with its
    /// latest value.
    ///
    /// An unknown width means the output is not a terminal, so no width
    /// gate applies.
    pub fn final_table<C: Clock, W: Write>(
        &self,
        registry: &MetricRegistry<C>,
        terminal_width: Option<usize>,
        out: &mut W,
    ) -> io::Result<RenderOutcome> {
        let name_width = registry.name_column_width();
        if let Some(width) = terminal_width {
            let required = self.layout.final_min_width(name_width);
            if width < required {
                return Ok(RenderOutcome::TooNarrow { width, required });
            }
        }
        if registry.is_empty() {
            return Ok(RenderOutcome::Empty);
        }

        out.write_all(b"\n")?;
        write_padded(out, COLUMN_EVENT_NAME, name_width)?;
        write_padded(out, COLUMN_VALUE, self.layout.value_width)?;

        let rows = registry.finalize();
        for row in &rows {
            out.write_all(b"\n")?;
            write_padded(out, &row.name, name_width)?;
            write_padded(out, &format_value(row.unit, row.value), self.layout.value_width)?;
        }
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(RenderOutcome::Drawn { rows: rows.len() })
    }
}
