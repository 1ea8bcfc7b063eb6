//! Column layout of the table.

use crate::registry::DEFAULT_NAME_WIDTH;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Header of the name column.
pub const COLUMN_EVENT_NAME: &str = "Event name";
/// Header of the value column.
pub const COLUMN_VALUE: &str = "Value";
/// Header of the rate column.
pub const COLUMN_PROGRESS: &str = "Progress";
/// Header of the documentation column.
pub const COLUMN_DOCUMENTATION: &str = "Documentation";

/// The documentation column is only drawn if at least its header fits.
pub const DOCUMENTATION_MIN_WIDTH: usize = COLUMN_DOCUMENTATION.len();

const ELLIPSIS: char = '…';

/// Fixed column widths. The name column grows with the widest name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// Floor for the name column.
    #[serde(default = "default_min_name_width")]
    pub min_name_width: usize,
    /// Width of the value column.
    #[serde(default = "default_value_width")]
    pub value_width: usize,
    /// Width of the rate column.
    #[serde(default = "default_rate_width")]
    pub rate_width: usize,
}

fn default_min_name_width() -> usize {
    DEFAULT_NAME_WIDTH
}
fn default_value_width() -> usize {
    20
}
fn default_rate_width() -> usize {
    20
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            min_name_width: default_min_name_width(),
            value_width: default_value_width(),
            rate_width: default_rate_width(),
        }
    }
}

impl Layout {
    /// Narrowest terminal the live table is drawn on.
    #[must_use]
    pub fn live_min_width(&self, name_width: usize) -> usize {
        name_width + self.value_width + self.rate_width
    }

    /// Narrowest terminal the final summary is drawn on.
    #[must_use]
    pub fn final_min_width(&self, name_width: usize) -> usize {
        name_width + self.value_width
    }

    /// Width left for documentation, or `None` if it would be narrower
    /// than [`DOCUMENTATION_MIN_WIDTH`].
    #[must_use]
    pub fn documentation_width(&self, name_width: usize, terminal_width: usize) -> Option<usize> {
        let fixed = self.live_min_width(name_width);
        terminal_width
            .checked_sub(fixed)
            .filter(|&rest| rest >= DOCUMENTATION_MIN_WIDTH)
    }
}

/// Writes `s` left-justified in exactly `width` columns, the last of
/// which is always blank. Text that does not fit is cut with an ellipsis.
pub fn write_padded<W: Write>(out: &mut W, s: &str, width: usize) -> io::Result<()> {
    let len = s.chars().count();
    if len < width {
        return write!(out, "{s}{:pad$}", "", pad = width - len);
    }
    if width == 0 {
        return Ok(());
    }
    write_truncated(out, s, width - 1)?;
    out.write_all(b" ")
}

/// Writes at most `width` characters of `s`, ending with an ellipsis if
/// anything was cut.
pub fn write_truncated<W: Write>(out: &mut W, s: &str, width: usize) -> io::Result<()> {
    if s.chars().count() <= width {
        return out.write_all(s.as_bytes());
    }
    if width <= 1 {
        let head: String = s.chars().take(width).collect();
        return out.write_all(head.as_bytes());
    }
    let head: String = s.chars().take(width - 1).collect();
    write!(out, "{head}{ELLIPSIS}")
}
