//! Terminal geometry.

/// Source of the current terminal width in columns.
pub trait TerminalWidth {
    /// Current width, or `None` if it cannot be determined right now.
    fn width(&self) -> Option<usize>;
}

/// Queries the controlling terminal through crossterm.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrosstermTerminal;

impl TerminalWidth for CrosstermTerminal {
    fn width(&self) -> Option<usize> {
        match crossterm::terminal::size() {
            Ok((columns, _rows)) => Some(usize::from(columns)),
            Err(e) => {
                tracing::trace!(error = %e, "terminal size unavailable");
                None
            }
        }
    }
}

/// Fixed width, for tests and `--width` overrides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidth(pub usize);

impl TerminalWidth for FixedWidth {
    fn width(&self) -> Option<usize> {
        Some(self.0)
    }
}
