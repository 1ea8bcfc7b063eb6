//! Profiling-event rows as delivered by the producer.

use crate::error::{Result, TableError};
use crate::series::ValueKind;

/// Scope id of rows that describe the whole query on one host, rather than
/// a single worker thread.
pub const AGGREGATE_SCOPE: u64 = 0;

/// One row of a profiling-event batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Aggregation scope. Only [`AGGREGATE_SCOPE`] rows are consumed.
    pub scope_id: u64,
    /// Metric name.
    pub name: String,
    /// Reporting host.
    pub host: String,
    /// Sample value (delta or replacement, depending on `kind`).
    pub value: i64,
    /// How the sample combines with the stored value.
    pub kind: ValueKind,
}

impl EventRecord {
    /// Creates a whole-query row.
    pub fn aggregate(
        name: impl Into<String>,
        host: impl Into<String>,
        value: i64,
        kind: ValueKind,
    ) -> Self {
        Self { scope_id: AGGREGATE_SCOPE, name: name.into(), host: host.into(), value, kind }
    }

    /// Decodes a tab-separated row `scope_id name host value kind`.
    ///
    /// `line` is only used for error messages.
    pub fn parse_tsv(text: &str, line: usize) -> Result<Self> {
        let malformed = |message: String| TableError::MalformedRecord { line, message };

        let columns: Vec<&str> = text.split('\t').collect();
        let &[scope_id, name, host, value, kind] = columns.as_slice() else {
            return Err(malformed(format!("expected 5 tab-separated columns, got {}", columns.len())));
        };

        let scope_id = scope_id
            .trim()
            .parse::<u64>()
            .map_err(|e| malformed(format!("scope_id '{scope_id}': {e}")))?;
        let value = value
            .trim()
            .parse::<i64>()
            .map_err(|e| malformed(format!("value '{value}': {e}")))?;
        let kind = kind
            .trim()
            .parse::<i64>()
            .map_err(|e| malformed(format!("kind '{kind}': {e}")))
            .and_then(|raw| ValueKind::try_from(raw).map_err(|e| malformed(e.to_string())))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(malformed("empty metric name".to_string()));
        }

        Ok(Self { scope_id, name: name.to_string(), host: host.trim().to_string(), value, kind })
    }
}
