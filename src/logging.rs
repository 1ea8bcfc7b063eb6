//! Logging setup for the `progress-table` binary.
//!
//! The live table owns stderr, so logs are quiet by default (`warn`) and
//! can be redirected to a file.

use crate::error::Result;
use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter. `RUST_LOG` is used when
/// it is unset.
pub const LOG_ENV: &str = "PROGRESS_TABLE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Filter from [`LOG_ENV`], then `RUST_LOG`, then `warn`.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber, writing to `log_file` (no ANSI colors)
/// or to stderr.
///
/// A second call is a no-op.
pub fn init(log_file: Option<&Path>) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(env_filter()).with_target(false);

    let installed = match log_file {
        Some(path) => {
            let file = File::create(path)?;
            builder.with_writer(Mutex::new(file)).with_ansi(false).try_init()
        }
        None => builder.with_writer(std::io::stderr).try_init(),
    };
    if let Err(e) = installed {
        tracing::debug!(error = %e, "subscriber already installed");
    }
    Ok(())
}
