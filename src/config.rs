//! Configuration for the progress table.
//!
//! Supports YAML configuration with precedence: CLI > file > defaults.

use crate::catalog::{Catalog, CustomMetric};
use crate::error::{Result, TableError};
use crate::render::Layout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Global configuration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    /// Render tick in milliseconds.
    #[serde(default = "default_refresh_ms")]
    pub refresh_ms: u64,

    /// Allow hiding the table behind a one-line hint.
    #[serde(default = "default_toggle_enabled")]
    pub toggle_enabled: bool,
}

fn default_refresh_ms() -> u64 {
    1000
}
fn default_toggle_enabled() -> bool {
    true
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self { refresh_ms: default_refresh_ms(), toggle_enabled: default_toggle_enabled() }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Global settings.
    #[serde(default)]
    pub global: GlobalConfig,

    /// Column widths.
    #[serde(default)]
    pub layout: Layout,

    /// Catalog extensions.
    #[serde(default)]
    pub metrics: Vec<CustomMetric>,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            global: GlobalConfig::default(),
            layout: Layout::default(),
            metrics: Vec::new(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `$XDG_CONFIG_HOME/progress-table/config.yaml`, or the platform
    /// equivalent.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("progress-table").join("config.yaml"))
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| TableError::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses and validates configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            TableError::ConfigParse { line, message: e.to_string() }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Rejects values the table cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::ConfigInvalid`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let invalid = |key: &str, message: &str| {
            Err(TableError::ConfigInvalid { key: key.to_string(), message: message.to_string() })
        };

        if self.global.refresh_ms == 0 {
            return invalid("global.refresh_ms", "must be greater than zero");
        }
        if self.layout.value_width == 0 {
            return invalid("layout.value_width", "must be greater than zero");
        }
        if self.layout.rate_width == 0 {
            return invalid("layout.rate_width", "must be greater than zero");
        }
        if self.layout.min_name_width == 0 {
            return invalid("layout.min_name_width", "must be greater than zero");
        }
        if self.metrics.iter().any(|m| m.name.trim().is_empty()) {
            return invalid("metrics.name", "must not be empty");
        }
        Ok(())
    }

    /// Returns the render tick as a Duration.
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.global.refresh_ms)
    }

    /// Built-in catalog extended with the configured metrics.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        Catalog::builtin().with_custom(&self.metrics)
    }
}
