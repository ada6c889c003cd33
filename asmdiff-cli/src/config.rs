//! asmdiff configuration loading from `.asmdiffrc.toml`.
//!
//! Configuration is optional. Without a config file, comparison and output
//! use their defaults; command-line flags override whatever the file sets.
//!
//! # Example Configuration
//!
//! ```toml
//! [diff]
//! include_generated = false
//! property_modifications = true
//! parallel = true
//! type_key = "name"        # or "full_name"
//!
//! [output]
//! format = "table"
//! color = true
//! ```

use asmdiff_core::DiffOptions;
use serde::Deserialize;
use std::path::Path;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".asmdiffrc.toml";

/// Root configuration structure loaded from `.asmdiffrc.toml`.
///
/// All sections are optional and will use defaults if not specified.
#[derive(Debug, Deserialize, Default)]
pub struct AsmdiffConfig {
    /// Comparison options handed to the differ.
    #[serde(default)]
    pub diff: DiffOptions,

    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,
}

/// Output formatting preferences.
///
/// Command-line flags (e.g., `--format json`) override these settings.
///
/// Note: This is distinct from the runtime `OutputConfig` in the output module,
/// which handles actual rendering.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format: `table`, `json` or `csv`.
    #[serde(default)]
    pub format: Option<String>,

    /// Whether to use colored output.
    ///
    /// Defaults to auto-detection when unset.
    #[serde(default)]
    pub color: Option<bool>,
}

impl AsmdiffConfig {
    /// Load configuration from `.asmdiffrc.toml` in the given directory.
    ///
    /// If the config file doesn't exist or can't be parsed, returns defaults.
    /// Parse errors are logged as warnings but don't cause failures.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", CONFIG_FILE, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", CONFIG_FILE, e);
                }
            }
        }
        Self::default()
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Returns the configured color preference, or `None` to auto-detect.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }
}
