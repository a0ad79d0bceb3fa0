use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::LoadOptions;

/// Environment variable naming a JSON config file.
pub const CONFIG_ENV: &str = "POPDASH_CONFIG";
/// Environment variable overriding the data file path.
pub const DATA_ENV: &str = "POPDASH_DATA";

pub const DEFAULT_DATA_FILE: &str = "us-population-2010-2019.csv";

/// Upper bound for `top_n`: 50 states plus DC.
pub const MAX_TOP_N: usize = 51;

/// Dashboard settings. Every field has a default, so a config file only
/// needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Wide-format source opened at startup.
    pub data_path: Option<PathBuf>,
    /// Number of states in the "Top States" chart.
    pub top_n: usize,
    /// Initial colour theme name (`blues`, `greens`, `reds`).
    pub theme: String,
    /// Field delimiter for both the source and the exported table.
    pub delimiter: char,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: Some(PathBuf::from(DEFAULT_DATA_FILE)),
            top_n: 10,
            theme: "blues".to_string(),
            delimiter: ',',
        }
    }
}

impl DashboardConfig {
    /// Read a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the effective config: file from `POPDASH_CONFIG` (or
    /// defaults), then `POPDASH_DATA`, then the first CLI argument.
    pub fn resolve(cli_data_path: Option<PathBuf>) -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        if let Some(path) = std::env::var_os(DATA_ENV) {
            config.data_path = Some(PathBuf::from(path));
        }
        if let Some(path) = cli_data_path {
            config.data_path = Some(path);
        }
        log::debug!("Effective config: {config:?}");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_TOP_N).contains(&self.top_n) {
            anyhow::bail!("top_n {} must be between 1 and {MAX_TOP_N}", self.top_n);
        }
        if !self.delimiter.is_ascii() {
            anyhow::bail!("delimiter {:?} must be a single ASCII character", self.delimiter);
        }
        Ok(())
    }

    /// The delimiter as a byte. Non-ASCII delimiters fall back to `,`.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter.is_ascii() {
            self.delimiter as u8
        } else {
            log::warn!("Ignoring non-ASCII delimiter {:?}", self.delimiter);
            b','
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            delimiter: self.delimiter_byte(),
        }
    }
}
