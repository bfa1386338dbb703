//! YAML run configuration.

use ledger_core::{ScenarioParams, Ticker, ValidationError};
use market_data::DEFAULT_TTL_SECS;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
    #[error("invalid yaml: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid parameters: {0}")]
    Params(#[from] ValidationError),
    #[error("unknown sweep target {0:?}")]
    UnknownSweep(String),
}

/// Everything a run needs besides the command line.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub params: ScenarioParams,
    /// Long-format history CSV; the reference dataset when absent.
    pub history_csv: Option<PathBuf>,
    /// Tickers to track; empty keeps the default five.
    pub tickers: Vec<String>,
    pub export_csv: Option<PathBuf>,
    pub export_json: Option<PathBuf>,
    pub cache_ttl_secs: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            params: ScenarioParams::default(),
            history_csv: None,
            tickers: Vec::new(),
            export_csv: None,
            export_json: None,
            cache_ttl_secs: DEFAULT_TTL_SECS,
        }
    }
}

impl RunConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn tickers(&self) -> Vec<Ticker> {
        if self.tickers.is_empty() {
            market_data::default_tickers()
        } else {
            self.tickers.iter().map(|t| Ticker::from(t.as_str())).collect()
        }
    }

    /// Range-check the scenario parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        Ok(())
    }
}
