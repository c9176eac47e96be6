//! Serializable run configuration, loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid config that
//! reproduces the reference SPY setup.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::data::lagged::LAG_BUFFER_DAYS;
use crate::domain::RunId;
use crate::error::{Result, StrategyError};
use crate::model::ClassifierKind;
use crate::strategy::ModelSpec;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Full configuration for a single replay.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub strategy: StrategySection,
    pub data: DataSection,
}

/// `[strategy]`: what the model is trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategySection {
    pub symbol: String,
    pub model_start: NaiveDate,
    pub model_end: NaiveDate,
    /// First date of the held-out partition.
    pub test_start: NaiveDate,
    pub lags: usize,
    pub classifier: ClassifierKind,
}

impl Default for StrategySection {
    fn default() -> Self {
        Self {
            symbol: "SPY".into(),
            model_start: ymd(2016, 1, 10),
            model_end: ymd(2017, 12, 31),
            test_start: ymd(2017, 1, 1),
            lags: 5,
            classifier: ClassifierKind::default(),
        }
    }
}

/// `[data]`: where the replayed bars come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Directory holding one `<SYMBOL>.csv` per symbol.
    pub csv_dir: PathBuf,
    pub backtest_start: NaiveDate,
    /// Open-ended when absent.
    pub backtest_end: Option<NaiveDate>,
    /// Use seeded synthetic bars instead of CSV files.
    pub synthetic_seed: Option<u64>,
}

impl Default for DataSection {
    fn default() -> Self {
        Self {
            csv_dir: PathBuf::from("data"),
            backtest_start: ymd(2017, 1, 3),
            backtest_end: None,
            synthetic_seed: None,
        }
    }
}

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

impl RunConfig {
    pub fn from_toml_str(s: &str) -> std::result::Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn model_spec(&self) -> ModelSpec {
        ModelSpec {
            symbol: self.strategy.symbol.clone(),
            train_start: self.strategy.model_start,
            train_end: self.strategy.model_end,
            test_cutoff: self.strategy.test_start,
            lag_count: self.strategy.lags,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.model_spec().validate()?;
        if let Some(end) = self.data.backtest_end {
            if end < self.data.backtest_start {
                return Err(StrategyError::Configuration(format!(
                    "backtest end {end} is before backtest start {}",
                    self.data.backtest_start
                )));
            }
        }
        Ok(())
    }

    /// Earliest date any consumer of this config reads bars from.
    pub fn history_origin(&self) -> NaiveDate {
        let earliest = self.strategy.model_start.min(self.data.backtest_start);
        earliest - Duration::days(LAG_BUFFER_DAYS + 35)
    }

    /// Content hash of the canonical JSON form. Identical configs share an id.
    pub fn run_id(&self) -> std::result::Result<RunId, ConfigError> {
        let json = serde_json::to_vec(self)?;
        Ok(RunId::from_bytes(&json))
    }
}
