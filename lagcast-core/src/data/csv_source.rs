//! CSV directory source: one `<SYMBOL>.csv` per symbol.
//!
//! Expected header (column order does not matter):
//! `datetime,open,high,low,close,volume,adj_close`. Yahoo-style capitalised
//! headers (`Date`, `Adj Close`, ...) are accepted as well. Rows with an
//! empty, `null` or `NaN` price cell are skipped.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::provider::{ensure_ascending, BarSource, DataError};
use crate::domain::Bar;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(alias = "datetime", alias = "Date", deserialize_with = "de_date")]
    date: NaiveDate,
    #[serde(alias = "Open", deserialize_with = "de_cell")]
    open: Option<f64>,
    #[serde(alias = "High", deserialize_with = "de_cell")]
    high: Option<f64>,
    #[serde(alias = "Low", deserialize_with = "de_cell")]
    low: Option<f64>,
    #[serde(alias = "Close", deserialize_with = "de_cell")]
    close: Option<f64>,
    #[serde(alias = "Volume", deserialize_with = "de_cell")]
    volume: Option<f64>,
    #[serde(
        alias = "Adj Close",
        alias = "adj close",
        alias = "adjclose",
        deserialize_with = "de_cell"
    )]
    adj_close: Option<f64>,
}

impl CsvRow {
    /// `None` when any price cell is missing; such rows are void.
    fn into_bar(self, symbol: &str) -> Option<Bar> {
        Some(Bar {
            symbol: symbol.to_string(),
            date: self.date,
            open: self.open?,
            high: self.high?,
            low: self.low?,
            close: self.close?,
            volume: self.volume.unwrap_or(0.0).max(0.0) as u64,
            adj_close: self.adj_close?,
        })
    }
}

/// Numeric cell; empty, `null` and `NaN` cells read as missing.
fn de_cell<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    let value: f64 = raw.parse().map_err(serde::de::Error::custom)?;
    Ok(Some(value).filter(|v| !v.is_nan()))
}

/// Accept both `2017-01-03` and `2017-01-03 00:00:00`.
fn de_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(serde::de::Error::custom)
}

/// Reads daily bars from a directory of CSV files.
#[derive(Debug, Clone)]
pub struct CsvBarSource {
    dir: PathBuf,
}

impl CsvBarSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{symbol}.csv"))
    }

    /// Load every bar in the symbol's file, sorted by date.
    pub fn load_all(&self, symbol: &str) -> Result<Vec<Bar>, DataError> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        let mut reader = csv::Reader::from_path(&path).map_err(|e| DataError::Csv {
            path: path.clone(),
            reason: e.to_string(),
        })?;

        let mut bars = Vec::new();
        for record in reader.deserialize::<CsvRow>() {
            let row = record.map_err(|e| DataError::Csv {
                path: path.clone(),
                reason: e.to_string(),
            })?;
            let date = row.date;
            let bar = match row.into_bar(symbol) {
                Some(bar) if !bar.is_void() => bar,
                _ => {
                    warn!(symbol, %date, "skipping void bar");
                    continue;
                }
            };
            bars.push(bar);
        }

        bars.sort_by_key(|b| b.date);
        ensure_ascending(symbol, &bars)?;
        debug!(symbol, rows = bars.len(), path = %path.display(), "loaded csv bars");
        Ok(bars)
    }
}

impl BarSource for CsvBarSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn bars(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError> {
        let bars: Vec<Bar> = self
            .load_all(symbol)?
            .into_iter()
            .filter(|b| b.date >= start && b.date <= end)
            .collect();
        if bars.is_empty() {
            return Err(DataError::NoData {
                symbol: symbol.to_string(),
                start,
                end,
            });
        }
        Ok(bars)
    }
}
