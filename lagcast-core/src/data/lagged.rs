//! Lagged-return series: the training table for the forecast model.
//!
//! Each row holds the same-day percentage return (`today`), the percentage
//! returns of the `lag_count` preceding days (`lag1` is yesterday) and the
//! sign of `today` as the label. Lags only ever look backwards, so a row's
//! label is never visible in its own predictors.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::provider::{ensure_ascending, BarSource};
use crate::domain::Bar;
use crate::error::{Result, StrategyError};
use crate::model::{Direction, FeatureVector};

/// Calendar days fetched before `start` so lag columns are populated at `start`.
pub const LAG_BUFFER_DAYS: i64 = 365;

/// Same-day returns smaller than this (in percent) are clamped up to it, so
/// every row carries a definite direction.
pub const MIN_ABS_RETURN: f64 = 0.0001;

/// Fewest lag columns the model can be trained on (it predicts from two).
pub const MIN_LAGS: usize = 2;

/// One dated row of the lagged-return table. Returns are in percent.
///
/// Always carries at least [`MIN_LAGS`] lag columns; deserialisation
/// rejects rows with fewer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LaggedRowRepr")]
pub struct LaggedRow {
    pub date: NaiveDate,
    /// Volume traded on `date`. Carried along, never a predictor.
    pub volume: u64,
    pub today: f64,
    lags: Vec<f64>,
    pub direction: Direction,
}

#[derive(Deserialize)]
struct LaggedRowRepr {
    date: NaiveDate,
    #[serde(default)]
    volume: u64,
    today: f64,
    lags: Vec<f64>,
    direction: Direction,
}

impl TryFrom<LaggedRowRepr> for LaggedRow {
    type Error = String;

    fn try_from(raw: LaggedRowRepr) -> std::result::Result<Self, Self::Error> {
        if raw.lags.len() < MIN_LAGS {
            return Err(format!(
                "row {} has {} lag(s), at least {MIN_LAGS} are required",
                raw.date,
                raw.lags.len()
            ));
        }
        Ok(Self {
            date: raw.date,
            volume: raw.volume,
            today: raw.today,
            lags: raw.lags,
            direction: raw.direction,
        })
    }
}

impl LaggedRow {
    /// The `n`-th lag (1-based), if present.
    pub fn lag(&self, n: usize) -> Option<f64> {
        n.checked_sub(1).and_then(|i| self.lags.get(i).copied())
    }

    pub fn lags(&self) -> &[f64] {
        &self.lags
    }

    /// The two predictors the model is trained on.
    pub fn features(&self) -> FeatureVector {
        FeatureVector::new(self.lags[0], self.lags[1])
    }
}

/// Date-ordered lagged-return table for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrainingDatasetRepr")]
pub struct TrainingDataset {
    symbol: String,
    lag_count: usize,
    rows: Vec<LaggedRow>,
}

#[derive(Deserialize)]
struct TrainingDatasetRepr {
    symbol: String,
    lag_count: usize,
    rows: Vec<LaggedRow>,
}

impl TryFrom<TrainingDatasetRepr> for TrainingDataset {
    type Error = String;

    fn try_from(raw: TrainingDatasetRepr) -> std::result::Result<Self, Self::Error> {
        if raw.lag_count < MIN_LAGS {
            return Err(format!(
                "lag count must be at least {MIN_LAGS}, got {}",
                raw.lag_count
            ));
        }
        if let Some(row) = raw.rows.iter().find(|r| r.lags.len() != raw.lag_count) {
            return Err(format!(
                "row {} has {} lag(s), table declares {}",
                row.date,
                row.lags.len(),
                raw.lag_count
            ));
        }
        if raw.rows.windows(2).any(|w| w[1].date <= w[0].date) {
            return Err(format!("rows for '{}' are not in ascending date order", raw.symbol));
        }
        Ok(Self {
            symbol: raw.symbol,
            lag_count: raw.lag_count,
            rows: raw.rows,
        })
    }
}

impl TrainingDataset {
    /// Build the table from ascending bars, keeping rows dated on/after `start`.
    ///
    /// Bars before `start` only feed the lag columns. Rows whose lags reach
    /// back past the first usable bar are dropped.
    pub fn from_bars(symbol: &str, bars: &[Bar], start: NaiveDate, lag_count: usize) -> Result<Self> {
        if lag_count < MIN_LAGS {
            return Err(StrategyError::Configuration(format!(
                "lag count must be at least {MIN_LAGS}, got {lag_count}"
            )));
        }
        ensure_ascending(symbol, bars)?;

        let usable: Vec<&Bar> = bars
            .iter()
            .filter(|b| !b.is_void() && b.adj_close > 0.0)
            .collect();
        let skipped = bars.len() - usable.len();
        if skipped > 0 {
            warn!(symbol, skipped, "dropped void or non-positive bars before lagging");
        }

        // pct[j] is the percentage return into usable[j + 1].
        let pct: Vec<f64> = usable
            .windows(2)
            .map(|w| (w[1].adj_close / w[0].adj_close - 1.0) * 100.0)
            .collect();

        let mut rows = Vec::new();
        for i in (lag_count + 1)..usable.len() {
            let date = usable[i].date;
            if date < start {
                continue;
            }
            let raw_today = pct[i - 1];
            let today = if raw_today.abs() < MIN_ABS_RETURN {
                MIN_ABS_RETURN
            } else {
                raw_today
            };
            let lags = (1..=lag_count).map(|k| pct[i - 1 - k]).collect();
            rows.push(LaggedRow {
                date,
                volume: usable[i].volume,
                today,
                lags,
                direction: Direction::from_return(today),
            });
        }

        debug!(symbol, lag_count, rows = rows.len(), "built lagged series");
        Ok(Self {
            symbol: symbol.to_string(),
            lag_count,
            rows,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn lag_count(&self) -> usize {
        self.lag_count
    }

    pub fn rows(&self) -> &[LaggedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Split into `(train, test)`: train rows strictly before `cutoff`,
    /// test rows on or after it.
    pub fn split(&self, cutoff: NaiveDate) -> (&[LaggedRow], &[LaggedRow]) {
        let at = self.rows.partition_point(|r| r.date < cutoff);
        self.rows.split_at(at)
    }

    /// Content hash of the table (BLAKE3 over dates, returns and labels).
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.symbol.as_bytes());
        hasher.update(&(self.lag_count as u64).to_le_bytes());
        for row in &self.rows {
            hasher.update(row.date.to_string().as_bytes());
            hasher.update(&row.volume.to_le_bytes());
            hasher.update(&row.today.to_bits().to_le_bytes());
            for lag in &row.lags {
                hasher.update(&lag.to_bits().to_le_bytes());
            }
            hasher.update(&[row.direction.sign() as u8]);
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Predictor/label pairs for the model: `lag1` and `lag2` only, whatever the
/// table's lag count.
pub fn select_features(rows: &[LaggedRow]) -> (Vec<FeatureVector>, Vec<Direction>) {
    rows.iter().map(|r| (r.features(), r.direction)).unzip()
}

/// Fetch bars for `[start - LAG_BUFFER_DAYS, end]` and build the lagged table
/// for `[start, end]`.
pub fn build_lagged_series(
    source: &dyn BarSource,
    symbol: &str,
    start: NaiveDate,
    end: NaiveDate,
    lag_count: usize,
) -> Result<TrainingDataset> {
    if lag_count < MIN_LAGS {
        return Err(StrategyError::Configuration(format!(
            "lag count must be at least {MIN_LAGS}, got {lag_count}"
        )));
    }
    if start > end {
        return Err(StrategyError::Configuration(format!(
            "series start {start} is after end {end}"
        )));
    }

    let fetch_from = start - Duration::days(LAG_BUFFER_DAYS);
    let bars = source.bars(symbol, fetch_from, end)?;
    let dataset = TrainingDataset::from_bars(symbol, &bars, start, lag_count)?;
    info!(
        symbol,
        source = source.name(),
        bars = bars.len(),
        rows = dataset.len(),
        "lagged series ready"
    );
    Ok(dataset)
}
