//! Deterministic synthetic bars for offline runs and tests.
//!
//! A seeded random walk over weekdays, generated from a fixed origin so that
//! any two requested ranges agree on the bars they share. Results produced on
//! synthetic data say nothing about real markets.

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{BarSource, DataError};
use crate::domain::Bar;

/// Maximum absolute daily return, as a fraction.
const MAX_DAILY_MOVE: f64 = 0.02;

/// Seeded random-walk bar source.
#[derive(Debug, Clone)]
pub struct SyntheticBarSource {
    seed: u64,
    origin: NaiveDate,
    start_price: f64,
}

impl SyntheticBarSource {
    pub fn new(seed: u64, origin: NaiveDate) -> Self {
        Self {
            seed,
            origin,
            start_price: 100.0,
        }
    }

    /// Generate every weekday bar from the origin up to `end`.
    pub fn generate(&self, symbol: &str, end: NaiveDate) -> Vec<Bar> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut bars = Vec::new();
        let mut price = self.start_price;
        let mut date = self.origin;

        while date <= end {
            if !matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                let change: f64 = rng.gen_range(-MAX_DAILY_MOVE..MAX_DAILY_MOVE);
                let open = price;
                price = (price * (1.0 + change)).max(1.0);
                let close = price;
                let spread: f64 = rng.gen_range(0.0..0.005);
                bars.push(Bar {
                    symbol: symbol.to_string(),
                    date,
                    open,
                    high: open.max(close) * (1.0 + spread),
                    low: open.min(close) * (1.0 - spread),
                    close,
                    volume: rng.gen_range(1_000_000..5_000_000),
                    adj_close: close,
                });
            }
            date += Duration::days(1);
        }
        bars
    }
}

impl BarSource for SyntheticBarSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn bars(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<Bar>, DataError> {
        let bars: Vec<Bar> = self
            .generate(symbol, end)
            .into_iter()
            .filter(|b| b.date >= start)
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
