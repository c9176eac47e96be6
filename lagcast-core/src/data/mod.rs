//! Market data access: bar sources, the replay feed and lagged-return series.

pub mod csv_source;
pub mod handler;
pub mod lagged;
pub mod provider;
pub mod synthetic;

pub use csv_source::CsvBarSource;
pub use handler::{BarField, DataHandler, HistoricBarFeed};
pub use lagged::{build_lagged_series, select_features, LaggedRow, TrainingDataset};
pub use provider::{BarSource, DataError, InMemoryBarSource};
pub use synthetic::SyntheticBarSource;
