//! Lagcast Core: forecast-driven long/flat signal generation.
//!
//! This crate contains the decision component of an event-driven backtest:
//! - Domain types (bars, market and signal events)
//! - Lagged-return series construction and train/test splitting
//! - Substitutable binary classifiers (QDA, logistic regression)
//! - The forecast strategy: warm-up gate, feature extraction, prediction and
//!   the Flat/Long position state machine
//! - Reference data feeds and a bar-by-bar replay loop for exercising the strategy

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod model;
pub mod strategy;

pub use error::{Result, StrategyError};
