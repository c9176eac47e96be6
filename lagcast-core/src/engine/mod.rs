//! Bar-by-bar replay loop.
//!
//! The loop stands in for the outer backtest driver: it releases one bar at a
//! time, queues the resulting market event, and drains the queue through the
//! strategy before releasing the next bar. Signals are collected, not executed.

pub mod loop_runner;

pub use loop_runner::{run_backtest, RunSummary};
