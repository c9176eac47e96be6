//! Lagcast CLI: replay and evaluation commands.
//!
//! Commands:
//! - `run`: train the forecast model, replay bars through the strategy and
//!   print every emitted signal as a JSON line
//! - `evaluate`: train the model and report its hit rate on the held-out rows
//!
//! Logs go to stderr and are filtered with `RUST_LOG` (default `info`).

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use lagcast_core::config::RunConfig;
use lagcast_core::data::{BarSource, CsvBarSource, HistoricBarFeed, SyntheticBarSource};
use lagcast_core::engine::run_backtest;
use lagcast_core::model::evaluate;
use lagcast_core::strategy::{fit_model, prepare_dataset, ForecastStrategy};

#[derive(Parser)]
#[command(
    name = "lagcast",
    about = "Lagcast CLI: lagged-return forecast strategy"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay bars through the strategy and print signals as JSON lines.
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Backtest start date (YYYY-MM-DD). Overrides the config.
        #[arg(long)]
        start: Option<String>,

        /// Backtest end date (YYYY-MM-DD). Defaults to the config, then today.
        #[arg(long)]
        end: Option<String>,
    },
    /// Fit the model and report its hit rate on the test partition.
    Evaluate {
        #[command(flatten)]
        source: SourceArgs,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Symbol to trade. Overrides the config.
    #[arg(long)]
    symbol: Option<String>,

    /// Directory of `<SYMBOL>.csv` files. Overrides the config.
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Use seeded synthetic bars instead of CSV files.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Seed for synthetic bars.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { source, start, end } => {
            let mut cfg = load_config(&source)?;
            if let Some(start) = parse_date(start.as_deref())? {
                cfg.data.backtest_start = start;
            }
            if let Some(end) = parse_date(end.as_deref())? {
                cfg.data.backtest_end = Some(end);
            }
            run_cmd(&cfg)
        }
        Commands::Evaluate { source } => evaluate_cmd(&load_config(&source)?),
    }
}

fn parse_date(s: Option<&str>) -> Result<Option<NaiveDate>> {
    Ok(s.map(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d"))
        .transpose()?)
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(args: &SourceArgs) -> Result<RunConfig> {
    let mut cfg = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(symbol) = &args.symbol {
        cfg.strategy.symbol = symbol.clone();
    }
    if let Some(dir) = &args.csv_dir {
        cfg.data.csv_dir = dir.clone();
    }
    if args.synthetic {
        cfg.data.synthetic_seed = Some(args.seed);
    }
    Ok(cfg)
}

fn bar_source(cfg: &RunConfig) -> Box<dyn BarSource> {
    match cfg.data.synthetic_seed {
        Some(seed) => Box::new(SyntheticBarSource::new(seed, cfg.history_origin())),
        None => Box::new(CsvBarSource::new(cfg.data.csv_dir.clone())),
    }
}

fn run_cmd(cfg: &RunConfig) -> Result<()> {
    cfg.validate()?;
    let run_id = cfg.run_id()?;
    let source = bar_source(cfg);
    let spec = cfg.model_spec();
    info!(run = run_id.short(), source = source.name(), symbol = %spec.symbol, "starting run");

    let mut strategy = ForecastStrategy::new(&*source, &spec, cfg.strategy.classifier.build())
        .context("model construction failed")?;

    let start = cfg.data.backtest_start;
    let end = cfg
        .data
        .backtest_end
        .unwrap_or_else(|| chrono::Local::now().date_naive());
    if end < start {
        bail!("backtest end {end} is before backtest start {start}");
    }
    let bars = source.bars(&spec.symbol, start, end)?;
    let mut feed = HistoricBarFeed::new(&spec.symbol, bars)?;

    let summary = run_backtest(&mut feed, &mut strategy)?;
    for signal in &summary.signals {
        println!("{}", serde_json::to_string(signal)?);
    }
    eprintln!(
        "{} bars, {} signals, final position {:?}",
        summary.bars,
        summary.signals.len(),
        strategy.position()
    );
    Ok(())
}

fn evaluate_cmd(cfg: &RunConfig) -> Result<()> {
    cfg.validate()?;
    let source = bar_source(cfg);
    let spec = cfg.model_spec();

    let dataset = prepare_dataset(&*source, &spec)?;
    let model = fit_model(&dataset, spec.test_cutoff, cfg.strategy.classifier.build())?;
    let (_, test) = dataset.split(spec.test_cutoff);
    let report = evaluate(model.classifier(), test)?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
