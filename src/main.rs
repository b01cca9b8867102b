//! Investment Valuation CLI
//!
//! Values a holdings CSV, samples one holding's history, or reports the
//! benchmark rate in use. The benchmark rate comes from --benchmark-rate,
//! then the BENCHMARK_RATE environment variable (through the rate cache),
//! then the configured fallback.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use investment_valuation::benchmark::{
    load_snapshot, save_snapshot, BenchmarkError, BenchmarkSource, CachedBenchmark, CdiFromSelic,
    StaticSource,
};
use investment_valuation::investment::load_investments;
use investment_valuation::{value_portfolio, ValuationConfig, ValuationEngine};
use std::env;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "investment_valuation",
    version,
    about = "Fixed-income valuation with IR/IOF taxation"
)]
struct Cli {
    /// JSON file used to remember the last fetched benchmark rate
    #[arg(long, global = true)]
    rate_cache: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Value every holding in a CSV file
    Value {
        path: PathBuf,
        /// Benchmark (CDI) annual rate in percent
        #[arg(long)]
        benchmark_rate: Option<f64>,
        /// Valuation date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        as_of: Option<NaiveDate>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Sample the value history of one holding
    History {
        path: PathBuf,
        id: String,
        #[arg(long)]
        benchmark_rate: Option<f64>,
        #[arg(long)]
        as_of: Option<NaiveDate>,
        #[arg(long)]
        max_points: Option<usize>,
        /// Write CSV here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the benchmark rate that valuations would use
    Rate {
        /// Derive CDI from this Selic rate instead of the cached or BENCHMARK_RATE value
        #[arg(long)]
        selic: Option<f64>,
    },
}

/// Reads the benchmark rate from the BENCHMARK_RATE environment variable
struct EnvSource;

impl BenchmarkSource for EnvSource {
    fn fetch(&self) -> Result<f64, BenchmarkError> {
        let raw = env::var("BENCHMARK_RATE").map_err(|_| BenchmarkError::NoData)?;
        raw.trim()
            .parse()
            .map_err(|_| BenchmarkError::Parsing(format!("BENCHMARK_RATE={}", raw)))
    }
}

fn resolve_rate<S: BenchmarkSource>(
    source: S,
    config: &ValuationConfig,
    cache_path: Option<&Path>,
) -> Result<f64> {
    let snapshot = match cache_path {
        Some(path) => load_snapshot(path)
            .with_context(|| format!("reading rate cache {}", path.display()))?,
        None => None,
    };

    let mut benchmark = CachedBenchmark::new(source, config).with_snapshot(snapshot);
    let rate = benchmark.current(Utc::now());

    if let (Some(path), Some(snapshot)) = (cache_path, benchmark.snapshot()) {
        save_snapshot(path, &snapshot)
            .with_context(|| format!("writing rate cache {}", path.display()))?;
    }

    Ok(rate)
}

fn benchmark_rate(
    explicit: Option<f64>,
    config: &ValuationConfig,
    cache_path: Option<&Path>,
) -> Result<f64> {
    match explicit {
        Some(rate) => Ok(rate),
        None => resolve_rate(EnvSource, config, cache_path),
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let config = ValuationConfig::from_env();
    let engine = ValuationEngine::new(config.clone());
    let cache_path = cli.rate_cache.as_deref();
    let today = Utc::now().date_naive();

    match cli.command {
        Command::Value { path, benchmark_rate: explicit, as_of, json } => {
            let investments = load_investments(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            let rate = benchmark_rate(explicit, &config, cache_path)?;
            let portfolio = value_portfolio(&engine, &investments, rate, as_of.unwrap_or(today))?;

            if json {
                println!("{}", serde_json::to_string_pretty(&portfolio)?);
                return Ok(());
            }

            println!(
                "Valuation as of {} (benchmark {:.2}% a.a.)",
                portfolio.as_of, portfolio.benchmark_rate
            );
            println!(
                "{:<28} {:<12} {:<16} {:>6} {:>6} {:>14} {:>12} {:>14} {:>8} {:>8}",
                "Name", "Class", "Mode", "Days", "BDays", "Gross", "Taxes", "Net", "Chg%", "Yield%"
            );
            println!("{}", "-".repeat(133));

            for row in &portfolio.rows {
                let v = &row.valuation;
                println!(
                    "{:<28} {:<12} {:<16} {:>6} {:>6} {:>14.2} {:>12.2} {:>14.2} {:>8.2} {:>8.2}",
                    row.investment.name,
                    row.investment.asset_class.as_str(),
                    row.investment.rate_mode.as_str(),
                    v.calendar_days,
                    v.business_days,
                    v.gross_value,
                    v.total_taxes(),
                    v.net_value,
                    v.change_percent,
                    v.annualized_net_yield_percent,
                );
            }

            println!("{}", "-".repeat(133));
            println!(
                "{:<72} {:>14.2} {:>12.2} {:>14.2}",
                "Total", portfolio.total_gross, portfolio.total_taxes, portfolio.total_net
            );
        }
        Command::History { path, id, benchmark_rate: explicit, as_of, max_points, output } => {
            let investments = load_investments(&path)
                .with_context(|| format!("loading {}", path.display()))?;
            let investment = investments
                .iter()
                .find(|i| i.id == id)
                .ok_or_else(|| anyhow!("no investment with id {}", id))?;
            let rate = benchmark_rate(explicit, &config, cache_path)?;
            let now = as_of.unwrap_or(today);

            let history = match max_points {
                Some(n) => engine.project_history_sampled(investment, rate, now, n)?,
                None => engine.project_history(investment, rate, now)?,
            };

            if history.is_empty() {
                println!("{} has no computed history", investment.name);
                return Ok(());
            }

            match output {
                Some(out) => {
                    let mut writer = csv::Writer::from_path(&out)
                        .with_context(|| format!("creating {}", out.display()))?;
                    for point in &history {
                        writer.serialize(point)?;
                    }
                    writer.flush()?;
                    println!("{} points written to: {}", history.len(), out.display());
                }
                None => {
                    let mut writer = csv::Writer::from_writer(std::io::stdout());
                    for point in &history {
                        writer.serialize(point)?;
                    }
                    writer.flush()?;
                }
            }
        }
        Command::Rate { selic } => {
            let rate = match selic {
                Some(selic) => CdiFromSelic(StaticSource(selic)).fetch()?,
                None => resolve_rate(EnvSource, &config, cache_path)?,
            };
            println!("{:.2}", rate);
        }
    }

    Ok(())
}
