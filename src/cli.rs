//! CLI definition and dispatch.
//!
//! Results go to stdout as pretty JSON; progress and errors go to stderr.

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::analyzer::{comprehensive_analysis, CategoryAnalysis};
use crate::domain::composite::{weighted_signal_with, CategoryWeights, CompositeThresholds};
use crate::domain::config::{
    load_category_weights, load_optimizer_settings, load_portfolio, load_scenarios,
    load_thresholds, validate_config,
};
use crate::domain::error::SignalfolioError;
use crate::domain::indicator::IndicatorResult;
use crate::domain::ohlcv::{Interval, PriceSeries};
use crate::domain::optimizer::PortfolioOptimizer;
use crate::domain::stress::stress_test_named;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(
    name = "signalfolio",
    about = "Technical indicator signals and portfolio optimization"
)]
pub struct Cli {
    /// Log filter, e.g. `debug` or `signalfolio=trace` (overrides RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run every indicator category over one symbol and print the composite signal
    Analyze {
        #[arg(short, long)]
        data_dir: PathBuf,
        #[arg(short, long)]
        symbol: String,
        #[arg(short, long, default_value = "daily")]
        interval: Interval,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Reads `[signals]` weights and threshold
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Compute an optimal allocation for the configured portfolio
    Optimize {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long, value_enum, default_value_t = OptimizationMethod::Mpt)]
        method: OptimizationMethod,
        /// Scale toward this annual return (mean-variance only)
        #[arg(long)]
        target_return: Option<f64>,
    },
    /// Suggest trades from each asset's technical signals
    Rebalance {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        data_dir: PathBuf,
        #[arg(short, long, default_value = "daily")]
        interval: Interval,
        #[arg(long)]
        start: Option<NaiveDate>,
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// Risk and return metrics at the current weights
    Metrics {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Apply stress scenarios to the configured portfolio
    Stress {
        #[arg(short, long)]
        config: PathBuf,
        /// Scenario to run; repeat for several. All scenarios when omitted.
        #[arg(short, long)]
        scenario: Vec<String>,
    },
    /// Show the data range for symbol(s)
    Info {
        #[arg(short, long)]
        data_dir: PathBuf,
        #[arg(short, long)]
        symbol: Vec<String>,
        #[arg(short, long, default_value = "daily")]
        interval: Interval,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OptimizationMethod {
    Mpt,
    RiskParity,
}

#[derive(Serialize)]
struct AnalysisReport<'a> {
    symbol: &'a str,
    interval: Interval,
    bars: usize,
    analysis: &'a CategoryAnalysis,
    composite: &'a IndicatorResult,
}

pub fn run(cli: Cli) -> ExitCode {
    match execute(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

/// Runs one command; the error decides the process exit code.
pub fn execute(command: Command) -> Result<(), SignalfolioError> {
    match command {
        Command::Analyze {
            data_dir,
            symbol,
            interval,
            start,
            end,
            config,
        } => run_analyze(&data_dir, &symbol, interval, start, end, config.as_deref()),
        Command::Optimize {
            config,
            method,
            target_return,
        } => run_optimize(&config, method, target_return),
        Command::Rebalance {
            config,
            data_dir,
            interval,
            start,
            end,
        } => run_rebalance(&config, &data_dir, interval, start, end),
        Command::Metrics { config } => run_metrics(&config),
        Command::Stress { config, scenario } => run_stress(&config, &scenario),
        Command::Info {
            data_dir,
            symbol,
            interval,
        } => run_info(&data_dir, &symbol, interval),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SignalfolioError> {
    eprintln!("Loading config from {}", path.display());
    FileConfigAdapter::from_file(path)
}

/// Open-ended bounds default to the whole available history.
pub fn date_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> (NaiveDate, NaiveDate) {
    (start.unwrap_or(NaiveDate::MIN), end.unwrap_or(NaiveDate::MAX))
}

pub fn build_optimizer(config: &dyn ConfigPort) -> Result<PortfolioOptimizer, SignalfolioError> {
    Ok(PortfolioOptimizer::new(load_optimizer_settings(config)?)
        .with_signal_weights(load_category_weights(config)?))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), SignalfolioError> {
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, value).map_err(std::io::Error::from)?;
    writeln!(out)?;
    Ok(())
}

fn run_analyze(
    data_dir: &Path,
    symbol: &str,
    interval: Interval,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    config_path: Option<&Path>,
) -> Result<(), SignalfolioError> {
    let (weights, thresholds) = match config_path {
        Some(path) => {
            let config = load_config(path)?;
            (load_category_weights(&config)?, load_thresholds(&config)?)
        }
        None => (CategoryWeights::default(), CompositeThresholds::default()),
    };

    let data = CsvAdapter::new(data_dir.to_path_buf());
    let (start, end) = date_bounds(start, end);
    let bars = data.fetch_bars(symbol, interval, start, end)?;
    if bars.is_empty() {
        return Err(SignalfolioError::NoData {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
        });
    }

    eprintln!("Analyzing {} ({}): {} bars", symbol, interval, bars.len());
    let series = PriceSeries::from_bars(&bars);
    let analysis = comprehensive_analysis(&series)?;
    let composite = weighted_signal_with(&analysis, &weights, &thresholds);

    print_json(&AnalysisReport {
        symbol,
        interval,
        bars: bars.len(),
        analysis: &analysis,
        composite: &composite,
    })
}

fn run_optimize(
    config_path: &Path,
    method: OptimizationMethod,
    target_return: Option<f64>,
) -> Result<(), SignalfolioError> {
    let config = load_config(config_path)?;
    let portfolio = load_portfolio(&config)?;
    let optimizer = build_optimizer(&config)?;

    eprintln!(
        "Optimizing {} ({} assets, {:?})",
        portfolio.name,
        portfolio.len(),
        method
    );
    let result = match method {
        OptimizationMethod::Mpt => optimizer.optimize_portfolio_mpt(&portfolio, target_return),
        OptimizationMethod::RiskParity => {
            if target_return.is_some() {
                eprintln!("warning: --target-return is ignored by risk parity");
            }
            optimizer.optimize_risk_parity(&portfolio)
        }
    };
    print_json(&result)
}

fn run_rebalance(
    config_path: &Path,
    data_dir: &Path,
    interval: Interval,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), SignalfolioError> {
    let config = load_config(config_path)?;
    let mut portfolio = load_portfolio(&config)?;
    let optimizer = build_optimizer(&config)?;
    let data = CsvAdapter::new(data_dir.to_path_buf());
    let (start, end) = date_bounds(start, end);

    let signals = optimizer.analyze_portfolio_signals(&mut portfolio, &data, interval, start, end);
    for asset in portfolio.assets() {
        eprintln!(
            "  {}: {} signals, strength {:+.2}",
            asset.symbol,
            signals.get(&asset.symbol).map_or(0, Vec::len),
            asset.signal_strength
        );
    }

    let actions = optimizer.signal_based_rebalancing(&portfolio, &signals);
    eprintln!("{} rebalance actions", actions.len());
    print_json(&actions)
}

fn run_metrics(config_path: &Path) -> Result<(), SignalfolioError> {
    let config = load_config(config_path)?;
    let portfolio = load_portfolio(&config)?;
    let optimizer = build_optimizer(&config)?;
    print_json(&optimizer.get_portfolio_metrics(&portfolio))
}

fn run_stress(config_path: &Path, names: &[String]) -> Result<(), SignalfolioError> {
    let config = load_config(config_path)?;
    let portfolio = load_portfolio(&config)?;
    let scenarios = load_scenarios(&config)?;
    let results = stress_test_named(&portfolio, &scenarios, names)?;

    for (name, result) in &results {
        eprintln!(
            "  {:<24} loss {:>7.2}%  survival {:.2}",
            name,
            result.loss_percentage * 100.0,
            result.survival_probability
        );
    }
    print_json(&results)
}

fn run_info(data_dir: &Path, symbols: &[String], interval: Interval) -> Result<(), SignalfolioError> {
    let data = CsvAdapter::new(data_dir.to_path_buf());
    let symbols = if symbols.is_empty() {
        data.list_symbols(interval)?
    } else {
        symbols.to_vec()
    };

    if symbols.is_empty() {
        eprintln!("No symbols found for interval {}", interval);
        return Ok(());
    }

    for symbol in &symbols {
        match data.get_data_range(symbol, interval) {
            Ok(Some((first, last, count))) => {
                println!("{} ({}): {} bars, {} to {}", symbol, interval, count, first, last);
            }
            Ok(None) => eprintln!("{} ({}): no data found", symbol, interval),
            Err(e) => eprintln!("error reading {} ({}): {}", symbol, interval, e),
        }
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), SignalfolioError> {
    let config = load_config(config_path)?;
    validate_config(&config)?;

    let portfolio = load_portfolio(&config)?;
    let scenarios = load_scenarios(&config)?;
    eprintln!(
        "Configuration is valid: portfolio '{}' with {} assets, {} stress scenarios",
        portfolio.name,
        portfolio.len(),
        scenarios.len()
    );
    Ok(())
}
