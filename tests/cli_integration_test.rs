//! CLI integration tests for command orchestration.
//!
//! Tests cover:
//! - Config parsing into optimizer settings and portfolios
//! - Every subcommand against real INI and CSV files on disk
//! - Error families surfaced for bad configs and missing data

mod common;

use common::*;
use signalfolio::adapters::file_config_adapter::FileConfigAdapter;
use signalfolio::cli::{self, Cli, Command};
use signalfolio::domain::error::SignalfolioError;
use clap::Parser;
use tempfile::TempDir;

fn parse(args: &[&str]) -> Command {
    let mut full = vec!["signalfolio"];
    full.extend_from_slice(args);
    Cli::try_parse_from(full).unwrap().command
}

fn config_file() -> tempfile::NamedTempFile {
    write_temp_file(PORTFOLIO_INI)
}

fn data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write_daily_csv(dir.path(), "AAPL", &rebound_closes());
    write_daily_csv(dir.path(), "MSFT", &sine_closes(70));
    write_daily_csv(dir.path(), "TLT", &linear_closes(12, 95.0, 0.05));
    dir
}

mod config_loading {
    use super::*;

    #[test]
    fn build_optimizer_reads_settings_and_weights() {
        let adapter = FileConfigAdapter::from_string(PORTFOLIO_INI).unwrap();
        let optimizer = cli::build_optimizer(&adapter).unwrap();
        assert_eq!(optimizer.settings.risk_parity_iterations, 25);
        assert_eq!(optimizer.settings.default_correlation, 0.5);
        assert_eq!(optimizer.signal_weights.trend, 0.4);
    }

    #[test]
    fn build_optimizer_uses_defaults() {
        let adapter = FileConfigAdapter::from_string("[portfolio]\nname = x\n").unwrap();
        let optimizer = cli::build_optimizer(&adapter).unwrap();
        assert_eq!(optimizer.settings.risk_parity_iterations, 10);
        assert_eq!(optimizer.settings.sharpe_floor, 0.01);
    }

    #[test]
    fn build_optimizer_rejects_bad_correlation() {
        let adapter =
            FileConfigAdapter::from_string("[optimizer]\ndefault_correlation = 1.5\n").unwrap();
        let err = cli::build_optimizer(&adapter).unwrap_err();
        assert!(matches!(err, SignalfolioError::ConfigInvalid { key, .. } if key == "default_correlation"));
    }

    #[test]
    fn load_config_missing_file() {
        let err = cli::load_config(std::path::Path::new("/nonexistent/signalfolio.ini")).unwrap_err();
        assert!(matches!(err, SignalfolioError::ConfigParse { .. }));
    }
}

mod commands {
    use super::*;

    #[test]
    fn validate_accepts_good_config() {
        let file = config_file();
        let path = file.path().to_str().unwrap();
        assert!(cli::execute(parse(&["validate", "--config", path])).is_ok());
    }

    #[test]
    fn validate_reports_missing_asset_statistics() {
        let file = write_temp_file(
            "[portfolio]\ntotal_value = 1000\nsymbols = AAPL\n\n[asset.AAPL]\nprice = 10\nvolatility = 0.2\n",
        );
        let path = file.path().to_str().unwrap();
        let err = cli::execute(parse(&["validate", "-c", path])).unwrap_err();
        assert!(
            matches!(err, SignalfolioError::ConfigMissing { ref section, ref key } if section == "asset.AAPL" && key == "expected_return")
        );
    }

    #[test]
    fn optimize_both_methods() {
        let file = config_file();
        let path = file.path().to_str().unwrap();
        assert!(cli::execute(parse(&["optimize", "-c", path])).is_ok());
        assert!(cli::execute(parse(&["optimize", "-c", path, "-m", "risk-parity"])).is_ok());
        assert!(cli::execute(parse(&["optimize", "-c", path, "--target-return", "0.1"])).is_ok());
    }

    #[test]
    fn metrics_and_stress() {
        let file = config_file();
        let path = file.path().to_str().unwrap();
        assert!(cli::execute(parse(&["metrics", "-c", path])).is_ok());
        assert!(cli::execute(parse(&["stress", "-c", path])).is_ok());
        assert!(cli::execute(parse(&["stress", "-c", path, "-s", "market_crash"])).is_ok());
    }

    #[test]
    fn stress_unknown_scenario_fails() {
        let file = config_file();
        let path = file.path().to_str().unwrap();
        let err = cli::execute(parse(&["stress", "-c", path, "-s", "meteor_strike"])).unwrap_err();
        assert!(matches!(err, SignalfolioError::UnknownScenario { name } if name == "meteor_strike"));
    }

    #[test]
    fn stress_runs_configured_scenario() {
        let ini = format!(
            "{}\n[scenario.meteor_strike]\nglobal_shock = -0.9\nvol_multiplier = 3\n",
            PORTFOLIO_INI
        );
        let file = write_temp_file(&ini);
        let path = file.path().to_str().unwrap();
        assert!(cli::execute(parse(&["stress", "-c", path, "-s", "meteor_strike"])).is_ok());
    }

    #[test]
    fn analyze_symbol_from_csv() {
        let dir = data_dir();
        let data = dir.path().to_str().unwrap();
        assert!(cli::execute(parse(&["analyze", "-d", data, "-s", "AAPL"])).is_ok());

        let file = config_file();
        let path = file.path().to_str().unwrap();
        assert!(cli::execute(parse(&[
            "analyze", "-d", data, "-s", "MSFT", "-c", path, "--start", "2024-01-10", "--end", "2024-12-31",
        ]))
        .is_ok());
    }

    #[test]
    fn analyze_missing_symbol_is_no_data() {
        let dir = data_dir();
        let data = dir.path().to_str().unwrap();
        let err = cli::execute(parse(&["analyze", "-d", data, "-s", "NFLX"])).unwrap_err();
        assert!(matches!(err, SignalfolioError::NoData { .. }));
    }

    #[test]
    fn analyze_empty_window_is_no_data() {
        let dir = data_dir();
        let data = dir.path().to_str().unwrap();
        let err = cli::execute(parse(&[
            "analyze", "-d", data, "-s", "AAPL", "--start", "2030-01-01",
        ]))
        .unwrap_err();
        assert!(matches!(err, SignalfolioError::NoData { .. }));
    }

    #[test]
    fn rebalance_from_csv_signals() {
        let dir = data_dir();
        let data = dir.path().to_str().unwrap();
        let file = config_file();
        let path = file.path().to_str().unwrap();
        assert!(cli::execute(parse(&["rebalance", "-c", path, "-d", data])).is_ok());
    }

    #[test]
    fn info_lists_every_symbol() {
        let dir = data_dir();
        let data = dir.path().to_str().unwrap();
        assert!(cli::execute(parse(&["info", "-d", data])).is_ok());
        assert!(cli::execute(parse(&["info", "-d", data, "-s", "AAPL", "-s", "NFLX"])).is_ok());
    }

    #[test]
    fn info_missing_directory_is_data_error() {
        let err = cli::execute(parse(&["info", "-d", "/nonexistent/signalfolio-data"])).unwrap_err();
        assert!(matches!(err, SignalfolioError::Data { .. }));
    }
}
