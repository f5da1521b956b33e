#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use signalfolio::domain::error::SignalfolioError;
pub use signalfolio::domain::ohlcv::{Interval, PriceBar};
use signalfolio::domain::portfolio::{Asset, AssetClass, Portfolio};
use signalfolio::ports::data_port::DataPort;
use std::collections::HashMap;
use std::io::Write;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        symbol: &str,
        _interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, SignalfolioError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SignalfolioError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.timestamp.date() >= start && b.timestamp.date() <= end)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn list_symbols(&self, _interval: Interval) -> Result<Vec<String>, SignalfolioError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
        _interval: Interval,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SignalfolioError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(SignalfolioError::Data {
                reason: reason.clone(),
            });
        }
        match self.data.get(symbol) {
            Some(bars) if !bars.is_empty() => {
                let min = bars.iter().map(|b| b.timestamp.date()).min().unwrap();
                let max = bars.iter().map(|b| b.timestamp.date()).max().unwrap();
                Ok(Some((min, max, bars.len())))
            }
            _ => Ok(None),
        }
    }
}

pub fn day(n: usize) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + chrono::Duration::days(n as i64)
}

pub fn start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

pub fn end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 12, 31).unwrap()
}

/// Daily bars with a 2% high/low band around each close.
pub fn bars_from_closes(symbol: &str, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            symbol: symbol.to_string(),
            timestamp: day(i),
            open: if i == 0 { close } else { closes[i - 1] },
            high: close * 1.01,
            low: close * 0.99,
            close,
            volume: 1_000_000.0 + (i % 7) as f64 * 10_000.0,
            interval: Interval::Daily,
        })
        .collect()
}

pub fn linear_closes(n: usize, start: f64, step: f64) -> Vec<f64> {
    (0..n).map(|i| start + step * i as f64).collect()
}

/// A long decline followed by a sharp rally: oversold momentum with fresh
/// buying volume at the end.
pub fn rebound_closes() -> Vec<f64> {
    let mut closes = linear_closes(50, 150.0, -1.5);
    let last = *closes.last().unwrap();
    closes.extend((1..=6).map(|i| last + 4.0 * i as f64));
    closes
}

pub fn sine_closes(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + 5.0 * (i as f64 * 0.3).sin()).collect()
}

/// Two equities from the documented optimizer scenario: A (0.12, 0.30) and
/// B (0.08, 0.20) with correlation 0.5.
pub fn two_asset_portfolio() -> Portfolio {
    let mut p = Portfolio::equal_weighted(
        "Two Asset",
        100_000.0,
        vec![
            Asset::new("A", "Asset A", 100.0, 0.12, 0.30),
            Asset::new("B", "Asset B", 50.0, 0.08, 0.20),
        ],
    )
    .unwrap();
    p.set_correlation("A", "B", 0.5).unwrap();
    p
}

pub fn mixed_portfolio() -> Portfolio {
    let mut p = Portfolio::equal_weighted(
        "Mixed",
        250_000.0,
        vec![
            Asset::new("AAPL", "Apple", 190.0, 0.14, 0.28).with_tags(["tech", "growth"]),
            Asset::new("JNJ", "Johnson & Johnson", 155.0, 0.07, 0.15).with_tags(["value"]),
            Asset::new("TLT", "Long Treasuries", 95.0, 0.04, 0.12).with_class(AssetClass::Bond),
            Asset::new("GLD", "Gold", 185.0, 0.05, 0.16).with_class(AssetClass::Other),
        ],
    )
    .unwrap();
    p.set_correlation("AAPL", "JNJ", 0.4).unwrap();
    p.set_correlation("AAPL", "TLT", -0.2).unwrap();
    p.set_correlation("JNJ", "TLT", 0.1).unwrap();
    p.set_correlation("GLD", "TLT", 0.3).unwrap();
    p
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

/// Writes `<dir>/<symbol>_daily.csv` from closes.
pub fn write_daily_csv(dir: &std::path::Path, symbol: &str, closes: &[f64]) {
    let mut content = String::from("timestamp,open,high,low,close,volume\n");
    for bar in bars_from_closes(symbol, closes) {
        content.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    std::fs::write(dir.join(format!("{}_daily.csv", symbol)), content).unwrap();
}

pub const PORTFOLIO_INI: &str = r#"
[portfolio]
name = Core Holdings
total_value = 100000
cash = 2500
risk_free_rate = 0.045
rebalance_threshold = 0.05
symbols = AAPL, MSFT, TLT

[asset.AAPL]
name = Apple Inc.
price = 190
expected_return = 0.12
volatility = 0.30
tags = tech, growth

[asset.MSFT]
name = Microsoft
price = 410
expected_return = 0.10
volatility = 0.25
tags = tech

[asset.TLT]
name = Long Treasuries
price = 95
expected_return = 0.04
volatility = 0.12
class = bond

[correlation]
AAPL/MSFT = 0.7
AAPL/TLT = -0.2
MSFT/TLT = -0.1

[signals]
trend = 0.4
momentum = 0.3
volatility = 0.2
volume = 0.1
buy_threshold = 0.3

[optimizer]
default_correlation = 0.5
risk_parity_iterations = 25
"#;
