//! CSV file data adapter.
//!
//! One file per symbol and interval: `<dir>/<SYMBOL>_<interval>.csv` with the
//! header `timestamp,open,high,low,close,volume`. Timestamps are
//! `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.

use crate::domain::error::SignalfolioError;
use crate::domain::ohlcv::{Interval, PriceBar};
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, interval))
    }

    /// Every bar in the file, sorted by timestamp.
    fn read_bars(&self, symbol: &str, interval: Interval) -> Result<Vec<PriceBar>, SignalfolioError> {
        let path = self.csv_path(symbol, interval);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SignalfolioError::NoData {
                symbol: symbol.to_string(),
                interval: interval.to_string(),
            },
            _ => SignalfolioError::Data {
                reason: format!("failed to read {}: {}", path.display(), e),
            },
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| SignalfolioError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let raw_timestamp = field(&record, 0, "timestamp")?;
            let timestamp = parse_timestamp(raw_timestamp).ok_or_else(|| SignalfolioError::Data {
                reason: format!("invalid timestamp '{}'", raw_timestamp),
            })?;

            bars.push(PriceBar {
                symbol: symbol.to_string(),
                timestamp,
                open: number(&record, 1, "open")?,
                high: number(&record, 2, "high")?,
                low: number(&record, 3, "low")?,
                close: number(&record, 4, "close")?,
                volume: number(&record, 5, "volume")?,
                interval,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        debug!(%symbol, %interval, bars = bars.len(), file = %path.display(), "csv loaded");
        Ok(bars)
    }
}

fn field<'r>(record: &'r csv::StringRecord, index: usize, name: &str) -> Result<&'r str, SignalfolioError> {
    record
        .get(index)
        .map(str::trim)
        .ok_or_else(|| SignalfolioError::Data {
            reason: format!("missing {} column", name),
        })
}

fn number(record: &csv::StringRecord, index: usize, name: &str) -> Result<f64, SignalfolioError> {
    field(record, index, name)?
        .parse()
        .map_err(|e| SignalfolioError::Data {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, SignalfolioError> {
        let mut bars = self.read_bars(symbol, interval)?;
        bars.retain(|b| {
            let date = b.timestamp.date();
            date >= start && date <= end
        });
        Ok(bars)
    }

    fn list_symbols(&self, interval: Interval) -> Result<Vec<String>, SignalfolioError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| SignalfolioError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let suffix = format!("_{}.csv", interval);
        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| SignalfolioError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(&suffix) {
                if !symbol.is_empty() {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }

    fn get_data_range(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SignalfolioError> {
        let bars = match self.read_bars(symbol, interval) {
            Ok(bars) => bars,
            Err(SignalfolioError::NoData { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };
        Ok(match (bars.first(), bars.last()) {
            (Some(first), Some(last)) => Some((
                first.timestamp.date(),
                last.timestamp.date(),
                bars.len(),
            )),
            _ => None,
        })
    }
}
