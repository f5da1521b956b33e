//! Price data access port trait.

use crate::domain::error::SignalfolioError;
use crate::domain::ohlcv::{Interval, PriceBar};
use chrono::NaiveDate;

/// Source of OHLCV bars. Implementations return bars sorted by timestamp.
pub trait DataPort {
    /// Bars for `symbol` whose date falls within `start..=end`.
    fn fetch_bars(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceBar>, SignalfolioError>;

    fn list_symbols(&self, interval: Interval) -> Result<Vec<String>, SignalfolioError>;

    /// First date, last date and bar count, or `None` when no bars exist.
    fn get_data_range(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Option<(NaiveDate, NaiveDate, usize)>, SignalfolioError>;
}
