//! Indicator analyzer: classifies the latest value of each indicator into a
//! directional verdict, grouped into four categories.
//!
//! Each category decides on its own whether the series is long enough; a
//! category without enough data returns an empty list, which callers treat
//! as "no opinion".

use serde::Serialize;
use std::fmt;
use tracing::debug;

use super::error::SignalfolioError;
use super::indicator::{
    self, calculate_atr, calculate_bollinger, calculate_cmf, calculate_macd, calculate_obv,
    calculate_rsi, calculate_sma, calculate_stochastic, calculate_williams_r, last_two,
    IndicatorResult, Signal,
};
use super::ohlcv::PriceSeries;

pub const SMA_CROSSOVER_MIN_BARS: usize = 20;
pub const MACD_MIN_BARS: usize = 35;
pub const RSI_MIN_BARS: usize = 15;
pub const STOCHASTIC_MIN_BARS: usize = 17;
pub const WILLIAMS_MIN_BARS: usize = 15;
pub const BOLLINGER_MIN_BARS: usize = 20;
pub const ATR_MIN_BARS: usize = 15;
pub const OBV_MIN_BARS: usize = 2;
pub const CMF_MIN_BARS: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorCategory {
    Trend,
    Momentum,
    Volatility,
    Volume,
}

impl IndicatorCategory {
    pub const ALL: [IndicatorCategory; 4] = [
        IndicatorCategory::Trend,
        IndicatorCategory::Momentum,
        IndicatorCategory::Volatility,
        IndicatorCategory::Volume,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IndicatorCategory::Trend => "trend",
            IndicatorCategory::Momentum => "momentum",
            IndicatorCategory::Volatility => "volatility",
            IndicatorCategory::Volume => "volume",
        }
    }

    pub fn analyze(self, series: &PriceSeries) -> Result<Vec<IndicatorResult>, SignalfolioError> {
        match self {
            IndicatorCategory::Trend => Ok(analyze_trend(series)),
            IndicatorCategory::Momentum => analyze_momentum(series),
            IndicatorCategory::Volatility => analyze_volatility(series),
            IndicatorCategory::Volume => analyze_volume(series),
        }
    }
}

impl fmt::Display for IndicatorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Results of all four categories for one series.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct CategoryAnalysis {
    pub trend: Vec<IndicatorResult>,
    pub momentum: Vec<IndicatorResult>,
    pub volatility: Vec<IndicatorResult>,
    pub volume: Vec<IndicatorResult>,
}

impl CategoryAnalysis {
    pub fn get(&self, category: IndicatorCategory) -> &[IndicatorResult] {
        match category {
            IndicatorCategory::Trend => &self.trend,
            IndicatorCategory::Momentum => &self.momentum,
            IndicatorCategory::Volatility => &self.volatility,
            IndicatorCategory::Volume => &self.volume,
        }
    }

    pub fn insert(&mut self, category: IndicatorCategory, results: Vec<IndicatorResult>) {
        match category {
            IndicatorCategory::Trend => self.trend = results,
            IndicatorCategory::Momentum => self.momentum = results,
            IndicatorCategory::Volatility => self.volatility = results,
            IndicatorCategory::Volume => self.volume = results,
        }
    }

    /// Categories in trend, momentum, volatility, volume order.
    pub fn iter(&self) -> impl Iterator<Item = (IndicatorCategory, &[IndicatorResult])> {
        IndicatorCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    pub fn indicator_count(&self) -> usize {
        self.iter().map(|(_, results)| results.len()).sum()
    }

    /// The `per_category` strongest results of every category, strongest first
    /// within a category. Ties keep analyzer order.
    pub fn strongest(&self, per_category: usize) -> Vec<IndicatorResult> {
        let mut picked = Vec::new();
        for (_, results) in self.iter() {
            let mut sorted: Vec<&IndicatorResult> = results.iter().collect();
            sorted.sort_by(|a, b| b.strength.total_cmp(&a.strength));
            picked.extend(sorted.into_iter().take(per_category).cloned());
        }
        picked
    }
}

/// Runs every category over the series.
pub fn comprehensive_analysis(series: &PriceSeries) -> Result<CategoryAnalysis, SignalfolioError> {
    let mut analysis = CategoryAnalysis::default();
    for category in IndicatorCategory::ALL {
        let results = category.analyze(series)?;
        debug!(%category, bars = series.len(), indicators = results.len(), "category analyzed");
        analysis.insert(category, results);
    }
    Ok(analysis)
}

/// SMA(10)/SMA(20) crossover and MACD histogram sign flips.
pub fn analyze_trend(series: &PriceSeries) -> Vec<IndicatorResult> {
    let prices = series.closes();
    let mut results = Vec::new();

    if prices.len() >= SMA_CROSSOVER_MIN_BARS {
        let sma_10 = calculate_sma(prices, 10);
        let sma_20 = calculate_sma(prices, 20);
        if let (Some(&last_10), Some(&last_20)) = (sma_10.last(), sma_20.last()) {
            let (prev_10, _) = last_two(&sma_10).unwrap_or((last_10, last_10));
            let (prev_20, _) = last_two(&sma_20).unwrap_or((last_20, last_20));

            let (signal, strength) = if prev_10 <= prev_20 && last_10 > last_20 {
                (Signal::Buy, 0.8)
            } else if prev_10 >= prev_20 && last_10 < last_20 {
                (Signal::Sell, 0.8)
            } else {
                (Signal::Hold, 0.5)
            };

            results.push(
                IndicatorResult::new("SMA_Crossover", last_10 - last_20, signal, strength)
                    .with_meta("sma10", last_10)
                    .with_meta("sma20", last_20),
            );
        }
    }

    if prices.len() >= MACD_MIN_BARS {
        let macd = calculate_macd(
            prices,
            indicator::macd::DEFAULT_FAST,
            indicator::macd::DEFAULT_SLOW,
            indicator::macd::DEFAULT_SIGNAL,
        );
        if let (Some(&line), Some(&signal_line), Some(&hist)) =
            (macd.line.last(), macd.signal.last(), macd.histogram.last())
        {
            let prev_hist = last_two(&macd.histogram).map(|(prev, _)| prev);
            let (signal, strength) = match prev_hist {
                Some(prev) if hist > 0.0 && prev <= 0.0 => (Signal::Buy, 0.7),
                Some(prev) if hist < 0.0 && prev >= 0.0 => (Signal::Sell, 0.7),
                _ => (Signal::Hold, 0.6),
            };

            results.push(
                IndicatorResult::new("MACD", hist, signal, strength)
                    .with_meta("macd", line)
                    .with_meta("signal", signal_line)
                    .with_meta("histogram", hist),
            );
        }
    }

    results
}

/// RSI, Stochastic and Williams %R. The last two need highs and lows.
pub fn analyze_momentum(series: &PriceSeries) -> Result<Vec<IndicatorResult>, SignalfolioError> {
    let prices = series.closes();
    let mut results = Vec::new();

    if prices.len() >= RSI_MIN_BARS {
        if let Some(&rsi) = calculate_rsi(prices, indicator::rsi::DEFAULT_PERIOD).last() {
            let (signal, strength) = if rsi > 70.0 {
                (Signal::Sell, ((rsi - 70.0) / 30.0).min(0.8))
            } else if rsi < 30.0 {
                (Signal::Buy, ((30.0 - rsi) / 30.0).min(0.8))
            } else {
                (Signal::Hold, 0.5)
            };
            results.push(
                IndicatorResult::new("RSI", rsi, signal, strength)
                    .with_meta("period", indicator::rsi::DEFAULT_PERIOD as f64),
            );
        }
    }

    let Some((highs, lows)) = series.high_low() else {
        return Ok(results);
    };

    if prices.len() >= STOCHASTIC_MIN_BARS {
        let k_period = indicator::stochastic::DEFAULT_K_PERIOD;
        let d_period = indicator::stochastic::DEFAULT_D_PERIOD;
        let stoch = calculate_stochastic(highs, lows, prices, k_period, d_period)?;
        if let (Some(&k), Some(&d)) = (stoch.k.last(), stoch.d.last()) {
            let crossed = last_two(&stoch.k).zip(last_two(&stoch.d));
            let (signal, strength) = if k > 80.0 && d > 80.0 {
                (Signal::Sell, 0.7)
            } else if k < 20.0 && d < 20.0 {
                (Signal::Buy, 0.7)
            } else {
                match crossed {
                    Some(((prev_k, _), (prev_d, _))) if k > d && prev_k <= prev_d => {
                        (Signal::Buy, 0.6)
                    }
                    Some(((prev_k, _), (prev_d, _))) if k < d && prev_k >= prev_d => {
                        (Signal::Sell, 0.6)
                    }
                    _ => (Signal::Hold, 0.5),
                }
            };
            results.push(
                IndicatorResult::new("Stochastic", k, signal, strength)
                    .with_meta("k", k)
                    .with_meta("d", d)
                    .with_meta("k_period", k_period as f64)
                    .with_meta("d_period", d_period as f64),
            );
        }
    }

    if prices.len() >= WILLIAMS_MIN_BARS {
        let period = indicator::williams::DEFAULT_PERIOD;
        if let Some(&r) = calculate_williams_r(highs, lows, prices, period)?.last() {
            let (signal, strength) = if r > -20.0 {
                (Signal::Sell, ((r + 20.0) / 20.0).min(0.8))
            } else if r < -80.0 {
                (Signal::Buy, ((-80.0 - r) / 20.0).min(0.8))
            } else {
                (Signal::Hold, 0.5)
            };
            results.push(
                IndicatorResult::new("Williams_R", r, signal, strength)
                    .with_meta("period", period as f64),
            );
        }
    }

    Ok(results)
}

/// Bollinger Band touches and the ATR volatility ratio. ATR needs highs and lows.
///
/// Zero-width bands (a flat window) never count as a touch: the price sits on
/// both bands at once, so the result is HOLD 0.4 rather than a zero-strength BUY.
/// Both contribute nothing to the composite score.
pub fn analyze_volatility(series: &PriceSeries) -> Result<Vec<IndicatorResult>, SignalfolioError> {
    let prices = series.closes();
    let mut results = Vec::new();

    if prices.len() >= BOLLINGER_MIN_BARS {
        let bands = calculate_bollinger(
            prices,
            indicator::bollinger::DEFAULT_PERIOD,
            indicator::bollinger::DEFAULT_MULTIPLIER,
        );
        if let (Some(&price), Some(&middle), Some(&upper), Some(&lower)) = (
            prices.last(),
            bands.middle.last(),
            bands.upper.last(),
            bands.lower.last(),
        ) {
            let width = upper - lower;
            let (signal, strength) = if width > 0.0 && price <= lower {
                (Signal::Buy, ratio(lower - price, lower).min(0.8))
            } else if width > 0.0 && price >= upper {
                (Signal::Sell, ratio(price - upper, upper).min(0.8))
            } else if ratio(width, middle) > 0.1 {
                (Signal::Hold, 0.6)
            } else {
                (Signal::Hold, 0.4)
            };

            results.push(
                IndicatorResult::new("Bollinger_Bands", ratio(price - middle, width), signal, strength)
                    .with_meta("price", price)
                    .with_meta("sma", middle)
                    .with_meta("upper", upper)
                    .with_meta("lower", lower),
            );
        }
    }

    if let Some((highs, lows)) = series.high_low() {
        if prices.len() >= ATR_MIN_BARS {
            let period = indicator::atr::DEFAULT_PERIOD;
            if let Some(&atr) = calculate_atr(highs, lows, prices, period)?.last() {
                let recent = &prices[prices.len() - period..];
                let avg_price = recent.iter().sum::<f64>() / period as f64;
                let volatility_ratio = ratio(atr, avg_price);

                let (signal, strength) = if volatility_ratio > 0.05 {
                    (Signal::Caution, (volatility_ratio * 10.0).min(0.9))
                } else if volatility_ratio < 0.01 {
                    (Signal::Neutral, 0.3)
                } else {
                    (Signal::Neutral, 0.5)
                };

                results.push(
                    IndicatorResult::new("ATR", atr, signal, strength)
                        .with_meta("volatility_ratio", volatility_ratio)
                        .with_meta("period", period as f64),
                );
            }
        }
    }

    Ok(results)
}

/// OBV direction and Chaikin Money Flow. Needs volumes; CMF also needs highs and lows.
pub fn analyze_volume(series: &PriceSeries) -> Result<Vec<IndicatorResult>, SignalfolioError> {
    let prices = series.closes();
    let mut results = Vec::new();

    let Some(volumes) = series.volumes() else {
        return Ok(results);
    };

    if prices.len() >= OBV_MIN_BARS {
        if let Some((prev, last)) = last_two(&calculate_obv(prices, volumes)?) {
            let (signal, strength) = if last > prev {
                (Signal::Buy, 0.6)
            } else if last < prev {
                (Signal::Sell, 0.6)
            } else {
                (Signal::Hold, 0.4)
            };
            results.push(
                IndicatorResult::new("OBV", last, signal, strength).with_meta("change", last - prev),
            );
        }
    }

    if let Some((highs, lows)) = series.high_low() {
        if prices.len() >= CMF_MIN_BARS {
            let period = indicator::cmf::DEFAULT_PERIOD;
            if let Some(&cmf) = calculate_cmf(highs, lows, prices, volumes, period)?.last() {
                let (signal, strength) = if cmf > 0.25 {
                    (Signal::Buy, cmf.min(0.8))
                } else if cmf < -0.25 {
                    (Signal::Sell, cmf.abs().min(0.8))
                } else {
                    (Signal::Hold, 0.5)
                };
                results.push(
                    IndicatorResult::new("CMF", cmf, signal, strength)
                        .with_meta("period", period as f64),
                );
            }
        }
    }

    Ok(results)
}

/// numerator / denominator, 0 when the denominator is 0.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
