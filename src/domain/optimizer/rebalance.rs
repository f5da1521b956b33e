//! Rebalance actions: moves from current weights to an optimized allocation,
//! and signal-driven weight adjustments.

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

use crate::domain::indicator::{IndicatorResult, Signal};
use crate::domain::portfolio::Portfolio;

/// Net signal above which an asset's weight is raised (below the negation, lowered).
pub const STRONG_SIGNAL: f64 = 0.5;
const SIGNAL_INCREASE: f64 = 1.2;
const SIGNAL_DECREASE: f64 = 0.8;
const MAX_SIGNAL_WEIGHT: f64 = 0.3;
const MIN_SIGNAL_WEIGHT: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeAction::Buy => f.write_str("BUY"),
            TradeAction::Sell => f.write_str("SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalanceAction {
    pub symbol: String,
    pub action: TradeAction,
    pub current_weight: f64,
    pub target_weight: f64,
    /// Notional to trade, |target - current| * total value. For signal
    /// rebalancing the target is the proposed weight before renormalization.
    pub amount: f64,
    pub reason: String,
}

/// Actions for every asset whose target deviates from its current weight by
/// strictly more than the portfolio's rebalance threshold. Assets missing from
/// `targets` are left alone.
pub fn rebalance_actions(
    portfolio: &Portfolio,
    targets: &HashMap<String, f64>,
) -> Vec<RebalanceAction> {
    portfolio
        .assets()
        .iter()
        .filter_map(|asset| {
            let target = *targets.get(&asset.symbol)?;
            let deviation = target - asset.weight;
            if deviation.abs() <= portfolio.rebalance_threshold {
                return None;
            }
            Some(RebalanceAction {
                symbol: asset.symbol.clone(),
                action: if deviation > 0.0 {
                    TradeAction::Buy
                } else {
                    TradeAction::Sell
                },
                current_weight: asset.weight,
                target_weight: target,
                amount: deviation.abs() * portfolio.total_value,
                reason: format!(
                    "Rebalance to target allocation (deviation: {:.1}%)",
                    deviation.abs() * 100.0
                ),
            })
        })
        .collect()
}

/// Sum of BUY strengths minus sum of SELL strengths.
pub fn net_signal(signals: &[IndicatorResult]) -> f64 {
    signals
        .iter()
        .map(|s| match s.signal {
            Signal::Buy => s.strength,
            Signal::Sell => -s.strength,
            _ => 0.0,
        })
        .sum()
}

/// Raises the weight of assets with a strong net BUY signal by 20% (capped at
/// 30%) and lowers strong SELLs by 20% (floored at 5%). Target weights are then
/// renormalized across the proposed actions so they sum to 1; `action` and
/// `amount` follow the proposed weight before renormalization.
pub fn signal_based_rebalancing(
    portfolio: &Portfolio,
    signals: &HashMap<String, Vec<IndicatorResult>>,
) -> Vec<RebalanceAction> {
    let mut proposals: Vec<(TradeAction, f64, &str, f64, f64)> = Vec::new();

    for asset in portfolio.assets() {
        let Some(asset_signals) = signals.get(&asset.symbol).filter(|s| !s.is_empty()) else {
            continue;
        };
        let net = net_signal(asset_signals);
        let current = asset.weight;

        if net > STRONG_SIGNAL {
            let target = (current * SIGNAL_INCREASE).min(MAX_SIGNAL_WEIGHT);
            if target > current {
                proposals.push((TradeAction::Buy, net, asset.symbol.as_str(), current, target));
            }
        } else if net < -STRONG_SIGNAL {
            let target = (current * SIGNAL_DECREASE).max(MIN_SIGNAL_WEIGHT);
            if target < current {
                proposals.push((TradeAction::Sell, net, asset.symbol.as_str(), current, target));
            }
        }
    }

    let total: f64 = proposals.iter().map(|p| p.4).sum();
    let scale = if total > 0.0 { total } else { 1.0 };
    debug!(actions = proposals.len(), total_target = total, "signal rebalancing");

    proposals
        .into_iter()
        .map(|(action, net, symbol, current, proposed)| {
            let label = match action {
                TradeAction::Buy => "buy",
                TradeAction::Sell => "sell",
            };
            RebalanceAction {
                symbol: symbol.to_string(),
                action,
                current_weight: current,
                target_weight: proposed / scale,
                // Sized from the proposal; the renormalized target can sit on
                // the other side of the current weight.
                amount: (proposed - current).abs() * portfolio.total_value,
                reason: format!("Strong {} signals (net: {:.2})", label, net),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::portfolio::Asset;
    use approx::assert_relative_eq;

    fn portfolio(weights: &[(&str, f64)]) -> Portfolio {
        let mut p = Portfolio::new("Rebal", 100_000.0);
        for (symbol, weight) in weights {
            p.add_asset(Asset::new(*symbol, *symbol, 10.0, 0.1, 0.2).with_weight(*weight))
                .unwrap();
        }
        p
    }

    fn targets(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
        pairs.iter().map(|(s, w)| (s.to_string(), *w)).collect()
    }

    fn sig(signal: Signal, strength: f64) -> IndicatorResult {
        IndicatorResult::new("S", 0.0, signal, strength)
    }

    #[test]
    fn actions_only_beyond_threshold() {
        let p = portfolio(&[("A", 0.5), ("B", 0.5)]);
        let actions = rebalance_actions(&p, &targets(&[("A", 0.7), ("B", 0.3)]));
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].action, TradeAction::Buy);
        assert_relative_eq!(actions[0].amount, 20_000.0, epsilon = 1e-6);
        assert_eq!(actions[1].action, TradeAction::Sell);
        assert_eq!(actions[1].reason, "Rebalance to target allocation (deviation: 20.0%)");
    }

    #[test]
    fn small_deviation_ignored() {
        let p = portfolio(&[("A", 0.5), ("B", 0.5)]);
        let actions = rebalance_actions(&p, &targets(&[("A", 0.53), ("B", 0.47)]));
        assert!(actions.is_empty());
    }

    #[test]
    fn deviation_equal_to_threshold_ignored() {
        let mut p = portfolio(&[("A", 0.5), ("B", 0.5)]);
        p.rebalance_threshold = 0.25;
        let actions = rebalance_actions(&p, &targets(&[("A", 0.75), ("B", 0.25)]));
        assert!(actions.is_empty());
    }

    #[test]
    fn net_signal_ignores_neutral_kinds() {
        let signals = vec![
            sig(Signal::Buy, 0.8),
            sig(Signal::Sell, 0.3),
            sig(Signal::Caution, 0.9),
            sig(Signal::Hold, 0.5),
        ];
        assert_relative_eq!(net_signal(&signals), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn strong_buy_and_sell_renormalized() {
        let p = portfolio(&[("A", 0.2), ("B", 0.5), ("C", 0.3)]);
        let mut signals = HashMap::new();
        signals.insert("A".to_string(), vec![sig(Signal::Buy, 0.8), sig(Signal::Buy, 0.6)]);
        signals.insert("B".to_string(), vec![sig(Signal::Sell, 0.7), sig(Signal::Sell, 0.6)]);
        signals.insert("C".to_string(), vec![sig(Signal::Buy, 0.4)]);

        let actions = signal_based_rebalancing(&p, &signals);
        assert_eq!(actions.len(), 2);
        // A: min(0.24, 0.3) = 0.24; B: max(0.4, 0.05) = 0.4; total 0.64
        assert_eq!(actions[0].symbol, "A");
        assert_eq!(actions[0].action, TradeAction::Buy);
        assert_relative_eq!(actions[0].target_weight, 0.24 / 0.64, epsilon = 1e-12);
        assert_eq!(actions[1].action, TradeAction::Sell);
        assert_relative_eq!(actions[1].target_weight, 0.4 / 0.64, epsilon = 1e-12);
        let total: f64 = actions.iter().map(|a| a.target_weight).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
        assert_eq!(actions[0].reason, "Strong buy signals (net: 1.40)");
    }

    #[test]
    fn single_sell_keeps_direction_and_notional() {
        let p = portfolio(&[("S0", 0.25), ("S1", 0.25), ("S2", 0.25), ("S3", 0.25)]);
        let mut signals = HashMap::new();
        signals.insert("S0".to_string(), vec![sig(Signal::Sell, 0.8)]);

        let actions = signal_based_rebalancing(&p, &signals);
        assert_eq!(actions.len(), 1);
        let sell = &actions[0];
        assert_eq!(sell.action, TradeAction::Sell);
        assert_eq!(sell.current_weight, 0.25);
        // the only proposal renormalizes to the whole allocation
        assert_relative_eq!(sell.target_weight, 1.0, epsilon = 1e-12);
        // 0.25 -> 0.20 proposed, a 5 point sale
        assert_relative_eq!(sell.amount, 5_000.0, epsilon = 1e-6);
    }

    #[test]
    fn buy_amounts_use_proposed_weights() {
        let p = portfolio(&[("A", 0.2), ("B", 0.5), ("C", 0.3)]);
        let mut signals = HashMap::new();
        signals.insert("A".to_string(), vec![sig(Signal::Buy, 0.9)]);
        signals.insert("B".to_string(), vec![sig(Signal::Sell, 0.9)]);

        let actions = signal_based_rebalancing(&p, &signals);
        assert_eq!(actions[0].action, TradeAction::Buy);
        // 0.20 -> 0.24
        assert_relative_eq!(actions[0].amount, 4_000.0, epsilon = 1e-6);
        assert_eq!(actions[1].action, TradeAction::Sell);
        // 0.50 -> 0.40
        assert_relative_eq!(actions[1].amount, 10_000.0, epsilon = 1e-6);
    }

    #[test]
    fn capped_weight_produces_no_buy() {
        let p = portfolio(&[("A", 0.4)]);
        let mut signals = HashMap::new();
        signals.insert("A".to_string(), vec![sig(Signal::Buy, 0.9)]);
        assert!(signal_based_rebalancing(&p, &signals).is_empty());
    }

    #[test]
    fn floored_weight_produces_no_sell() {
        let p = portfolio(&[("A", 0.04)]);
        let mut signals = HashMap::new();
        signals.insert("A".to_string(), vec![sig(Signal::Sell, 0.9)]);
        assert!(signal_based_rebalancing(&p, &signals).is_empty());
    }

    #[test]
    fn missing_signals_skipped() {
        let p = portfolio(&[("A", 0.5), ("B", 0.5)]);
        assert!(signal_based_rebalancing(&p, &HashMap::new()).is_empty());
    }
}
