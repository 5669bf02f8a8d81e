//! Performance metrics derived from normalized statement data.
//!
//! Recomputed in full on every call; nothing is cached or mutated in place.

use folio_core::types::NormalizedData;
use serde::{Deserialize, Serialize};

use crate::xirr::xirr;

/// Read-only metrics snapshot.
///
/// `winrate` and `profit_factor` are `None` when undefined (no priced
/// trades, or no gains and no losses). `profit_factor` is `f64::INFINITY`
/// for a loss-free book with gains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub trade_count: usize,
    pub winrate: Option<f64>,
    pub profit_factor: Option<f64>,
    pub max_drawdown: f64,
    pub dividends: f64,
    pub realized_equity_end: f64,
    pub xirr: Option<f64>,
}

/// Compute all metrics from a normalized snapshot.
///
/// The win-rate denominator is the number of trades with a known pnl;
/// unpriced trades are excluded from the rate entirely.
pub fn compute_metrics(data: &NormalizedData) -> Metrics {
    let pnl: Vec<f64> = data.trades.iter().filter_map(|t| t.pnl).collect();

    let gains: f64 = pnl.iter().filter(|v| **v > 0.0).sum();
    let losses: f64 = pnl.iter().filter(|v| **v < 0.0).sum();
    let wins = pnl.iter().filter(|v| **v > 0.0).count();

    let winrate = if pnl.is_empty() {
        None
    } else {
        Some(wins as f64 / pnl.len() as f64)
    };

    let profit_factor = if losses != 0.0 {
        Some(gains / losses.abs())
    } else if gains > 0.0 {
        Some(f64::INFINITY)
    } else {
        None
    };

    Metrics {
        trade_count: data.trades.len(),
        winrate,
        profit_factor,
        max_drawdown: max_drawdown(&pnl),
        dividends: data.account.dividends,
        realized_equity_end: data.account.realized_end,
        xirr: xirr(&data.cashflows),
    }
}

/// Magnitude of the deepest peak-to-trough decline of the cumulative pnl
/// series, in trade-list order.
fn max_drawdown(pnl: &[f64]) -> f64 {
    let mut acc = 0.0;
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd: f64 = 0.0;
    for v in pnl {
        acc += v;
        peak = peak.max(acc);
        max_dd = max_dd.min(acc - peak);
    }
    max_dd.abs()
}
