//! Raw extraction output to the canonical, null-safe schema.

use crate::types::{AccountSummary, NormalizedData, NormalizedTrade, RawStatement};

/// Knobs applied during normalization. Re-running `normalize` with different
/// options on the same retained raw structures is the supported way to
/// recompute downstream results without re-extracting.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NormalizeOptions {
    /// Trades whose pnl could not be recovered borrow the opening amount.
    pub assume_amount_as_pnl: bool,
}

/// Map raw structures to the canonical schema: trimmed strings, finite
/// numerics or `None`, invalid cashflows dropped. Pure; the input is not
/// touched.
pub fn normalize(raw: &RawStatement, opts: &NormalizeOptions) -> NormalizedData {
    let account = AccountSummary::from_raw(&raw.account);

    let trades = raw
        .trades
        .iter()
        .map(|t| {
            let mut pnl = finite(t.pnl);
            if opts.assume_amount_as_pnl && pnl.is_none() {
                pnl = finite(t.amount);
            }
            NormalizedTrade {
                position_id: t.position_id.trim().to_string(),
                name: trimmed(t.name.as_deref()),
                symbol: trimmed(t.symbol.as_deref()),
                side: t.side,
                amount: finite(t.amount),
                units: finite(t.units),
                isin: trimmed(t.isin.as_deref()),
                pnl,
            }
        })
        .collect();

    let cashflows = raw
        .cashflows
        .iter()
        .filter(|c| c.amount.is_finite())
        .cloned()
        .collect();

    NormalizedData {
        account,
        trades,
        cashflows,
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}

fn trimmed(s: Option<&str>) -> String {
    s.unwrap_or("").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CashflowEntry, RawTrade, TradeSide};
    use chrono::{TimeZone, Utc};

    fn raw_with_trade(t: RawTrade) -> RawStatement {
        RawStatement {
            trades: vec![t],
            ..Default::default()
        }
    }

    #[test]
    fn test_non_finite_numerics_become_none() {
        let raw = raw_with_trade(RawTrade {
            position_id: "123456789".into(),
            name: Some("  Acme Corp (ACME)  ".into()),
            amount: Some(f64::NAN),
            units: Some(f64::INFINITY),
            pnl: Some(12.5),
            ..Default::default()
        });

        let data = normalize(&raw, &NormalizeOptions::default());
        let t = &data.trades[0];
        assert_eq!(t.name, "Acme Corp (ACME)");
        assert_eq!(t.amount, None);
        assert_eq!(t.units, None);
        assert_eq!(t.pnl, Some(12.5));
    }

    #[test]
    fn test_assume_amount_as_pnl_fills_gaps_only() {
        let raw = RawStatement {
            trades: vec![
                RawTrade {
                    position_id: "111111111".into(),
                    name: Some("A".into()),
                    amount: Some(100.0),
                    pnl: None,
                    ..Default::default()
                },
                RawTrade {
                    position_id: "222222222".into(),
                    name: Some("B".into()),
                    amount: Some(100.0),
                    pnl: Some(-7.0),
                    ..Default::default()
                },
            ],
            ..Default::default()
        };

        let opts = NormalizeOptions {
            assume_amount_as_pnl: true,
        };
        let data = normalize(&raw, &opts);
        assert_eq!(data.trades[0].pnl, Some(100.0));
        assert_eq!(data.trades[1].pnl, Some(-7.0));
    }

    #[test]
    fn test_invalid_cashflows_dropped() {
        let raw = RawStatement {
            cashflows: vec![
                CashflowEntry {
                    date: Utc.with_ymd_and_hms(2025, 3, 17, 0, 0, 0).unwrap(),
                    amount: 1000.0,
                    currency: "USD".into(),
                },
                CashflowEntry {
                    date: Utc.with_ymd_and_hms(2025, 3, 18, 0, 0, 0).unwrap(),
                    amount: f64::NAN,
                    currency: "USD".into(),
                },
            ],
            ..Default::default()
        };

        let data = normalize(&raw, &NormalizeOptions::default());
        assert_eq!(data.cashflows.len(), 1);
        assert_eq!(data.cashflows[0].amount, 1000.0);
    }

    #[test]
    fn test_side_passthrough() {
        let raw = raw_with_trade(RawTrade {
            position_id: "123456789".into(),
            name: Some("A".into()),
            side: Some(TradeSide::Short),
            ..Default::default()
        });
        let data = normalize(&raw, &NormalizeOptions::default());
        assert_eq!(data.trades[0].side, Some(TradeSide::Short));
    }

    #[test]
    fn test_rerun_is_identical_and_input_untouched() {
        let raw = raw_with_trade(RawTrade {
            position_id: " 987654321 ".into(),
            name: Some("Acme".into()),
            pnl: Some(3.0),
            ..Default::default()
        });
        let first = normalize(&raw, &NormalizeOptions::default());
        let second = normalize(&raw, &NormalizeOptions::default());
        assert_eq!(first, second);
        assert_eq!(raw.trades[0].position_id, " 987654321 ");
    }
}
