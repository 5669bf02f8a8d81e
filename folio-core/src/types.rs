use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate account fields carried by the statement summary section.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccountField {
    Deposits,
    Refunds,
    Credits,
    Adjustments,
    RealizedPnl,
    Dividends,
    Overnight,
    Commission,
    StampDuty,
    Withdrawals,
    WithdrawalFees,
    FxFees,
    RealizedEnd,
}

/// Account fields as extracted: a key is absent when its label was not found.
pub type RawAccount = BTreeMap<AccountField, f64>;

/// Direction of a closed position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Long,
    Short,
}

impl TradeSide {
    /// Case-insensitive parse of a bare `Long`/`Short` token.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Some(TradeSide::Long),
            "short" => Some(TradeSide::Short),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeSide::Long => "Long",
            TradeSide::Short => "Short",
        }
    }
}

/// One closed position as recovered from the statement text.
///
/// Every field except `position_id` is optional: the renderer may have
/// fragmented, reordered, or dropped any of them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrade {
    pub position_id: String,
    pub name: Option<String>,
    /// Ticker from the trailing parenthetical in `name`, e.g. "Elis SA (ELIS.PA)".
    pub symbol: Option<String>,
    pub side: Option<TradeSide>,
    /// Opening notional.
    pub amount: Option<f64>,
    pub units: Option<f64>,
    pub isin: Option<String>,
    pub open_px: Option<f64>,
    pub close_px: Option<f64>,
    pub opened_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    /// Accumulated trade-level fee total.
    pub fees: Option<f64>,
    pub dividends: Option<f64>,
    pub pnl: Option<f64>,
}

/// A dated, signed money movement. Withdrawals negative, deposits positive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashflowEntry {
    pub date: DateTime<Utc>,
    pub amount: f64,
    pub currency: String,
}

/// Raw extraction output, retained by the caller for re-normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawStatement {
    pub account: RawAccount,
    pub trades: Vec<RawTrade>,
    pub cashflows: Vec<CashflowEntry>,
}

/// Account summary with every field present; unextracted fields are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub deposits: f64,
    pub refunds: f64,
    pub credits: f64,
    pub adjustments: f64,
    pub realized_pnl: f64,
    pub dividends: f64,
    pub overnight: f64,
    pub commission: f64,
    pub stamp_duty: f64,
    pub withdrawals: f64,
    pub withdrawal_fees: f64,
    pub fx_fees: f64,
    pub realized_end: f64,
}

impl AccountSummary {
    pub fn from_raw(raw: &RawAccount) -> Self {
        let get = |f: AccountField| {
            raw.get(&f)
                .copied()
                .filter(|v| v.is_finite())
                .unwrap_or(0.0)
        };
        AccountSummary {
            deposits: get(AccountField::Deposits),
            refunds: get(AccountField::Refunds),
            credits: get(AccountField::Credits),
            adjustments: get(AccountField::Adjustments),
            realized_pnl: get(AccountField::RealizedPnl),
            dividends: get(AccountField::Dividends),
            overnight: get(AccountField::Overnight),
            commission: get(AccountField::Commission),
            stamp_duty: get(AccountField::StampDuty),
            withdrawals: get(AccountField::Withdrawals),
            withdrawal_fees: get(AccountField::WithdrawalFees),
            fx_fees: get(AccountField::FxFees),
            realized_end: get(AccountField::RealizedEnd),
        }
    }
}

/// Canonical trade record for export and analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTrade {
    pub position_id: String,
    pub name: String,
    pub symbol: String,
    pub side: Option<TradeSide>,
    pub amount: Option<f64>,
    pub units: Option<f64>,
    pub isin: String,
    pub pnl: Option<f64>,
}

/// Output of the normalizer: null-safe, fully-owned, ready for analytics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedData {
    pub account: AccountSummary,
    pub trades: Vec<NormalizedTrade>,
    pub cashflows: Vec<CashflowEntry>,
}
