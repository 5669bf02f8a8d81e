//! Fee breakdown and trade-category aggregation.

use std::sync::LazyLock;

use folio_core::types::{NormalizedData, NormalizedTrade};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Tickers classified as crypto regardless of the instrument name.
const CRYPTO_TICKERS: &[&str] = &["BTC", "ETH", "XRP", "ADA", "SOL", "DOGE", "LTC", "DOT"];

static RE_CRYPTO_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(BTC|ETH|XRP|Bitcoin|Ethereum|Krypto|Crypto)\b").unwrap()
});

/// Exchange suffixes and corporate-form tokens that mark a listed company.
static RE_EQUITY_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\.(PA|MC|DE|L|AS|MI)\b|\b(AG|NV|PLC|SA|SE|ADR|Bank)\b").unwrap()
});

/// Closed set of trade categories, first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeCategory {
    Crypto,
    Equity,
    CfdOther,
}

impl TradeCategory {
    pub fn label(&self) -> &'static str {
        match self {
            TradeCategory::Crypto => "Crypto",
            TradeCategory::Equity => "Equity",
            TradeCategory::CfdOther => "CFD/Other",
        }
    }
}

/// Classify one trade. Precedence: crypto, then listed equity, then the
/// CFD/other default.
pub fn classify(trade: &NormalizedTrade) -> TradeCategory {
    if CRYPTO_TICKERS.contains(&trade.symbol.as_str()) || RE_CRYPTO_NAME.is_match(&trade.name) {
        return TradeCategory::Crypto;
    }
    if RE_EQUITY_NAME.is_match(&trade.name) {
        return TradeCategory::Equity;
    }
    TradeCategory::CfdOther
}

/// The five account-level fee fields, passed through verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeBreakdown {
    pub overnight: f64,
    pub commission: f64,
    pub stamp_duty: f64,
    pub withdrawal_fees: f64,
    pub fx_fees: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregations {
    pub fees: FeeBreakdown,
    pub by_category: Vec<CategoryTotal>,
}

/// Recompute all aggregations from a normalized snapshot. Categories with no
/// trades are omitted; the rest appear in fixed precedence order.
pub fn aggregate(data: &NormalizedData) -> Aggregations {
    let fees = FeeBreakdown {
        overnight: data.account.overnight,
        commission: data.account.commission,
        stamp_duty: data.account.stamp_duty,
        withdrawal_fees: data.account.withdrawal_fees,
        fx_fees: data.account.fx_fees,
    };

    let by_category = [
        TradeCategory::Crypto,
        TradeCategory::Equity,
        TradeCategory::CfdOther,
    ]
    .iter()
    .filter_map(|cat| {
        let trades: Vec<_> = data.trades.iter().filter(|t| classify(t) == *cat).collect();
        if trades.is_empty() {
            return None;
        }
        let value = trades
            .iter()
            .map(|t| t.amount.unwrap_or(0.0).abs())
            .sum();
        Some(CategoryTotal {
            label: cat.label().to_string(),
            value,
        })
    })
    .collect();

    Aggregations { fees, by_category }
}
