//! Cashflow extraction from the transactions section.
//!
//! Every line carrying a date and a later numeric run is one candidate.
//! Deposit/withdrawal keywords force the sign; otherwise the printed sign
//! stands. Candidates with an unparseable date or amount are dropped.

use std::sync::LazyLock;

use folio_core::date::{DATETIME_RE, parse_datetime};
use folio_core::parse_number;
use folio_core::types::CashflowEntry;
use regex::Regex;

use crate::diagnostics::Diagnostics;

/// Safety valve against unterminated sections.
pub const MAX_SECTION_SCAN: usize = 2000;

static RE_WITHDRAWAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Auszahlung|Withdrawal").unwrap());

static RE_DEPOSIT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Einzahlung|Deposit").unwrap());

static RE_AMOUNT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(?-?\d[\d.,]*\)?").unwrap());

static RE_CURRENCY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(USD|EUR|GBP|CHF)\b").unwrap());

/// Extract signed dated cashflows from the transactions line span.
pub fn extract_cashflows(section: &[String], diag: &mut Diagnostics) -> Vec<CashflowEntry> {
    if section.len() > MAX_SECTION_SCAN {
        diag.note(format!(
            "transactions span truncated to {MAX_SECTION_SCAN} lines"
        ));
    }

    let mut out = Vec::new();
    for line in section.iter().take(MAX_SECTION_SCAN) {
        let Some(date_match) = DATETIME_RE.find(line) else {
            continue;
        };
        let Some(date) = parse_datetime(date_match.as_str()) else {
            continue;
        };

        let rest = &line[date_match.end()..];
        let Some(amount) = RE_AMOUNT_RUN.find(rest).and_then(|m| parse_number(m.as_str()))
        else {
            continue;
        };

        let amount = if RE_WITHDRAWAL.is_match(line) {
            -amount.abs()
        } else if RE_DEPOSIT.is_match(line) {
            amount.abs()
        } else {
            amount
        };

        let currency = RE_CURRENCY
            .find(line)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "USD".to_string());

        out.push(CashflowEntry {
            date,
            amount,
            currency,
        });
    }
    out
}
