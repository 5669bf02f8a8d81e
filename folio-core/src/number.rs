//! Locale-tolerant numeric token parsing.
//!
//! Statement amounts arrive in mixed shapes: `1,234.56`, `3.892,21`,
//! `1.000,00 USD`, `(250.00)` for accounting negatives. The parser never
//! fails hard; anything unrecognizable is `None`.

use std::sync::LazyLock;

use regex::Regex;

/// First run of digits and separators, with an optional leading minus.
static NUM_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d[\d.,]*").unwrap());

/// Dot used as a grouping separator: groups of exactly three digits,
/// optionally followed by a comma decimal (`3.892,21`, `1.234.567`).
static EU_GROUPED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(?:\.\d{3})+(?:,\d+)?$").unwrap());

/// Comma as the decimal separator: at least two decimal digits and no dot
/// after it (`1234,56`). A dot after the comma means US grouping instead.
static COMMA_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+,\d{2,}$").unwrap());

/// Accounting-negative wrap. The closing paren may be followed by
/// non-numeric trailing text such as a currency code (`(250.00) EUR`).
static PAREN_WRAP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\(.*\)\D*$").unwrap());

/// Parse a numeric token in either European or US notation.
///
/// Returns a finite value or `None`; never panics. Parenthesis-wrapped
/// input is negative regardless of any inner sign, whether or not a
/// currency code trails the wrap.
pub fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    let neg = PAREN_WRAP.is_match(s);
    let s: String = s.chars().filter(|c| *c != '(' && *c != ')').collect();

    let core = NUM_RUN.find(s.trim())?.as_str();
    let cleaned = if EU_GROUPED.is_match(core) {
        core.replace('.', "").replace(',', ".")
    } else if COMMA_DECIMAL.is_match(core) {
        core.replacen(',', ".", 1)
    } else {
        core.replace(',', "")
    };

    if cleaned.is_empty() || cleaned == "-" {
        return None;
    }
    let n: f64 = cleaned.parse().ok()?;
    if !n.is_finite() {
        return None;
    }
    Some(if neg { -n.abs() } else { n })
}
