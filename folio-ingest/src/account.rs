//! Label-anchored extraction of the account summary fields.
//!
//! One declarative table of `(field, label surface forms)` drives a single
//! loop: find the label's first line, join a short trailing window, take the
//! first digit-bearing numeric run, and parse it. The statement is bilingual
//! so most fields carry a German and an English form.

use std::sync::LazyLock;

use folio_core::types::{AccountField, RawAccount};
use folio_core::parse_number;
use regex::Regex;

use crate::diagnostics::Diagnostics;

/// Lines of context after the label line that may carry the value.
const VALUE_WINDOW: usize = 5;

/// Recognized surface forms per account field, first occurrence wins.
const FIELD_TABLE: &[(AccountField, &[&str])] = &[
    (AccountField::Deposits, &["Einzahlungen", "Deposits"]),
    (AccountField::Refunds, &["Rückerstattungen", "Refunds"]),
    (AccountField::Credits, &["Gutschriften", "Credits"]),
    (AccountField::Adjustments, &["Anpassungen", "Adjustments"]),
    (
        AccountField::RealizedPnl,
        &[
            r"Gewinn oder Verlust \(nur geschlossene Positionen\)",
            r"Gain or Loss \(closed positions only\)",
        ],
    ),
    (AccountField::Dividends, &["Dividenden", "Dividends"]),
    (AccountField::Overnight, &["Übernachtgebühren", "Overnight fees"]),
    (AccountField::Commission, &["Kommission", "Commission"]),
    (AccountField::StampDuty, &["Stempelsteuer", "Stamp duty"]),
    (AccountField::Withdrawals, &["Auszahlungen", "Withdrawals"]),
    (
        AccountField::WithdrawalFees,
        &["Auszahlungsgebühren", "Withdrawal fees"],
    ),
    (AccountField::FxFees, &["Umrechnungsgebühr", "Conversion fee"]),
    (
        AccountField::RealizedEnd,
        &["Realisiertes Eigenkapital - Ende", "Realized equity - End"],
    ),
];

static NUM_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-?\d[\d.,]*").unwrap());

static LABEL_RES: LazyLock<Vec<(AccountField, Vec<Regex>)>> = LazyLock::new(|| {
    FIELD_TABLE
        .iter()
        .map(|(field, forms)| {
            let res = forms
                .iter()
                .map(|f| Regex::new(&format!("(?i){f}")).unwrap())
                .collect();
            (*field, res)
        })
        .collect()
});

/// Extract every account field whose label appears in `lines`.
pub fn extract_account(lines: &[String], diag: &mut Diagnostics) -> RawAccount {
    let mut account = RawAccount::new();

    for (field, matchers) in LABEL_RES.iter() {
        let Some(idx) = lines
            .iter()
            .position(|l| matchers.iter().any(|re| re.is_match(l)))
        else {
            continue;
        };

        let hi = (idx + VALUE_WINDOW).min(lines.len());
        let window = lines[idx..hi].join(" ");
        if let Some(value) = first_number_in(&window) {
            account.insert(*field, value);
        }
    }

    diag.account_fields_found = account.len();
    if account.is_empty() {
        diag.note("no account summary labels found");
    }
    account
}

/// First digit-bearing run in the window, parsed. The parser may receive the
/// token with its parentheses already stripped by tokenization, so the wrap
/// is checked against the window text itself to force the sign.
fn first_number_in(window: &str) -> Option<f64> {
    let m = NUM_RUN.find(window)?;
    let value = parse_number(m.as_str())?;

    let wrapped = window[..m.start()].trim_end().ends_with('(')
        && window[m.end()..].trim_start().starts_with(')');
    Some(if wrapped { -value.abs() } else { value })
}
