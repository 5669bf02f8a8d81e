//! Trade block segmentation within the closed-positions section.
//!
//! The text renderer splits one logical trade row across a variable number
//! of physical lines, sometimes reordering or dropping fields. Recognition
//! is anchored on the position id (a bare 9-12 digit line) and runs one
//! consolidated strategy:
//!
//! 1. strict adjacency fast path: name on the line before the anchor, side,
//!    amount and units on the three lines after it;
//! 2. a labeled-value window scan around the anchor that fills whatever the
//!    adjacent block cannot carry (timestamps, prices, fees, pnl) and, when
//!    the fast path fails, recovers the fields themselves from an unordered
//!    proximity search.
//!
//! An anchor that yields none of name, symbol or pnl is not a trade.

use std::collections::HashSet;
use std::sync::LazyLock;

use folio_core::date::{DATETIME_RE, parse_datetime};
use folio_core::parse_number;
use folio_core::types::{RawTrade, TradeSide};
use regex::Regex;

use crate::diagnostics::Diagnostics;

/// Lines scanned ahead of an anchor in the proximity pass.
const WINDOW: usize = 8;

/// Lookahead for the column-header banner check.
const HEADER_WINDOW: usize = 8;

static RE_POS_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{9,12}$").unwrap());

static RE_ISIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}[A-Z0-9]{9}\d$").unwrap());

static RE_SIDE_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(Long|Short)$").unwrap());

/// "Elis SA (ELIS.PA)" shape: text with a trailing parenthesized ticker.
static RE_NAME_SYMBOL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*\(([A-Z0-9.\-]+)\)$").unwrap());

static RE_NUM_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(?-?\d[\d.,]*\)?").unwrap());

static RE_PNL_LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Gewinn|Verlust|Profit|Loss|P&L").unwrap());

// Column-header banner keywords. All five co-occurring in a short window
// means the window is the table header, not data.
static RE_H_ACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(Aktion|Action)\b").unwrap());
static RE_H_POS_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Positions-?\s?ID|Position\s+ID").unwrap());
static RE_H_SIDE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Long\s*/\s*Short").unwrap());
static RE_H_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(Betrag|Amount)\b").unwrap());
static RE_H_UNITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(Einheiten|Units)\b").unwrap());

// Labeled single-value lines seen in fragmented layouts.
static RE_L_UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Einheiten|Units)\s*:?\s*(\(?-?\d[\d.,]*\)?)").unwrap()
});
static RE_L_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Eröffnungskurs|Open(?:ing)?\s+rate)\s*:?\s*(\(?-?\d[\d.,]*\)?)").unwrap()
});
static RE_L_CLOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Schlusskurs|Clos(?:e|ing)\s+rate)\s*:?\s*(\(?-?\d[\d.,]*\)?)").unwrap()
});
static RE_L_AMOUNT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Betrag|Amount)\s*:?\s*(\(?-?\d[\d.,]*\)?)").unwrap()
});
static RE_L_FEES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Gebühren|Fees|Spread)\s*:?\s*(\(?-?\d[\d.,]*\)?)").unwrap()
});
static RE_L_DIVIDENDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Dividenden?|Dividends?)\s*:?\s*(\(?-?\d[\d.,]*\)?)").unwrap()
});

/// Segment the closed-positions line span into trade records.
///
/// Pure function of its input; re-running on the same lines yields the same
/// list. An ISIN line attaches to at most one trade: once a record's window
/// scan claims it, it is neither re-buffered nor claimed again.
pub fn segment_trades(section: &[String], diag: &mut Diagnostics) -> Vec<RawTrade> {
    let lines = join_fragments(section);
    let mut trades: Vec<RawTrade> = Vec::new();
    let mut pending_isin: Option<String> = None;
    let mut claimed_isins: HashSet<usize> = HashSet::new();

    let mut i = 0;
    while i < lines.len() {
        if is_header_banner(&lines, i) {
            i += HEADER_WINDOW;
            continue;
        }

        let line = &lines[i];
        if RE_ISIN.is_match(line) {
            // never a record by itself; buffered for the next accepted trade
            // unless an earlier record's window already took it
            if !claimed_isins.contains(&i) {
                pending_isin = Some(line.clone());
            }
            i += 1;
            continue;
        }

        if RE_POS_ID.is_match(line) {
            if let Some(mut rec) = recognize_at(&lines, i, &claimed_isins) {
                // a window-scanned ISIN beats the buffered one; the buffer is
                // cleared on every acceptance either way
                let pending = pending_isin.take();
                if rec.trade.isin.is_none() {
                    rec.trade.isin = pending;
                }
                if let Some(j) = rec.isin_line {
                    claimed_isins.insert(j);
                }
                trades.push(rec.trade);
                i = rec.resume;
                continue;
            }
        }

        i += 1;
    }

    if pending_isin.is_some() {
        diag.note("unattached ISIN at end of closed-positions span discarded");
    }
    trades
}

/// Merge rendering fragments before recognition: a line with an unclosed
/// `(`, or a tiny alphabetic stub, is the broken-off head of its successor
/// and is concatenated back. Numeric stubs are left alone so bare value
/// lines survive.
fn join_fragments(lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let cur = &lines[i];
        let unclosed_paren = cur.matches('(').count() > cur.matches(')').count();
        let alpha_stub = cur.len() <= 2 && cur.chars().all(|c| c.is_alphabetic());
        if (unclosed_paren || alpha_stub) && i + 1 < lines.len() {
            out.push(format!("{}{}", cur, lines[i + 1]));
            i += 2;
        } else {
            out.push(cur.clone());
            i += 1;
        }
    }
    out
}

/// True when the short lookahead window holds all five column labels.
fn is_header_banner(lines: &[String], i: usize) -> bool {
    let hi = (i + HEADER_WINDOW).min(lines.len());
    let window = lines[i..hi].join("\n");
    RE_H_ACTION.is_match(&window)
        && RE_H_POS_ID.is_match(&window)
        && RE_H_SIDE.is_match(&window)
        && RE_H_AMOUNT.is_match(&window)
        && RE_H_UNITS.is_match(&window)
}

/// An accepted anchor: the record, where the caller resumes scanning, and
/// the line index of the ISIN the window scan claimed, if any.
struct Recognition {
    trade: RawTrade,
    resume: usize,
    isin_line: Option<usize>,
}

/// Recognize the trade anchored at `lines[i]`, or `None` when the anchor is
/// not a real record. A fast-path acceptance resumes after the five-line
/// block; a fallback acceptance resumes after the whole inspected window so
/// lines the window already consumed are not rescanned as fresh input.
fn recognize_at(lines: &[String], i: usize, claimed: &HashSet<usize>) -> Option<Recognition> {
    let mut trade = RawTrade {
        position_id: lines[i].clone(),
        ..Default::default()
    };

    // fast path: the unfragmented five-line block
    let side = lines.get(i + 1).and_then(|l| TradeSide::parse(l));
    let amount = lines.get(i + 2).and_then(|l| parse_number(l));
    let units = lines.get(i + 3).and_then(|l| parse_number(l));
    let fast = if let (Some(side), Some(amount), Some(units)) = (side, amount, units) {
        trade.name = adjacent_name(lines, i);
        trade.side = Some(side);
        trade.amount = Some(amount);
        trade.units = Some(units);
        true
    } else {
        false
    };

    let (lo, hi) = window_bounds(lines, i);
    let resume = if fast { i + 4 } else { hi };
    let isin_line = enrich_from_window(lines, i, lo, hi, &mut trade, claimed);

    if trade.symbol.is_none() {
        trade.symbol = trade
            .name
            .as_deref()
            .and_then(|n| RE_NAME_SYMBOL.captures(n))
            .map(|c| c[2].to_string());
    }

    let keep = trade.name.as_deref().is_some_and(|s| !s.is_empty())
        || trade.symbol.is_some()
        || trade.pnl.is_some();
    keep.then(|| Recognition {
        trade,
        resume,
        isin_line,
    })
}

/// Name for the fast path: the line right before the anchor unless that is
/// an ISIN, in which case one line further back.
fn adjacent_name(lines: &[String], i: usize) -> Option<String> {
    let prev = i.checked_sub(1).map(|j| &lines[j])?;
    if !RE_ISIN.is_match(prev) {
        return Some(prev.clone());
    }
    let before = i.checked_sub(2).map(|j| &lines[j])?;
    (!RE_ISIN.is_match(before)).then(|| before.clone())
}

/// Lines looked at behind the anchor: the name/ISIN zone. Everything else a
/// row carries is rendered after its position id.
const NAME_ZONE: usize = 2;

/// Proximity window around the anchor. It never reaches into a neighboring
/// record: it stops at the next position-id line (reserving the line before
/// it, that record's name) and starts after the previous one.
fn window_bounds(lines: &[String], anchor: usize) -> (usize, usize) {
    let mut lo = anchor.saturating_sub(NAME_ZONE);
    if let Some(prev) = (lo..anchor).rev().find(|&j| RE_POS_ID.is_match(&lines[j])) {
        lo = prev + 1;
    }
    let mut hi = (anchor + WINDOW + 1).min(lines.len());
    if let Some(next) = (anchor + 1..hi).find(|&j| RE_POS_ID.is_match(&lines[j])) {
        hi = next.saturating_sub(1).max(anchor + 1);
    }
    (lo, hi)
}

/// Bounded proximity scan, in document order so the first match for a field
/// wins; fee values accumulate instead. Returns the line index of the ISIN
/// it took, if any; already-claimed ISIN lines are skipped.
fn enrich_from_window(
    lines: &[String],
    anchor: usize,
    lo: usize,
    hi: usize,
    t: &mut RawTrade,
    claimed: &HashSet<usize>,
) -> Option<usize> {
    let mut isin_line = None;

    for j in lo..hi {
        if j == anchor {
            continue;
        }
        let line = lines[j].as_str();

        if RE_ISIN.is_match(line) {
            if t.isin.is_none() && !claimed.contains(&j) {
                t.isin = Some(line.to_string());
                isin_line = Some(j);
            }
            continue;
        }

        if RE_SIDE_LINE.is_match(line) {
            if t.side.is_none() {
                t.side = TradeSide::parse(line);
            }
            continue;
        }

        // pnl before the name pattern: a "Gewinn (USD)" header fragment ends
        // in a parenthetical and would otherwise read as a name
        if RE_PNL_LABEL.is_match(line) {
            if t.pnl.is_none() {
                if let Some(m) = RE_NUM_TOKEN.find_iter(line).last() {
                    t.pnl = parse_number(m.as_str());
                }
            }
            continue;
        }

        if t.name.is_none() {
            if let Some(caps) = RE_NAME_SYMBOL.captures(line) {
                t.name = Some(line.to_string());
                t.symbol = Some(caps[2].to_string());
                continue;
            }
        }

        if let Some(v) = labeled_value(&RE_L_UNITS, line) {
            t.units.get_or_insert(v);
            continue;
        }
        if let Some(v) = labeled_value(&RE_L_OPEN, line) {
            t.open_px.get_or_insert(v);
            continue;
        }
        if let Some(v) = labeled_value(&RE_L_CLOSE, line) {
            t.close_px.get_or_insert(v);
            continue;
        }
        if let Some(v) = labeled_value(&RE_L_AMOUNT, line) {
            t.amount.get_or_insert(v);
            continue;
        }
        if let Some(v) = labeled_value(&RE_L_FEES, line) {
            t.fees = Some(t.fees.unwrap_or(0.0) + v);
            continue;
        }
        if let Some(v) = labeled_value(&RE_L_DIVIDENDS, line) {
            t.dividends.get_or_insert(v);
            continue;
        }

        let stamps: Vec<_> = DATETIME_RE
            .find_iter(line)
            .filter_map(|m| parse_datetime(m.as_str()))
            .collect();
        if stamps.len() >= 2 && t.opened_at.is_none() && t.closed_at.is_none() {
            t.opened_at = Some(stamps[0]);
            t.closed_at = Some(stamps[1]);
        } else if stamps.len() == 1 {
            if t.opened_at.is_none() {
                t.opened_at = Some(stamps[0]);
            } else if t.closed_at.is_none() {
                t.closed_at = Some(stamps[0]);
            }
        }
    }

    isin_line
}

fn labeled_value(re: &Regex, line: &str) -> Option<f64> {
    re.captures(line).and_then(|c| parse_number(&c[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn segment(raw: &[&str]) -> Vec<RawTrade> {
        segment_trades(&lines(raw), &mut Diagnostics::default())
    }

    const BLOCK: &[&str] = &[
        "Elis SA (ELIS.PA)",
        "1234567890",
        "Long",
        "1.000,00",
        "12,50",
    ];

    #[test]
    fn test_fast_path_block() {
        let trades = segment(BLOCK);
        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.position_id, "1234567890");
        assert_eq!(t.name.as_deref(), Some("Elis SA (ELIS.PA)"));
        assert_eq!(t.symbol.as_deref(), Some("ELIS.PA"));
        assert_eq!(t.side, Some(TradeSide::Long));
        assert_eq!(t.amount, Some(1000.0));
        assert_eq!(t.units, Some(12.5));
    }

    #[test]
    fn test_segmenter_is_idempotent() {
        let ls = lines(BLOCK);
        let first = segment_trades(&ls, &mut Diagnostics::default());
        let second = segment_trades(&ls, &mut Diagnostics::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_header_banner_not_parsed_as_data() {
        let mut all = vec![
            "Aktion",
            "Positions-ID",
            "Long/Short",
            "Betrag",
            "Einheiten",
            "Eröffnungskurs",
            "Schlusskurs",
            "Gebühren und Dividenden",
        ];
        all.extend_from_slice(BLOCK);
        let trades = segment(&all);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].position_id, "1234567890");
    }

    #[test]
    fn test_isin_attaches_to_next_trade() {
        let mut all = vec!["FR0012435121"];
        all.extend_from_slice(BLOCK);
        let trades = segment(&all);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].isin.as_deref(), Some("FR0012435121"));
    }

    #[test]
    fn test_second_isin_replaces_unattached_first() {
        let mut all = vec!["FR0012435121", "DE0007164600"];
        all.extend_from_slice(BLOCK);
        let trades = segment(&all);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].isin.as_deref(), Some("DE0007164600"));
    }

    #[test]
    fn test_anchor_without_fields_is_rejected() {
        let trades = segment(&["some prose", "1234567890", "more prose", "and more"]);
        assert!(trades.is_empty());
    }

    #[test]
    fn test_rejected_anchor_does_not_consume_following_block() {
        let mut all = vec!["9876543210", "not a side"];
        all.extend_from_slice(BLOCK);
        let trades = segment(&all);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].position_id, "1234567890");
    }

    #[test]
    fn test_fallback_recovers_fragmented_record() {
        let trades = segment(&[
            "1234567890",
            "Elis SA (ELIS.PA)",
            "Einheiten 12,50",
            "Eröffnungskurs 10,00",
            "Schlusskurs 11,00",
            "17-03-2025 08:20:48 18-03-2025 09:00:00",
            "Gewinn (USD) 25,00",
        ]);
        assert_eq!(trades.len(), 1);
        let t = &trades[0];
        assert_eq!(t.symbol.as_deref(), Some("ELIS.PA"));
        assert_eq!(t.units, Some(12.5));
        assert_eq!(t.open_px, Some(10.0));
        assert_eq!(t.close_px, Some(11.0));
        assert_eq!(t.pnl, Some(25.0));
        assert_eq!(
            t.opened_at.unwrap().to_rfc3339(),
            "2025-03-17T08:20:48+00:00"
        );
        assert_eq!(
            t.closed_at.unwrap().to_rfc3339(),
            "2025-03-18T09:00:00+00:00"
        );
    }

    #[test]
    fn test_fee_lines_accumulate() {
        let trades = segment(&[
            "1234567890",
            "Acme Corp (ACME)",
            "Gebühren 1,50",
            "Gebühren 0,75",
        ]);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].fees, Some(2.25));
    }

    #[test]
    fn test_unclosed_paren_fragment_joined() {
        let trades = segment(&["Elis SA (", "ELIS.PA)", "1234567890", "Long", "100,00", "5,00"]);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].name.as_deref(), Some("Elis SA (ELIS.PA)"));
        assert_eq!(trades[0].symbol.as_deref(), Some("ELIS.PA"));
    }

    #[test]
    fn test_window_claimed_isin_is_not_rebuffered_for_next_trade() {
        // fallback-accepted trade, then a fast-path trade, with the first
        // trade's ISIN sitting between the two anchors
        let trades = segment(&[
            "1234567890",
            "Elis SA (ELIS.PA)",
            "FR0012435121",
            "Gewinn (USD) 25,00",
            "9876543210",
            "Long",
            "100,00",
            "5,00",
        ]);
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].position_id, "1234567890");
        assert_eq!(trades[0].isin.as_deref(), Some("FR0012435121"));
        assert_eq!(trades[1].position_id, "9876543210");
        assert_eq!(trades[1].isin, None);
    }

    #[test]
    fn test_adjacent_blocks_keep_their_own_isins() {
        let trades = segment(&[
            "FR0012435121",
            "Elis SA (ELIS.PA)",
            "1234567890",
            "Long",
            "1.000,00",
            "12,50",
            "DE0007164600",
            "Acme Corp (ACME)",
            "9876543210",
            "Short",
            "200,00",
            "3,00",
        ]);
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[0].isin.as_deref(), Some("FR0012435121"));
        assert_eq!(trades[1].isin.as_deref(), Some("DE0007164600"));
    }

    #[test]
    fn test_name_skips_isin_line() {
        let trades = segment(&[
            "Elis SA (ELIS.PA)",
            "FR0012435121",
            "1234567890",
            "Long",
            "100,00",
            "5,00",
        ]);
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].name.as_deref(), Some("Elis SA (ELIS.PA)"));
        assert_eq!(trades[0].isin.as_deref(), Some("FR0012435121"));
    }
}
