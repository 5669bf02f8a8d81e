//! Geometry-assisted PnL recovery from positioned text tokens.
//!
//! The line-based segmenter often cannot see a trade's profit column because
//! the renderer interleaves it with other cells. When positioned tokens are
//! available, the profit column's x position is recovered from its header
//! and numeric tokens in that column are matched to position-id rows by
//! vertical proximity. Strictly an enhancement: trades parse fine without it.
//!
//! A statement carrying two profit columns (multi-currency) is not
//! disambiguated; the most frequent header bucket wins.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use folio_core::parse_number;
use folio_core::types::RawTrade;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;

/// One text fragment with its page position, as produced by the decoder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedToken {
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub page: usize,
}

/// Header x positions are clustered into buckets of this width.
const X_BUCKET: f64 = 5.0;
/// Numeric tokens this far from the column center still belong to it.
const X_TOLERANCE: f64 = 10.0;
/// A value row may sit slightly off its position-id row.
const Y_TOLERANCE: f64 = 6.0;

static RE_PNL_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(Gewinn|Profit)\s*\([A-Z]{3}\)").unwrap());

static RE_POS_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{9,12}$").unwrap());

fn bucket(x: f64) -> i64 {
    (x / X_BUCKET).round() as i64 * X_BUCKET as i64
}

/// Assign per-trade pnl from the dominant profit column. Returns how many
/// trades received a value.
pub fn assign_geometry_pnl(
    trades: &mut [RawTrade],
    tokens: &[PositionedToken],
    diag: &mut Diagnostics,
) -> usize {
    let mut header_buckets: BTreeMap<i64, usize> = BTreeMap::new();
    for tok in tokens {
        if RE_PNL_HEADER.is_match(&tok.text) {
            *header_buckets.entry(bucket(tok.x)).or_insert(0) += 1;
        }
    }
    let Some(pnl_x) = header_buckets
        .iter()
        .max_by_key(|(_, count)| *count)
        .map(|(x, _)| *x as f64)
    else {
        diag.note("no profit column header found in positioned tokens");
        return 0;
    };

    let anchors: Vec<&PositionedToken> = tokens
        .iter()
        .filter(|t| RE_POS_ID.is_match(t.text.trim()))
        .collect();

    // position id -> (vertical distance, value); nearest row wins
    let mut best: BTreeMap<String, (f64, f64)> = BTreeMap::new();
    for tok in tokens {
        if (bucket(tok.x) as f64 - pnl_x).abs() > X_TOLERANCE {
            continue;
        }
        let Some(value) = parse_number(&tok.text) else {
            continue;
        };
        for anchor in &anchors {
            if anchor.page != tok.page {
                continue;
            }
            let dy = (anchor.y - tok.y).abs();
            if dy > Y_TOLERANCE {
                continue;
            }
            let id = anchor.text.trim().to_string();
            match best.get(&id) {
                Some((prev_dy, _)) if *prev_dy <= dy => {}
                _ => {
                    best.insert(id, (dy, value));
                }
            }
        }
    }

    let mut assigned = 0;
    for trade in trades.iter_mut() {
        if let Some((_, value)) = best.get(&trade.position_id) {
            trade.pnl = Some(*value);
            assigned += 1;
        }
    }
    assigned
}
