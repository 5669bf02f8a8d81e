//! folio-ingest: turns decoded statement text into raw account, trade and
//! cashflow records.
//!
//! The decoder (external) delivers page-ordered text and optionally
//! positioned tokens; everything here is synchronous pure computation over
//! those inputs. Output is a [`RawStatement`] the caller retains, plus a
//! [`Diagnostics`] trail describing what was and was not found.

pub mod account;
pub mod cashflows;
pub mod diagnostics;
pub mod geometry;
pub mod sections;
pub mod trades;

pub use diagnostics::Diagnostics;
pub use geometry::PositionedToken;
pub use sections::{SectionMap, find_sections, flatten_pages};

use folio_core::types::RawStatement;

/// Extraction knobs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ParseOptions {
    /// Recover per-trade pnl from positioned tokens when available.
    pub geometry_pnl: bool,
}

/// Run the full extraction pipeline over decoded pages.
///
/// Never fails: malformed content degrades to absent fields and empty record
/// lists, with the degradation recorded in the diagnostics.
pub fn parse_statement(
    pages: &[String],
    tokens: Option<&[PositionedToken]>,
    opts: &ParseOptions,
) -> (RawStatement, Diagnostics) {
    let lines = flatten_pages(pages);
    let mut diag = Diagnostics {
        line_count: lines.len(),
        ..Default::default()
    };

    let account = account::extract_account(&lines, &mut diag);

    let map = find_sections(&lines);
    diag.closed_section = map.closed.clone();
    diag.transactions_section = map.transactions.clone();

    let closed_span: &[String] = match &map.closed {
        Some(r) => &lines[r.clone()],
        None => {
            diag.note("closed-positions marker not found, scanning whole document");
            &lines
        }
    };
    let mut trades = trades::segment_trades(closed_span, &mut diag);

    let cashflows = match &map.transactions {
        Some(r) => cashflows::extract_cashflows(&lines[r.clone()], &mut diag),
        None => {
            diag.note("transactions marker not found, no cashflows extracted");
            Vec::new()
        }
    };

    if opts.geometry_pnl {
        match tokens {
            Some(tokens) if !tokens.is_empty() => {
                diag.geometry_pnl_assigned =
                    geometry::assign_geometry_pnl(&mut trades, tokens, &mut diag);
            }
            _ => diag.note("geometry pnl requested but no positioned tokens supplied"),
        }
    }

    diag.trade_count = trades.len();
    diag.cashflow_count = cashflows.len();

    (
        RawStatement {
            account,
            trades,
            cashflows,
        },
        diag,
    )
}
