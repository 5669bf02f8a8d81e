//! Machine-inspectable trail of what extraction found (and failed to find).
//!
//! There is no global logging. Every heuristic that degrades or falls back
//! records a note here; the caller decides whether and how to surface it.

use std::ops::Range;

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    /// Line span of the closed-positions section, if its marker was found.
    pub closed_section: Option<Range<usize>>,
    /// Line span of the transactions section, if its marker was found.
    pub transactions_section: Option<Range<usize>>,
    pub line_count: usize,
    pub account_fields_found: usize,
    pub trade_count: usize,
    pub cashflow_count: usize,
    pub geometry_pnl_assigned: usize,
    pub notes: Vec<String>,
}

impl Diagnostics {
    pub fn note(&mut self, msg: impl Into<String>) {
        self.notes.push(msg.into());
    }
}
