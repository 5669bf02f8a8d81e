//! Section boundaries within the flattened statement text.
//!
//! The statement is a sequence of named sections (account summary, closed
//! positions, transactions, dividends). Each extractor works on the span
//! from its start marker to the next known marker, or to the end of the
//! document when no terminator appears.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

// Markers are anchored to the line start so summary labels that merely
// mention a section ("Gewinn oder Verlust (nur geschlossene Positionen)")
// do not open one.
static CLOSED_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(Geschlossene Positionen|Closed Positions)").unwrap());

static CLOSED_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(Dividendenübersicht|Dividends Overview|Transaktionen|Transactions|Kontoübersicht|Account Statement|Offene Positionen|Open Positions)",
    )
    .unwrap()
});

static TX_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(Transaktionen|Transactions)").unwrap());

static TX_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(Dividendenübersicht|Dividends Overview|Geschlossene Positionen|Closed Positions|Kontoübersicht|Account Statement)",
    )
    .unwrap()
});

/// Line spans of the two record-bearing sections. A span starts at the
/// marker line itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMap {
    pub closed: Option<Range<usize>>,
    pub transactions: Option<Range<usize>>,
}

/// Join page texts and split into trimmed, non-empty lines.
pub fn flatten_pages(pages: &[String]) -> Vec<String> {
    pages
        .iter()
        .flat_map(|p| p.lines())
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn find_sections(lines: &[String]) -> SectionMap {
    SectionMap {
        closed: span(lines, &CLOSED_START, &CLOSED_END),
        transactions: span(lines, &TX_START, &TX_END),
    }
}

fn span(lines: &[String], start: &Regex, end: &Regex) -> Option<Range<usize>> {
    let s = lines.iter().position(|l| start.is_match(l))?;
    let e = lines[s + 1..]
        .iter()
        .position(|l| end.is_match(l))
        .map(|off| s + 1 + off)
        .unwrap_or(lines.len());
    Some(s..e)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sections_with_terminators() {
        let ls = lines(&[
            "Kontoübersicht",
            "Geschlossene Positionen",
            "123456789",
            "Transaktionen",
            "17-03-2025 Einzahlung 1.000,00",
            "Dividendenübersicht",
        ]);
        let map = find_sections(&ls);
        assert_eq!(map.closed, Some(1..3));
        assert_eq!(map.transactions, Some(3..5));
    }

    #[test]
    fn test_unterminated_section_runs_to_end() {
        let ls = lines(&["Closed Positions", "123456789", "Long"]);
        let map = find_sections(&ls);
        assert_eq!(map.closed, Some(0..3));
        assert_eq!(map.transactions, None);
    }

    #[test]
    fn test_flatten_pages_trims_and_drops_empty() {
        let pages = vec!["  a  \n\n b ".to_string(), "c".to_string()];
        assert_eq!(flatten_pages(&pages), vec!["a", "b", "c"]);
    }
}
