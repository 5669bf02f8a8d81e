//! Loading the decoder's output from disk: a raw text dump (pages separated
//! by form feeds or `--- PAGE n ---` markers) and an optional positioned
//! token JSON.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use folio_ingest::PositionedToken;

/// Split a raw text dump into pages. Falls back to a single page when no
/// separator is present.
pub fn split_pages(text: &str) -> Vec<String> {
    if text.contains('\u{c}') {
        return text.split('\u{c}').map(str::to_string).collect();
    }
    if text.lines().any(is_page_marker) {
        let mut pages = Vec::new();
        let mut current = String::new();
        for line in text.lines() {
            if is_page_marker(line) {
                if !current.is_empty() {
                    pages.push(std::mem::take(&mut current));
                }
                continue;
            }
            current.push_str(line);
            current.push('\n');
        }
        if !current.is_empty() {
            pages.push(current);
        }
        return pages;
    }
    vec![text.to_string()]
}

fn is_page_marker(line: &str) -> bool {
    let l = line.trim();
    l.starts_with("--- PAGE ") && l.ends_with("---")
}

pub fn load_dump(path: &Path) -> Result<Vec<String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(split_pages(&text))
}

pub fn load_tokens(path: &Path) -> Result<Vec<PositionedToken>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing tokens from {}", path.display()))
}
