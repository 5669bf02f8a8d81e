//! Statement date parsing: `dd-mm-yyyy` with an optional `hh:mm:ss` tail.

use std::sync::LazyLock;

use chrono::{DateTime, TimeZone, Utc};
use regex::Regex;

/// `dd` sep `mm` sep `yyyy`, sep in `-/.`, optional time of day.
pub static DATETIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{2})[-/.](\d{2})[-/.](\d{4})(?:\s+(\d{2}):(\d{2}):(\d{2}))?").unwrap()
});

/// Find and parse the first statement datetime in `s` as a UTC instant.
///
/// The printed fields are taken literally as UTC; there is no timezone
/// inference. Calendar-invalid prints (month 13, Feb 30) are `None`.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let caps = DATETIME_RE.captures(s)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    let hour: u32 = caps.get(4).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let min: u32 = caps.get(5).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let sec: u32 = caps.get(6).map_or(Ok(0), |m| m.as_str().parse()).ok()?;

    Utc.with_ymd_and_hms(year, month, day, hour, min, sec).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_datetime() {
        let dt = parse_datetime("25-02-2025 08:20:48").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-02-25T08:20:48+00:00");
    }

    #[test]
    fn test_date_only_is_midnight() {
        let dt = parse_datetime("17/03/2025").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-17T00:00:00+00:00");
    }

    #[test]
    fn test_dotted_separator() {
        let dt = parse_datetime("01.12.2024").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-12-01T00:00:00+00:00");
    }

    #[test]
    fn test_embedded_in_line() {
        let dt = parse_datetime("Einzahlung 17-03-2025 08:20:48 1.000,00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-17T08:20:48+00:00");
    }

    #[test]
    fn test_unparseable() {
        assert_eq!(parse_datetime("not a date"), None);
        assert_eq!(parse_datetime(""), None);
        // month 13 never existed
        assert_eq!(parse_datetime("05-13-2025"), None);
    }
}
