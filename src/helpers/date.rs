//! Date helper functions

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Format a date as `<day> <abbreviated month> <year>`
///
/// # Examples
/// ```ignore
/// date_to_string(&date) // -> "5 Mar 2024"
/// ```
pub fn date_to_string(date: &NaiveDateTime) -> String {
    date.format("%-d %b %Y").to_string()
}

/// Parse a date string in various formats.
///
/// Offsets are read but not applied: the wall-clock date as written is kept.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();

    let formats = [
        "%Y-%m-%d %H:%M:%S",
        "%Y/%m/%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for fmt in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }

    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    // RFC 3339 / ISO 8601 with offset
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }

    None
}

/// Parse a template or front-matter value: a date string or Unix seconds
pub fn parse_date_value(value: &Value) -> Option<NaiveDateTime> {
    match value {
        Value::String(s) => parse_date(s),
        Value::Number(n) => n
            .as_i64()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc()),
        _ => None,
    }
}

/// Source of "today" for the year shortcode
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
}

/// Wall clock in the local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Four-digit year of the clock's current date
pub fn current_year(clock: &dyn Clock) -> String {
    format!("{:04}", clock.today().year())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct FixedClock(NaiveDate);

    impl Clock for FixedClock {
        fn today(&self) -> NaiveDate {
            self.0
        }
    }

    #[test]
    fn test_date_to_string() {
        let date = parse_date("2024-03-05").unwrap();
        assert_eq!(date_to_string(&date), "5 Mar 2024");

        let date = parse_date("2023-12-25 18:30:00").unwrap();
        assert_eq!(date_to_string(&date), "25 Dec 2023");
    }

    #[test]
    fn test_offset_is_not_normalized() {
        // 23:30 at -05:00 is already the next day in UTC; the written date wins
        let date = parse_date("2024-03-05T23:30:00-05:00").unwrap();
        assert_eq!(date_to_string(&date), "5 Mar 2024");
    }

    #[test]
    fn test_parse_date_value() {
        assert!(parse_date_value(&json!("2024/03/05")).is_some());
        let epoch = parse_date_value(&json!(1_709_596_800)).unwrap();
        assert_eq!(date_to_string(&epoch), "5 Mar 2024");
        assert_eq!(parse_date_value(&json!("next tuesday")), None);
        assert_eq!(parse_date_value(&json!(true)), None);
    }

    #[test]
    fn test_current_year_reads_clock() {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2031, 1, 1).unwrap());
        assert_eq!(current_year(&clock), "2031");
        assert_eq!(current_year(&SystemClock).len(), 4);
    }
}
