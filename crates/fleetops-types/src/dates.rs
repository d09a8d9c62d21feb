//! The fixed form date-time representation
//!
//! Forms exchange date-times as `DD/MM/YYYY HH:MM:SS` strings (dates alone
//! as `DD/MM/YYYY`); the backend speaks RFC 3339. Everything that parses or
//! compares those strings goes through here.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Full date-time form representation.
pub const DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Date-only form representation.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Parse a form value in either representation. Date-only values resolve
/// to midnight.
pub fn parse_form_date(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// True when both values parse and `earlier` does not come after `later`.
/// Unparseable values are handled by the `ValidDateTime` field rule, not
/// here.
pub fn not_after(earlier: &str, later: &str) -> bool {
    match (parse_form_date(earlier), parse_form_date(later)) {
        (Some(a), Some(b)) => a <= b,
        _ => true,
    }
}

/// Render a backend RFC 3339 timestamp in the form representation.
pub fn to_form_date_time(value: &chrono::DateTime<chrono::Utc>) -> String {
    value.format(DATE_TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_both_representations() {
        assert!(parse_form_date("25/12/2024 08:30:00").is_some());
        assert!(parse_form_date("25/12/2024").is_some());
        assert!(parse_form_date("2024-12-25").is_none());
        assert!(parse_form_date("").is_none());
    }

    #[test]
    fn test_date_only_is_midnight() {
        let parsed = parse_form_date("01/02/2024").unwrap();
        assert_eq!(parsed.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn test_not_after_ordering() {
        assert!(not_after("01/03/2024", "02/03/2024"));
        assert!(not_after("02/03/2024 10:00:00", "02/03/2024 10:00:00"));
        assert!(!not_after("03/03/2024", "02/03/2024"));
        // Unparseable operands are some other rule's problem.
        assert!(not_after("garbage", "02/03/2024"));
    }
}
