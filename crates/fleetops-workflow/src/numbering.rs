//! Occurrence and ticket number generation
//!
//! Numbers are derived from the creation instant rendered in the
//! operator's local offset (UTC-3): two-digit year, month, day, and the
//! millisecond fraction. Collisions across a fleet of monitors are the
//! backend's problem; the number is a human handle, not a key.

use chrono::{DateTime, Duration, Utc};

const LOCAL_OFFSET_HOURS: i64 = 3;

/// Derive a record number from the creation instant.
pub fn record_number(created_at: DateTime<Utc>) -> String {
    let local = created_at - Duration::hours(LOCAL_OFFSET_HOURS);
    format!(
        "{}{:03}",
        local.format("%y%m%d"),
        local.timestamp_subsec_millis()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_number_shape() {
        let instant = Utc.with_ymd_and_hms(2024, 6, 7, 22, 15, 30).unwrap()
            + Duration::milliseconds(42);
        let number = record_number(instant);
        assert_eq!(number, "240607042");
        assert!(number.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_offset_rolls_the_date_back() {
        // 01:00 UTC is still the previous day at UTC-3.
        let instant = Utc.with_ymd_and_hms(2024, 6, 8, 1, 0, 0).unwrap();
        assert!(record_number(instant).starts_with("240607"));
    }
}
