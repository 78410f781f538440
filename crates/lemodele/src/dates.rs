// Date parsing and calendar-day arithmetic
//
// All timestamps are naive UTC. Offsets found in input are folded into UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

const MICROS_PER_DAY: i64 = 86_400_000_000;

/// Naive date-time layouts accepted after RFC 3339 has been tried.
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Current time as naive UTC.
pub fn utc_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Parse an ISO-8601 date or date-time.
///
/// Returns `None` for empty or unparseable input; callers treat that as an
/// absent date.
pub fn parse_iso(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f%:z") {
        return Some(dt.naive_utc());
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parse an optional ISO-8601 value, treating failures as absent.
pub fn parse_opt(value: Option<&str>) -> Option<NaiveDateTime> {
    value.and_then(parse_iso)
}

/// Whole calendar days in `delta`, rounded towards negative infinity.
///
/// 5.5 days is 5; minus three hours is -1.
pub fn whole_days(delta: Duration) -> i64 {
    let micros = delta
        .num_microseconds()
        .unwrap_or_else(|| delta.num_milliseconds().saturating_mul(1_000));
    micros.div_euclid(MICROS_PER_DAY)
}

/// Whole days from `from` until `to` (negative when `to` is earlier).
pub fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    whole_days(to - from)
}

/// `YYYY-MM-DD`
pub fn format_day(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DD HH:MM:SS`
pub fn format_timestamp(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// ISO-8601 without offset; fractional seconds only when present.
pub fn to_iso(dt: NaiveDateTime) -> String {
    dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[rstest]
    #[case("2025-03-01", at(2025, 3, 1, 0, 0, 0))]
    #[case("2025-03-01T09:30:00", at(2025, 3, 1, 9, 30, 0))]
    #[case("2025-03-01T09:30", at(2025, 3, 1, 9, 30, 0))]
    #[case("2025-03-01 09:30:15", at(2025, 3, 1, 9, 30, 15))]
    #[case("2025-03-01T09:30:00Z", at(2025, 3, 1, 9, 30, 0))]
    #[case("2025-03-01T11:30:00+02:00", at(2025, 3, 1, 9, 30, 0))]
    fn test_parse_iso_accepts(#[case] input: &str, #[case] expected: NaiveDateTime) {
        assert_eq!(parse_iso(input), Some(expected));
    }

    #[test]
    fn test_parse_iso_fractional_seconds() {
        let parsed = parse_iso("2025-03-01T09:30:00.250000").unwrap();
        assert_eq!(parsed.and_utc().timestamp_subsec_millis(), 250);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("next tuesday")]
    #[case("2025-13-01")]
    #[case("01/03/2025")]
    fn test_parse_iso_rejects(#[case] input: &str) {
        assert_eq!(parse_iso(input), None);
    }

    #[test]
    fn test_whole_days_floors() {
        assert_eq!(whole_days(Duration::hours(132)), 5);
        assert_eq!(whole_days(Duration::hours(-3)), -1);
        assert_eq!(whole_days(Duration::zero()), 0);
        assert_eq!(whole_days(Duration::days(-5)), -5);
        assert_eq!(whole_days(Duration::milliseconds(-1)), -1);
    }

    #[test]
    fn test_days_between() {
        let now = at(2025, 1, 10, 12, 0, 0);
        assert_eq!(days_between(now, at(2025, 1, 20, 12, 0, 0)), 10);
        assert_eq!(days_between(now, at(2025, 1, 5, 12, 0, 0)), -5);
    }

    #[test]
    fn test_formatting() {
        let dt = at(2025, 7, 4, 8, 5, 9);
        assert_eq!(format_day(dt), "2025-07-04");
        assert_eq!(format_timestamp(dt), "2025-07-04 08:05:09");
        assert_eq!(to_iso(dt), "2025-07-04T08:05:09");
        assert_eq!(parse_iso(&to_iso(dt)), Some(dt));
    }
}
