// Wire format for timestamps: `YYYY-MM-DDThh:mm:ss.ffffffZ`, always UTC.

use chrono::{DateTime, NaiveDateTime, Utc};

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Format an instant in the canonical wire profile (microsecond precision).
pub fn format_api_time(dt: &DateTime<Utc>) -> String {
    dt.format(WIRE_FORMAT).to_string()
}

/// Parse a wire timestamp.
///
/// Accepts the canonical profile, the same without fractional seconds,
/// and, as a fallback, any RFC 3339 timestamp with an explicit offset.
pub fn parse_api_time(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    for format in ["%Y-%m-%dT%H:%M:%S%.fZ", "%Y-%m-%dT%H:%M:%SZ"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn parses_canonical_profile() {
        let dt = parse_api_time("2014-03-26T21:02:01.123456Z");
        let expected = Utc
            .with_ymd_and_hms(2014, 3, 26, 21, 2, 1)
            .single()
            .map(|d| d.with_nanosecond(123_456_000));
        assert_eq!(dt, expected.flatten());
    }

    #[test]
    fn parses_without_microseconds() {
        let dt = parse_api_time("2014-03-26T21:02:01Z");
        assert_eq!(dt, Utc.with_ymd_and_hms(2014, 3, 26, 21, 2, 1).single());
    }

    #[test]
    fn parses_offset_timestamps_as_utc() {
        let dt = parse_api_time("2014-03-26T23:02:01+02:00");
        assert_eq!(dt, Utc.with_ymd_and_hms(2014, 3, 26, 21, 2, 1).single());
    }

    #[test]
    fn formats_with_six_fraction_digits() {
        let dt = Utc.with_ymd_and_hms(2020, 1, 2, 3, 4, 5).single();
        assert_eq!(
            dt.map(|d| format_api_time(&d)).as_deref(),
            Some("2020-01-02T03:04:05.000000Z")
        );
    }

    #[test]
    fn canonical_round_trip() {
        let raw = "2019-11-30T08:15:59.000321Z";
        assert_eq!(parse_api_time(raw).map(|d| format_api_time(&d)).as_deref(), Some(raw));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_api_time("yesterday"), None);
    }
}
