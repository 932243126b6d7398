// Utility helpers for parsing and basic statistics.
//
// Meter exports are messy: this module centralizes the forgiving text to
// number/timestamp handling so the rest of the code can assume clean,
// typed values.
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use num_format::{Locale, ToFormattedString};

/// Date-time layouts tried in order after RFC 3339.
///
/// Slash dates are read month-first, as most meter vendors export them.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];

/// Parse a numeric cell.
///
/// - Trims whitespace.
/// - Returns `None` for empty cells, text, and non-finite values.
pub fn parse_f64_safe(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Energy value with the zero substitution applied.
pub fn coerce_kwh(s: Option<&str>) -> f64 {
    parse_f64_safe(s).unwrap_or(0.0)
}

/// Parse a timestamp cell permissively.
///
/// Offsets are converted to UTC; naive values are taken as-is. A bare date
/// means midnight.
pub fn parse_timestamp(s: Option<&str>) -> Option<NaiveDateTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .map(|d| d.and_time(NaiveTime::MIN))
}

pub fn average(sum: f64, count: usize) -> f64 {
    // Returns 0 for an empty group to avoid NaNs.
    if count == 0 {
        return 0.0;
    }
    sum / count as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators, e.g. `1,234,567.890`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_f64_rejects_text_and_blanks() {
        assert_eq!(parse_f64_safe(Some(" 12.5 ")), Some(12.5));
        assert_eq!(parse_f64_safe(Some("")), None);
        assert_eq!(parse_f64_safe(Some("n/a")), None);
        assert_eq!(parse_f64_safe(Some("NaN")), None);
        assert_eq!(parse_f64_safe(Some("inf")), None);
        assert_eq!(parse_f64_safe(None), None);
    }

    #[test]
    fn test_coerce_kwh_defaults_to_zero() {
        assert_eq!(coerce_kwh(Some("abc")), 0.0);
        assert_eq!(coerce_kwh(None), 0.0);
        assert_eq!(coerce_kwh(Some("3")), 3.0);
    }

    #[test]
    fn test_parse_timestamp_accepts_common_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(13, 30, 0)
            .unwrap();
        for s in [
            "2024-01-02 13:30",
            "2024-01-02 13:30:00",
            "2024-01-02T13:30:00",
            "2024-01-02T13:30:00Z",
            "2024-01-02T15:30:00+02:00",
            "2024/01/02 13:30",
            "01/02/2024 13:30",
        ] {
            assert_eq!(parse_timestamp(Some(s)), Some(expected), "{s}");
        }
    }

    #[test]
    fn test_parse_timestamp_date_only_is_midnight() {
        let ts = parse_timestamp(Some("2024-03-05")).unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-05 00:00:00");
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert_eq!(parse_timestamp(Some("yesterday")), None);
        assert_eq!(parse_timestamp(Some("2024-13-40")), None);
        assert_eq!(parse_timestamp(Some("  ")), None);
    }

    #[test]
    fn test_average_of_empty_group_is_zero() {
        assert_eq!(average(0.0, 0), 0.0);
        assert_eq!(average(30.0, 2), 15.0);
    }

    #[test]
    fn test_format_number_groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.0, 1), "-42.0");
        assert_eq!(format_number(5.0, 0), "5");
        assert_eq!(format_int(9855usize), "9,855");
    }
}
