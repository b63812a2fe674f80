use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::Value;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
];

/// Coerces an arbitrary JSON scalar into a severity-like number.
///
/// Numbers pass through, strings are parsed after trimming, booleans map to
/// 1.0/0.0. Anything else, including NaN and infinities, becomes 0.0. This
/// never fails: invalid input is a value, not an error.
pub fn parse_numeric_or_zero(value: &Value) -> f64 {
    match value {
        Value::Number(number) => finite_or_zero(number.as_f64().unwrap_or(0.0)),
        Value::String(text) => parse_str_or_zero(text),
        Value::Bool(flag) => {
            if *flag {
                1.0
            } else {
                0.0
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => 0.0,
    }
}

pub fn parse_str_or_zero(text: &str) -> f64 {
    text.trim().parse::<f64>().map(finite_or_zero).unwrap_or(0.0)
}

pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Parses RFC 3339 or a naive `YYYY-MM-DD HH:MM:SS[.f]` timestamp (read as UTC).
pub fn parse_instant(text: &str) -> Option<DateTime<Utc>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn numeric_values_pass_through() {
        assert_eq!(parse_numeric_or_zero(&json!(2.5)), 2.5);
        assert_eq!(parse_numeric_or_zero(&json!(-3)), -3.0);
    }

    #[test]
    fn strings_are_parsed_or_zeroed() {
        assert_eq!(parse_numeric_or_zero(&json!(" 4.25 ")), 4.25);
        assert_eq!(parse_numeric_or_zero(&json!("abc")), 0.0);
        assert_eq!(parse_numeric_or_zero(&json!("NaN")), 0.0);
        assert_eq!(parse_numeric_or_zero(&json!("inf")), 0.0);
    }

    #[test]
    fn non_scalars_become_zero() {
        assert_eq!(parse_numeric_or_zero(&Value::Null), 0.0);
        assert_eq!(parse_numeric_or_zero(&json!([1, 2])), 0.0);
        assert_eq!(parse_numeric_or_zero(&json!({"a": 1})), 0.0);
        assert_eq!(parse_numeric_or_zero(&json!(true)), 1.0);
    }

    #[test]
    fn parse_instant_accepts_rfc3339_and_naive() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 1, 0, 1, 0).unwrap();
        assert_eq!(parse_instant("2025-01-01T00:01:00Z"), Some(expected));
        assert_eq!(parse_instant("2025-01-01T01:01:00+01:00"), Some(expected));
        assert_eq!(parse_instant("2025-01-01 00:01:00"), Some(expected));
        assert_eq!(parse_instant("2025-01-01T00:01:00"), Some(expected));
        assert_eq!(parse_instant("not a time"), None);
        assert_eq!(parse_instant(""), None);
    }
}
