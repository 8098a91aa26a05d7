//! Delay encoding used by the control protocol.
//!
//! On the wire a delay is `null`, a number of seconds, or a duration string
//! such as `"1h30m"` or `"250ms"`. A zero delay is always written back as `0`.

use std::fmt::Write as _;
use std::time::Duration;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::control::ControlError;

const NANOSECOND: u64 = 1;
const MICROSECOND: u64 = 1_000 * NANOSECOND;
const MILLISECOND: u64 = 1_000 * MICROSECOND;
const SECOND: u64 = 1_000 * MILLISECOND;
const MINUTE: u64 = 60 * SECOND;
const HOUR: u64 = 60 * MINUTE;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DurationError {
    #[error("time: invalid duration \"{0}\"")]
    Invalid(String),
    #[error("time: missing unit in duration \"{0}\"")]
    MissingUnit(String),
    #[error("time: unknown unit \"{unit}\" in duration \"{input}\"")]
    UnknownUnit { unit: String, input: String },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Delay(pub Duration);

impl Serialize for Delay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        encode(self.0).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Delay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        decode(&value).map(Delay).map_err(D::Error::custom)
    }
}

pub fn encode(duration: Duration) -> Value {
    if duration.is_zero() {
        Value::from(0)
    } else {
        Value::from(format_duration(duration))
    }
}

pub fn decode(value: &Value) -> Result<Duration, ControlError> {
    let duration = match value {
        Value::Null => Duration::ZERO,
        // Seconds are rounded to the microsecond before parsing.
        Value::Number(number) => match number.as_f64() {
            Some(seconds) => parse_duration(&format!("{:.6}s", seconds))?,
            None => return Err(invalid_delay(value)),
        },
        Value::String(text) => parse_duration(text)?,
        _ => return Err(invalid_delay(value)),
    };
    Ok(duration)
}

fn invalid_delay(value: &Value) -> ControlError {
    ControlError::Validation(format!("delay {} must be null, numeric, or string", value))
}

/// Parses a signed sequence of decimal numbers, each with an optional
/// fraction and a mandatory unit suffix: `"300ms"`, `"1.5h"`, `"2h45m"`.
/// A bare `"0"` is accepted without a unit. A negative duration means
/// "no delay" and comes back as zero.
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let invalid = || DurationError::Invalid(input.to_string());

    let mut rest = input;
    let mut negative = false;
    if let Some(stripped) = rest.strip_prefix('-') {
        negative = true;
        rest = stripped;
    } else if let Some(stripped) = rest.strip_prefix('+') {
        rest = stripped;
    }
    if rest == "0" {
        return Ok(Duration::ZERO);
    }
    if rest.is_empty() {
        return Err(invalid());
    }

    let mut total: u64 = 0;
    while !rest.is_empty() {
        if !rest.starts_with(|c: char| c == '.' || c.is_ascii_digit()) {
            return Err(invalid());
        }

        let (whole, after_whole) = split_digits(rest);
        let mut value: u64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
        rest = after_whole;

        let mut fraction = "";
        if let Some(after_dot) = rest.strip_prefix('.') {
            let (digits, after_fraction) = split_digits(after_dot);
            fraction = digits;
            rest = after_fraction;
        }
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }

        let unit_end = rest.find(|c: char| c == '.' || c.is_ascii_digit()).unwrap_or(rest.len());
        let (unit, after_unit) = rest.split_at(unit_end);
        rest = after_unit;
        if unit.is_empty() {
            return Err(DurationError::MissingUnit(input.to_string()));
        }
        let scale = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit {
            unit: unit.to_string(),
            input: input.to_string(),
        })?;

        value = value.checked_mul(scale).ok_or_else(invalid)?;
        value = value.checked_add(fraction_nanos(fraction, scale)).ok_or_else(invalid)?;
        total = total.checked_add(value).ok_or_else(invalid)?;
    }

    if negative {
        return Ok(Duration::ZERO);
    }
    Ok(Duration::from_nanos(total))
}

fn split_digits(text: &str) -> (&str, &str) {
    let end = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
    text.split_at(end)
}

fn unit_nanos(unit: &str) -> Option<u64> {
    match unit {
        "ns" => Some(NANOSECOND),
        // micro sign and greek mu
        "us" | "\u{00b5}s" | "\u{03bc}s" => Some(MICROSECOND),
        "ms" => Some(MILLISECOND),
        "s" => Some(SECOND),
        "m" => Some(MINUTE),
        "h" => Some(HOUR),
        _ => None,
    }
}

fn fraction_nanos(digits: &str, scale: u64) -> u64 {
    let mut numerator: u64 = 0;
    let mut denominator: u64 = 1;
    for digit in digits.bytes() {
        // Digits past u64 precision cannot change the result.
        let (Some(n), Some(d)) = (numerator.checked_mul(10), denominator.checked_mul(10)) else {
            break;
        };
        numerator = n + u64::from(digit - b'0');
        denominator = d;
    }
    (numerator as f64 * (scale as f64 / denominator as f64)) as u64
}

/// Canonical form: `"1h30m0s"`, `"1.5s"`, `"100ms"`, `"0s"`.
pub fn format_duration(duration: Duration) -> String {
    let nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }
    if nanos < u128::from(MICROSECOND) {
        return format!("{}ns", nanos);
    }
    if nanos < u128::from(MILLISECOND) {
        return format!("{}\u{00b5}s", decimal(nanos, 3));
    }
    if nanos < u128::from(SECOND) {
        return format!("{}ms", decimal(nanos, 6));
    }

    let seconds = nanos / u128::from(SECOND);
    let hours = seconds / 3600;
    let minutes = seconds / 60 % 60;
    let mut out = String::new();
    if hours > 0 {
        let _ = write!(out, "{}h", hours);
    }
    if hours > 0 || minutes > 0 {
        let _ = write!(out, "{}m", minutes);
    }
    let _ = write!(out, "{}s", decimal(nanos % u128::from(MINUTE), 9));
    out
}

fn decimal(value: u128, precision: usize) -> String {
    let scale = 10u128.pow(precision as u32);
    let (whole, fraction) = (value / scale, value % scale);
    if fraction == 0 {
        return whole.to_string();
    }
    let digits = format!("{:0width$}", fraction, width = precision);
    format!("{}.{}", whole, digits.trim_end_matches('0'))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn encodes_zero_as_number() {
        assert_eq!(encode(Duration::ZERO), json!(0));
        assert_eq!(serde_json::to_value(Delay::default()).unwrap(), json!(0));
    }

    #[test]
    fn encodes_nonzero_as_string() {
        assert_eq!(encode(Duration::from_secs(5)), json!("5s"));
        assert_eq!(encode(Duration::from_secs(5400)), json!("1h30m0s"));
        assert_eq!(encode(Duration::from_millis(100)), json!("100ms"));
        assert_eq!(encode(Duration::from_millis(1500)), json!("1.5s"));
        assert_eq!(encode(Duration::from_nanos(1500)), json!("1.5\u{00b5}s"));
        assert_eq!(encode(Duration::from_nanos(42)), json!("42ns"));
    }

    #[test]
    fn decodes_null_numbers_and_strings() {
        assert_eq!(decode(&Value::Null).unwrap(), Duration::ZERO);
        assert_eq!(decode(&json!(0)).unwrap(), Duration::ZERO);
        assert_eq!(decode(&json!(1)).unwrap(), Duration::from_secs(1));
        assert_eq!(decode(&json!(0.1)).unwrap(), Duration::from_millis(100));
        assert_eq!(decode(&json!("1s")).unwrap(), Duration::from_secs(1));
        assert_eq!(decode(&json!("1h30m")).unwrap(), Duration::from_secs(5400));
    }

    #[test]
    fn rejects_other_json_types() {
        let err = decode(&json!(true)).unwrap_err();
        assert_eq!(err.to_string(), "validation: delay true must be null, numeric, or string");
        assert!(matches!(decode(&json!([1])), Err(ControlError::Validation(_))));
        assert!(matches!(decode(&json!({"s": 1})), Err(ControlError::Validation(_))));
    }

    #[test]
    fn deserializes_missing_and_null_fields() {
        #[derive(Deserialize)]
        struct Holder {
            #[serde(default)]
            delay: Delay,
        }
        let holder: Holder = serde_json::from_value(json!({})).unwrap();
        assert_eq!(holder.delay, Delay(Duration::ZERO));
        let holder: Holder = serde_json::from_value(json!({ "delay": null })).unwrap();
        assert_eq!(holder.delay, Delay(Duration::ZERO));
        let holder: Holder = serde_json::from_value(json!({ "delay": "2m" })).unwrap();
        assert_eq!(holder.delay, Delay(Duration::from_secs(120)));
    }

    #[test]
    fn parses_composite_and_fractional_strings() {
        assert_eq!(parse_duration("0").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("+5s").unwrap(), Duration::from_secs(5));
        assert_eq!(parse_duration("1.5h").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration(".5s").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("2h45m30.5s").unwrap(), Duration::from_millis(9_930_500));
        assert_eq!(parse_duration("10us").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("10\u{00b5}s").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("10\u{03bc}s").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("7ns").unwrap(), Duration::from_nanos(7));
        assert_eq!(parse_duration("-0s").unwrap(), Duration::ZERO);
    }

    #[test]
    fn reports_malformed_strings() {
        assert_eq!(parse_duration(""), Err(DurationError::Invalid("".to_string())));
        assert_eq!(parse_duration("."), Err(DurationError::Invalid(".".to_string())));
        assert_eq!(parse_duration("s"), Err(DurationError::Invalid("s".to_string())));
        assert_eq!(parse_duration("5"), Err(DurationError::MissingUnit("5".to_string())));
        assert_eq!(
            parse_duration("5d"),
            Err(DurationError::UnknownUnit { unit: "d".to_string(), input: "5d".to_string() })
        );
        assert_eq!(parse_duration("9999999999999999999h"), Err(DurationError::Invalid("9999999999999999999h".to_string())));
        assert!(matches!(decode(&json!("soon")), Err(ControlError::Duration(_))));
    }

    #[test]
    fn negative_delays_clamp_to_zero() {
        assert_eq!(parse_duration("-1s").unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("-1h30m").unwrap(), Duration::ZERO);
        assert_eq!(decode(&json!(-1)).unwrap(), Duration::ZERO);
        assert_eq!(decode(&json!(-0.25)).unwrap(), Duration::ZERO);
        assert_eq!(parse_duration("-5"), Err(DurationError::MissingUnit("-5".to_string())));
    }

    #[test]
    fn formatted_strings_parse_back() {
        for duration in [
            Duration::from_nanos(1),
            Duration::from_micros(999),
            Duration::from_millis(1),
            Duration::from_millis(1250),
            Duration::from_secs(59),
            Duration::from_secs(3661),
        ] {
            assert_eq!(parse_duration(&format_duration(duration)).unwrap(), duration);
        }
    }
}
