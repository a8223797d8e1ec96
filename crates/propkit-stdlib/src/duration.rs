//! Human-readable durations
//!
//! `"1h 30m"`, `"2d"`, `"250ms"`, `"1500"` (a bare integer is milliseconds).

use std::time::Duration;
use thiserror::Error;

/// Duration parsing errors
#[derive(Debug, Error, PartialEq)]
pub enum DurationError {
    /// Input was empty or whitespace
    #[error("empty duration")]
    Empty,

    /// A unit appeared without a number in front of it
    #[error("expected a number at offset {offset} in '{input}'")]
    MissingNumber {
        /// Full input
        input: String,
        /// Byte offset of the offending part
        offset: usize,
    },

    /// A number was not followed by a unit in a multi-part duration
    #[error("missing unit after {value} in '{input}'")]
    MissingUnit {
        /// Full input
        input: String,
        /// Number without a unit
        value: u64,
    },

    /// Unit not recognised
    #[error("unknown duration unit '{0}'")]
    UnknownUnit(String),

    /// The total does not fit
    #[error("duration '{0}' is too large")]
    Overflow(String),
}

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;
const NANOS_PER_MINUTE: u64 = 60 * NANOS_PER_SECOND;
const NANOS_PER_HOUR: u64 = 60 * NANOS_PER_MINUTE;
const NANOS_PER_DAY: u64 = 24 * NANOS_PER_HOUR;
const NANOS_PER_WEEK: u64 = 7 * NANOS_PER_DAY;

fn unit_nanos(unit: &str) -> Option<u64> {
    Some(match unit.to_ascii_lowercase().as_str() {
        "ns" | "nanos" | "nanosecond" | "nanoseconds" => 1,
        "us" | "µs" | "micros" | "microsecond" | "microseconds" => NANOS_PER_MICRO,
        "ms" | "millis" | "millisecond" | "milliseconds" => NANOS_PER_MILLI,
        "s" | "sec" | "secs" | "second" | "seconds" => NANOS_PER_SECOND,
        "m" | "min" | "mins" | "minute" | "minutes" => NANOS_PER_MINUTE,
        "h" | "hr" | "hrs" | "hour" | "hours" => NANOS_PER_HOUR,
        "d" | "day" | "days" => NANOS_PER_DAY,
        "w" | "week" | "weeks" => NANOS_PER_WEEK,
        _ => return None,
    })
}

/// Parse a sequence of `<integer><unit>` parts
pub fn parse_duration(input: &str) -> Result<Duration, DurationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DurationError::Empty);
    }
    if let Ok(millis) = trimmed.parse::<u64>() {
        return Ok(Duration::from_millis(millis));
    }

    let overflow = || DurationError::Overflow(input.to_string());
    let mut total = Duration::ZERO;
    let mut rest = trimmed;
    while !rest.is_empty() {
        let offset = input.len() - rest.len();
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 {
            return Err(DurationError::MissingNumber {
                input: input.to_string(),
                offset,
            });
        }
        let value: u64 = rest[..digits].parse().map_err(|_| overflow())?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| !(c.is_alphabetic() || c == 'µ'))
            .unwrap_or(rest.len());
        if unit_len == 0 {
            return Err(DurationError::MissingUnit {
                input: input.to_string(),
                value,
            });
        }
        let unit = &rest[..unit_len];
        rest = rest[unit_len..].trim_start();

        let nanos = unit_nanos(unit).ok_or_else(|| DurationError::UnknownUnit(unit.to_string()))?;
        let part = value.checked_mul(nanos).ok_or_else(overflow)?;
        total = total
            .checked_add(Duration::from_nanos(part))
            .ok_or_else(overflow)?;
    }
    Ok(total)
}

/// Compact form, largest unit first (`1d2h`, `1h30m`, `250ms`, `0s`)
pub fn format_duration(duration: Duration) -> String {
    let mut nanos = duration.as_nanos();
    if nanos == 0 {
        return "0s".to_string();
    }

    let mut out = String::new();
    for (unit, size) in [
        ("d", NANOS_PER_DAY),
        ("h", NANOS_PER_HOUR),
        ("m", NANOS_PER_MINUTE),
        ("s", NANOS_PER_SECOND),
        ("ms", NANOS_PER_MILLI),
        ("us", NANOS_PER_MICRO),
        ("ns", 1),
    ] {
        let size = u128::from(size);
        let count = nanos / size;
        if count > 0 {
            out.push_str(&format!("{}{}", count, unit));
            nanos %= size;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_parts() {
        assert_eq!(parse_duration("1h 30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("1h30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration("2d").unwrap(), Duration::from_secs(172_800));
        assert_eq!(parse_duration("1w").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("10µs").unwrap(), Duration::from_micros(10));
        assert_eq!(parse_duration("7ns").unwrap(), Duration::from_nanos(7));
        assert_eq!(
            parse_duration("3 minutes 4 seconds").unwrap(),
            Duration::from_secs(184)
        );
        assert_eq!(parse_duration("5S").unwrap(), Duration::from_secs(5));
    }

    #[test]
    fn test_bare_integer_is_millis() {
        assert_eq!(parse_duration("1500").unwrap(), Duration::from_millis(1500));
        assert_eq!(parse_duration(" 0 ").unwrap(), Duration::ZERO);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(parse_duration(""), Err(DurationError::Empty));
        assert_eq!(parse_duration("   "), Err(DurationError::Empty));
        assert_eq!(
            parse_duration("5 fortnights"),
            Err(DurationError::UnknownUnit("fortnights".to_string()))
        );
        assert!(matches!(
            parse_duration("h5"),
            Err(DurationError::MissingNumber { offset: 0, .. })
        ));
        assert!(matches!(
            parse_duration("1h 30"),
            Err(DurationError::MissingUnit { value: 30, .. })
        ));
        assert!(matches!(
            parse_duration("-5s"),
            Err(DurationError::MissingNumber { .. })
        ));
        assert!(matches!(
            parse_duration("99999999999999999999w"),
            Err(DurationError::Overflow(_))
        ));
        assert!(matches!(
            parse_duration("100000000w"),
            Err(DurationError::Overflow(_))
        ));
    }

    #[test]
    fn test_format() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_secs(5400)), "1h30m");
        assert_eq!(format_duration(Duration::from_millis(250)), "250ms");
        assert_eq!(format_duration(Duration::from_secs(93_600)), "1d2h");
        assert_eq!(format_duration(Duration::from_nanos(1_000_001)), "1ms1ns");
    }

    #[test]
    fn test_format_parses_back() {
        for d in [
            Duration::from_secs(3661),
            Duration::from_millis(90_061_001),
            Duration::new(12, 345_678_901),
        ] {
            assert_eq!(parse_duration(&format_duration(d)).unwrap(), d);
        }
    }
}
