use chrono::format::{self, Parsed, StrftimeItems};
use chrono::{DateTime, NaiveTime, TimeDelta, TimeZone};
use std::fmt;
use std::fmt::Formatter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeadlineError {
    UnknownTimeFormat(String),
    InvalidDuration(String),
    NonPositiveDuration(String),
}

impl fmt::Display for DeadlineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeadlineError::UnknownTimeFormat(input) => {
                write!(f, "unknown time format: {:?}", input)
            }
            DeadlineError::InvalidDuration(input) => write!(f, "invalid duration {:?}", input),
            DeadlineError::NonPositiveDuration(input) => write!(f, "{}: bad duration", input),
        }
    }
}

impl std::error::Error for DeadlineError {}

/// A time-of-day layout. Layouts without a minute field mean "on the hour".
struct TimeLayout {
    format: &'static str,
    has_minutes: bool,
}

impl TimeLayout {
    fn parse(&self, s: &str) -> Option<NaiveTime> {
        let mut parsed = Parsed::new();
        format::parse(&mut parsed, s, StrftimeItems::new(self.format)).ok()?;
        if !self.has_minutes {
            parsed.set_minute(0).ok()?;
        }
        parsed.to_naive_time().ok()
    }
}

// Order matters, first match wins.
const LAYOUTS: [TimeLayout; 3] = [
    TimeLayout {
        format: "%H:%M",
        has_minutes: true,
    },
    TimeLayout {
        format: "%I%p",
        has_minutes: false,
    },
    TimeLayout {
        format: "%I:%M%p",
        has_minutes: true,
    },
];

/// Parse a wall clock time ("13:37", "4pm", "2:45PM") and place it on the
/// same calendar day as `now`.
pub fn parse_time_of_day<Tz: TimeZone>(
    input: &str,
    now: &DateTime<Tz>,
) -> Result<DateTime<Tz>, DeadlineError> {
    let upper = input.trim().to_uppercase();
    let unknown = || DeadlineError::UnknownTimeFormat(input.to_string());

    let time = LAYOUTS
        .iter()
        .find_map(|layout| layout.parse(&upper))
        .ok_or_else(unknown)?;

    now.date_naive()
        .and_time(time)
        .and_local_timezone(now.timezone())
        .earliest()
        .ok_or_else(unknown)
}

fn unit_nanos(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1.0),
        "us" | "µs" | "μs" => Some(1e3),
        "ms" => Some(1e6),
        "s" => Some(1e9),
        "m" => Some(60e9),
        "h" => Some(3600e9),
        _ => None,
    }
}

/// Parse a duration expression such as "15m", "1h30m", "1.5h" or "90s".
///
/// A sequence of decimal numbers, each followed by a unit, optionally signed.
/// A lone "0" needs no unit.
pub fn parse_duration(input: &str) -> Result<TimeDelta, DeadlineError> {
    let invalid = || DeadlineError::InvalidDuration(input.to_string());

    // units are case-sensitive: "10M" is not ten minutes
    let mut s = input.trim();
    let negative = s.starts_with('-');
    if let Some(rest) = s.strip_prefix('-').or_else(|| s.strip_prefix('+')) {
        s = rest;
    }

    if s == "0" {
        return Ok(TimeDelta::zero());
    }
    if s.is_empty() {
        return Err(invalid());
    }

    let mut total_nanos = 0.0_f64;
    while !s.is_empty() {
        let number_end = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let value: f64 = s[..number_end].parse().map_err(|_| invalid())?;
        s = &s[number_end..];

        let unit_end = s
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(s.len());
        let scale = unit_nanos(&s[..unit_end]).ok_or_else(invalid)?;
        s = &s[unit_end..];

        total_nanos += value * scale;
    }

    if !total_nanos.is_finite() || total_nanos >= i64::MAX as f64 {
        return Err(invalid());
    }

    let nanos = total_nanos.round() as i64;
    Ok(TimeDelta::nanoseconds(if negative { -nanos } else { nanos }))
}

/// Resolve a duration expression into an end time relative to `now`.
pub fn parse_relative<Tz: TimeZone>(
    input: &str,
    now: &DateTime<Tz>,
) -> Result<DateTime<Tz>, DeadlineError> {
    let duration = parse_duration(input)?;
    if duration <= TimeDelta::zero() {
        return Err(DeadlineError::NonPositiveDuration(input.to_string()));
    }

    now.clone()
        .checked_add_signed(duration)
        .ok_or_else(|| DeadlineError::InvalidDuration(input.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Local, Timelike, Utc};

    #[test]
    fn test_parse_time_of_day_layouts() {
        let cases = [
            ("2:45PM", 14, 45),
            ("2:45pm", 14, 45),
            ("13:37", 13, 37),
            ("4pm", 16, 0),
            ("12am", 0, 0),
            ("09:05", 9, 5),
        ];

        let now = Local::now();
        for (input, hour, minute) in cases {
            let t = parse_time_of_day(input, &now).unwrap();
            assert_eq!(t.hour(), hour, "{}", input);
            assert_eq!(t.minute(), minute, "{}", input);
            assert_eq!(t.second(), 0, "{}", input);
            assert_eq!(t.year(), now.year());
            assert_eq!(t.month(), now.month());
            assert_eq!(t.day(), now.day());
        }
    }

    #[test]
    fn test_parse_time_of_day_keeps_reference_date() {
        let now = Utc.with_ymd_and_hms(2024, 2, 29, 8, 15, 0).unwrap();
        let t = parse_time_of_day("9:30am", &now).unwrap();
        assert_eq!(t, Utc.with_ymd_and_hms(2024, 2, 29, 9, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_time_of_day_rejects_unknown() {
        let now = Local::now();
        for input in ["6", "", "25:00", "13pm", "noon"] {
            assert_eq!(
                parse_time_of_day(input, &now),
                Err(DeadlineError::UnknownTimeFormat(input.to_string())),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_parse_duration_units() {
        assert_eq!(parse_duration("15m").unwrap(), TimeDelta::minutes(15));
        assert_eq!(parse_duration("1h30m").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_duration("1.5h").unwrap(), TimeDelta::minutes(90));
        assert_eq!(parse_duration("90s").unwrap(), TimeDelta::seconds(90));
        assert_eq!(parse_duration("250ms").unwrap(), TimeDelta::milliseconds(250));
        assert_eq!(parse_duration("2h45m30s").unwrap(), TimeDelta::seconds(9930));
    }

    #[test]
    fn test_parse_duration_units_are_case_sensitive() {
        for input in ["10M", "1H", "30S", "5Ms", "2h15M"] {
            assert_eq!(
                parse_duration(input),
                Err(DeadlineError::InvalidDuration(input.to_string())),
                "{}",
                input
            );
        }
        assert_eq!(parse_duration(" 10m ").unwrap(), TimeDelta::minutes(10));
    }

    #[test]
    fn test_parse_duration_signs_and_zero() {
        assert_eq!(parse_duration("0").unwrap(), TimeDelta::zero());
        assert_eq!(parse_duration("-5m").unwrap(), TimeDelta::minutes(-5));
        assert_eq!(parse_duration("+5m").unwrap(), TimeDelta::minutes(5));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        for input in ["", "15", "m", "15x", "1..5m", "-", "h1"] {
            assert_eq!(
                parse_duration(input),
                Err(DeadlineError::InvalidDuration(input.to_string())),
                "{}",
                input
            );
        }
    }

    #[test]
    fn test_parse_relative() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 23, 50, 0).unwrap();
        let end = parse_relative("15m", &now).unwrap();
        assert_eq!(end, Utc.with_ymd_and_hms(2024, 1, 2, 0, 5, 0).unwrap());
    }

    #[test]
    fn test_parse_relative_rejects_non_positive() {
        let now = Utc::now();
        assert_eq!(
            parse_relative("0s", &now),
            Err(DeadlineError::NonPositiveDuration("0s".to_string()))
        );
        assert_eq!(
            parse_relative("-1m", &now),
            Err(DeadlineError::NonPositiveDuration("-1m".to_string()))
        );
    }
}
