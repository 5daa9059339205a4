//! Time-of-day parsing for daily reminders
//!
//! Accepts the strings people and platform time pickers produce:
//! "8:30 PM", "8pm", "12:00 AM", "17:30". AM/PM handling follows the
//! usual 12-hour clock rules. Anything that does not fit is an error
//! rather than a guessed time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from [`parse_time_of_day`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseTimeError {
    #[error("time string is empty")]
    Empty,

    #[error("no hour digits in '{0}'")]
    MissingHour(String),

    #[error("invalid minutes in '{0}'")]
    InvalidMinute(String),

    #[error("hour {hour} is out of range in '{input}'")]
    HourOutOfRange { hour: u32, input: String },

    #[error("minute {minute} is out of range in '{input}'")]
    MinuteOutOfRange { minute: u32, input: String },
}

/// A 24-hour wall-clock time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = ParseTimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time_of_day(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Meridiem {
    Am,
    Pm,
}

fn is_short_number(s: &str) -> bool {
    !s.is_empty() && s.len() <= 2 && s.chars().all(|c| c.is_ascii_digit())
}

/// Parse a free-form time string into a 24-hour time.
pub fn parse_time_of_day(input: &str) -> Result<TimeOfDay, ParseTimeError> {
    let lower = input.trim().to_lowercase();
    if lower.is_empty() {
        return Err(ParseTimeError::Empty);
    }

    let (body, meridiem) = if let Some(rest) = lower.strip_suffix("pm") {
        (rest, Some(Meridiem::Pm))
    } else if let Some(rest) = lower.strip_suffix("am") {
        (rest, Some(Meridiem::Am))
    } else {
        (lower.as_str(), None)
    };
    let body = body.trim_end();

    let (hour_part, minute_part) = match body.split_once(':') {
        Some((h, m)) => (h.trim(), Some(m)),
        None => (body, None),
    };

    if !is_short_number(hour_part) {
        return Err(ParseTimeError::MissingHour(input.to_string()));
    }
    let mut hour: u32 = hour_part
        .parse()
        .map_err(|_| ParseTimeError::MissingHour(input.to_string()))?;

    let minute: u32 = match minute_part {
        None => 0,
        Some(m) if is_short_number(m) => m
            .parse()
            .map_err(|_| ParseTimeError::InvalidMinute(input.to_string()))?,
        Some(_) => return Err(ParseTimeError::InvalidMinute(input.to_string())),
    };

    let hour_in_range = match meridiem {
        Some(_) => (1..=12).contains(&hour),
        None => hour <= 23,
    };
    if !hour_in_range {
        return Err(ParseTimeError::HourOutOfRange {
            hour,
            input: input.to_string(),
        });
    }
    if minute > 59 {
        return Err(ParseTimeError::MinuteOutOfRange {
            minute,
            input: input.to_string(),
        });
    }

    match meridiem {
        Some(Meridiem::Pm) if hour < 12 => hour += 12,
        Some(Meridiem::Am) if hour == 12 => hour = 0,
        _ => {}
    }

    Ok(TimeOfDay { hour, minute })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(s: &str) -> (u32, u32) {
        let t = parse_time_of_day(s).unwrap();
        (t.hour, t.minute)
    }

    #[test]
    fn test_pm_adds_twelve() {
        assert_eq!(parsed("8:30 PM"), (20, 30));
        assert_eq!(parsed("8:30pm"), (20, 30));
    }

    #[test]
    fn test_midnight_and_noon() {
        assert_eq!(parsed("12:00 AM"), (0, 0));
        assert_eq!(parsed("12:15 PM"), (12, 15));
    }

    #[test]
    fn test_twenty_four_hour_input() {
        assert_eq!(parsed("17:30"), (17, 30));
        assert_eq!(parsed("08:05"), (8, 5));
        assert_eq!(parsed("0:00"), (0, 0));
    }

    #[test]
    fn test_minute_defaults_to_zero() {
        assert_eq!(parsed("8 AM"), (8, 0));
        assert_eq!(parsed("7pm"), (19, 0));
        assert_eq!(parsed("6"), (6, 0));
    }

    #[test]
    fn test_platform_whitespace_before_meridiem() {
        // Narrow no-break space, as produced by some locale formatters
        assert_eq!(parsed("9:45\u{202F}AM"), (9, 45));
        assert_eq!(parsed("  9:45 am  "), (9, 45));
    }

    #[test]
    fn test_rejects_malformed_input() {
        assert_eq!(parse_time_of_day(""), Err(ParseTimeError::Empty));
        assert_eq!(parse_time_of_day("   "), Err(ParseTimeError::Empty));
        assert!(matches!(
            parse_time_of_day("abc"),
            Err(ParseTimeError::MissingHour(_))
        ));
        assert!(matches!(
            parse_time_of_day(":30 PM"),
            Err(ParseTimeError::MissingHour(_))
        ));
        assert!(matches!(
            parse_time_of_day("8:xx"),
            Err(ParseTimeError::InvalidMinute(_))
        ));
        assert!(matches!(
            parse_time_of_day("8:30 tonight"),
            Err(ParseTimeError::InvalidMinute(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_values() {
        assert!(matches!(
            parse_time_of_day("25:00"),
            Err(ParseTimeError::HourOutOfRange { hour: 25, .. })
        ));
        assert!(matches!(
            parse_time_of_day("13:00 PM"),
            Err(ParseTimeError::HourOutOfRange { hour: 13, .. })
        ));
        assert!(matches!(
            parse_time_of_day("0:30 AM"),
            Err(ParseTimeError::HourOutOfRange { hour: 0, .. })
        ));
        assert!(matches!(
            parse_time_of_day("8:75"),
            Err(ParseTimeError::MinuteOutOfRange { minute: 75, .. })
        ));
    }

    #[test]
    fn test_display_is_zero_padded() {
        let t: TimeOfDay = "7:05 PM".parse().unwrap();
        assert_eq!(t.to_string(), "19:05");
    }
}
