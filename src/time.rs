use chrono::{Local, NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of minutes in a day; every `TimeOfDay` is strictly below this.
pub const MINUTES_PER_DAY: u16 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeParseError {
    #[error("Time must be in HH:MM format, got '{0}'")]
    Format(String),
    #[error("Hour out of range (0-23): {0}")]
    Hour(u16),
    #[error("Minute out of range (0-59): {0}")]
    Minute(u16),
}

/// A wall-clock time of day with minute precision (24-hour, no seconds).
///
/// Stored as minutes since midnight, so ordering and comparisons are numeric.
/// Serialized as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub fn new(hour: u16, minute: u16) -> Result<Self, TimeParseError> {
        if hour >= 24 {
            return Err(TimeParseError::Hour(hour));
        }
        if minute >= 60 {
            return Err(TimeParseError::Minute(minute));
        }
        Ok(Self(hour * 60 + minute))
    }

    /// Build from minutes since midnight, `None` if outside `[0, 1440)`
    pub fn from_minutes(minutes: u16) -> Option<Self> {
        (minutes < MINUTES_PER_DAY).then_some(Self(minutes))
    }

    pub fn hour(self) -> u16 {
        self.0 / 60
    }

    pub fn minute(self) -> u16 {
        self.0 % 60
    }

    pub fn minutes(self) -> u16 {
        self.0
    }
}

impl FromStr for TimeOfDay {
    type Err = TimeParseError;

    /// Accepts `H:MM` or `HH:MM`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (h, m) = trimmed
            .split_once(':')
            .ok_or_else(|| TimeParseError::Format(trimmed.to_string()))?;

        let digits_only = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
        if !digits_only(h) || h.len() > 2 || !digits_only(m) || m.len() != 2 {
            return Err(TimeParseError::Format(trimmed.to_string()));
        }

        let hour: u16 = h.parse().map_err(|_| TimeParseError::Format(trimmed.to_string()))?;
        let minute: u16 = m.parse().map_err(|_| TimeParseError::Format(trimmed.to_string()))?;
        Self::new(hour, minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

/// Minutes since midnight for a time of day
pub fn to_minutes(time: TimeOfDay) -> u16 {
    time.minutes()
}

/// Minutes since midnight of a clock reading, seconds are dropped
pub fn minutes_of(time: NaiveTime) -> u16 {
    (time.hour() * 60 + time.minute()) as u16
}

/// Minutes since local midnight for the current instant
pub fn now_minutes() -> u16 {
    minutes_of(Local::now().time())
}

/// Render a minute count as `"{h}h {m}m"`, or `"{m}m"` when under an hour
pub fn format_duration(minutes: u32) -> String {
    let h = minutes / 60;
    let m = minutes % 60;
    if h > 0 {
        format!("{}h {}m", h, m)
    } else {
        format!("{}m", m)
    }
}

/// 12-hour rendering with AM/PM, e.g. `13:05` -> `1:05 PM`, `00:30` -> `12:30 AM`
pub fn format_clock_display(time: TimeOfDay) -> String {
    let hours = time.hour();
    let ampm = if hours >= 12 { "PM" } else { "AM" };
    let h = match hours % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", h, time.minute(), ampm)
}

/// Today's local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Format a date as `YYYY-MM-DD`
pub fn date_string(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Parse a `YYYY-MM-DD` date string
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        s.parse().unwrap()
    }

    #[test]
    fn parses_valid_times() {
        assert_eq!(to_minutes(t("00:00")), 0);
        assert_eq!(to_minutes(t("09:30")), 570);
        assert_eq!(to_minutes(t("9:30")), 570);
        assert_eq!(to_minutes(t("23:59")), 1439);
    }

    #[test]
    fn rejects_malformed_times() {
        assert!(matches!("24:00".parse::<TimeOfDay>(), Err(TimeParseError::Hour(24))));
        assert!(matches!("10:60".parse::<TimeOfDay>(), Err(TimeParseError::Minute(60))));
        assert!("".parse::<TimeOfDay>().is_err());
        assert!("1030".parse::<TimeOfDay>().is_err());
        assert!("10:3".parse::<TimeOfDay>().is_err());
        assert!("-1:30".parse::<TimeOfDay>().is_err());
        assert!("ab:cd".parse::<TimeOfDay>().is_err());
    }

    #[test]
    fn displays_zero_padded() {
        assert_eq!(t("7:05").to_string(), "07:05");
    }

    #[test]
    fn serializes_as_hh_mm_string() {
        let json = serde_json::to_string(&t("14:45")).unwrap();
        assert_eq!(json, "\"14:45\"");
        let back: TimeOfDay = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t("14:45"));
        assert!(serde_json::from_str::<TimeOfDay>("\"25:00\"").is_err());
    }

    #[test]
    fn from_minutes_bounds() {
        assert_eq!(TimeOfDay::from_minutes(0), Some(t("00:00")));
        assert_eq!(TimeOfDay::from_minutes(1439), Some(t("23:59")));
        assert_eq!(TimeOfDay::from_minutes(1440), None);
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(45), "45m");
        assert_eq!(format_duration(65), "1h 5m");
        assert_eq!(format_duration(90), "1h 30m");
        assert_eq!(format_duration(120), "2h 0m");
    }

    #[test]
    fn formats_clock_display() {
        assert_eq!(format_clock_display(t("00:05")), "12:05 AM");
        assert_eq!(format_clock_display(t("09:00")), "9:00 AM");
        assert_eq!(format_clock_display(t("12:00")), "12:00 PM");
        assert_eq!(format_clock_display(t("13:30")), "1:30 PM");
        assert_eq!(format_clock_display(t("23:59")), "11:59 PM");
    }

    #[test]
    fn minutes_of_drops_seconds() {
        let time = NaiveTime::from_hms_opt(10, 15, 59).unwrap();
        assert_eq!(minutes_of(time), 615);
    }

    #[test]
    fn date_strings() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(date_string(date), "2024-01-02");
        assert_eq!(parse_date("2024-01-02").unwrap(), date);
        assert!(parse_date("01/02/2024").is_err());
    }
}
