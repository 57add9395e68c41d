use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::error::ExtractError;

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})(?::(\d{2}))?\s*(AM|PM)?\s*$").expect("valid time pattern")
});

/// Combine a calendar date and a human time string into a local
/// ISO-8601 timestamp, `YYYY-MM-DDTHH:MM:00`, with no timezone suffix.
///
/// The timezone argument is informational only: the client renders these
/// strings in the user's local time, so no conversion happens here.
pub fn local_datetime(date: &str, time: &str, _timezone: &str) -> Result<String, ExtractError> {
    let date = parse_date(date)?;
    let (hours, minutes) = parse_time(time)?;
    Ok(format!(
        "{}T{:02}:{:02}:00",
        date.format("%Y-%m-%d"),
        hours,
        minutes
    ))
}

/// Midnight of the given date, in the same suffix-free shape. Used as the
/// lenient fallback when only the time string is malformed.
pub fn date_floor(date: &str) -> Result<String, ExtractError> {
    let date = parse_date(date)?;
    Ok(format!("{}T00:00:00", date.format("%Y-%m-%d")))
}

fn parse_date(value: &str) -> Result<NaiveDate, ExtractError> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    // The model sometimes hands back a full datetime where a date was asked for.
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S") {
        return Ok(dt.date());
    }
    Err(ExtractError::DateFormat(trimmed.to_string()))
}

/// `H(:MM)? (AM|PM)?`, 12- or 24-hour. Minutes default to zero.
fn parse_time(value: &str) -> Result<(u32, u32), ExtractError> {
    let captures = TIME_PATTERN
        .captures(value)
        .ok_or_else(|| ExtractError::TimeFormat(value.to_string()))?;

    let mut hours: u32 = captures[1]
        .parse()
        .map_err(|_| ExtractError::TimeFormat(value.to_string()))?;
    let minutes: u32 = captures
        .get(2)
        .map(|m| m.as_str().parse())
        .transpose()
        .map_err(|_| ExtractError::TimeFormat(value.to_string()))?
        .unwrap_or(0);

    match captures.get(3).map(|m| m.as_str().to_uppercase()) {
        Some(meridiem) => {
            if hours == 0 || hours > 12 {
                return Err(ExtractError::TimeFormat(value.to_string()));
            }
            if meridiem == "PM" && hours != 12 {
                hours += 12;
            } else if meridiem == "AM" && hours == 12 {
                hours = 0;
            }
        }
        None => {
            if hours > 23 {
                return Err(ExtractError::TimeFormat(value.to_string()));
            }
        }
    }

    if minutes > 59 {
        return Err(ExtractError::TimeFormat(value.to_string()));
    }
    Ok((hours, minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn twenty_four_hour_input_is_idempotent() {
        assert_eq!(
            local_datetime("2024-03-01", "14:30", "UTC").unwrap(),
            "2024-03-01T14:30:00"
        );
    }

    #[test]
    fn converts_twelve_hour_times() {
        assert_eq!(
            local_datetime("2024-03-01", "2:15 PM", "Europe/Helsinki").unwrap(),
            "2024-03-01T14:15:00"
        );
        assert_eq!(
            local_datetime("2024-03-01", "12:00 AM", "Europe/Helsinki").unwrap(),
            "2024-03-01T00:00:00"
        );
        assert_eq!(
            local_datetime("2024-03-01", "12:00 PM", "Europe/Helsinki").unwrap(),
            "2024-03-01T12:00:00"
        );
    }

    #[test]
    fn minutes_are_optional() {
        assert_eq!(
            local_datetime("2024-03-01", "7 PM", "UTC").unwrap(),
            "2024-03-01T19:00:00"
        );
        assert_eq!(
            local_datetime("2024-03-01", "9", "UTC").unwrap(),
            "2024-03-01T09:00:00"
        );
    }

    #[test]
    fn accepts_datetime_shaped_dates() {
        assert_eq!(
            local_datetime("2024-03-01T08:00:00", "7:00 AM", "UTC").unwrap(),
            "2024-03-01T07:00:00"
        );
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert!(local_datetime("2024-03-01", "25:00", "UTC").is_err());
        assert!(local_datetime("2024-03-01", "13:00 PM", "UTC").is_err());
        assert!(local_datetime("2024-03-01", "10:75", "UTC").is_err());
        assert!(local_datetime("2024-03-01", "noonish", "UTC").is_err());
    }

    #[test]
    fn rejects_unparseable_dates() {
        assert!(local_datetime("next friday", "10:00", "UTC").is_err());
        assert!(date_floor("next friday").is_err());
    }

    #[test]
    fn date_floor_is_midnight() {
        assert_eq!(date_floor("2024-03-01").unwrap(), "2024-03-01T00:00:00");
    }
}
