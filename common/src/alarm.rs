use chrono::{Datelike, Local, NaiveDateTime, Timelike, Utc};

use crate::{error::ValidationError, types::AlarmRequest};

/// Checks a user-chosen `HH:MM` wake time and returns it trimmed.
pub fn validate_time_of_day(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingAlarmTime);
    }

    let invalid = || ValidationError::InvalidAlarmTime(trimmed.to_string());
    let (hour, minute) = trimmed.split_once(':').ok_or_else(invalid)?;
    let in_range = |part: &str, max: u32| {
        (1..=2).contains(&part.len())
            && part.chars().all(|c| c.is_ascii_digit())
            && part.parse::<u32>().map(|v| v <= max).unwrap_or(false)
    };

    if in_range(hour, 23) && in_range(minute, 59) {
        Ok(trimmed.to_string())
    } else {
        Err(invalid())
    }
}

/// `year:month:day:hour:minute:second`, unpadded, 1-based month and day.
pub fn clock_token<T: Datelike + Timelike>(now: &T) -> String {
    format!(
        "{}:{}:{}:{}:{}:{}",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}

pub fn schedule_request<T: Datelike + Timelike>(
    alarm_time: &str,
    now: &T,
) -> Result<AlarmRequest, ValidationError> {
    let alarm_time = validate_time_of_day(alarm_time)?;
    Ok(AlarmRequest {
        current_time: Some(clock_token(now)),
        alarm_time: Some(alarm_time),
    })
}

/// Current wall-clock time in `timezone`, or host local time.
pub fn wall_clock(timezone: Option<&str>) -> NaiveDateTime {
    match timezone.and_then(|zone| zone.parse::<chrono_tz::Tz>().ok()) {
        Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
        None => Local::now().naive_local(),
    }
}
