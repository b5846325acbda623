use thiserror::Error;

/// Input rejected locally, before anything is sent to the device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a time for the alarm.")]
    MissingAlarmTime,
    #[error("Alarm time '{0}' is not a valid HH:MM time of day")]
    InvalidAlarmTime(String),
    #[error("{field} must be a number (got '{value}')")]
    NotANumber { field: &'static str, value: String },
}
