//! Synchronous input checks that run before anything reaches the database.

use chrono::{NaiveDate, NaiveTime, Timelike};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),
    #[error("Start and end dates are required")]
    DatesRequired,
    #[error("End date must be after start date")]
    EndBeforeStart,
    #[error("Budget cannot be negative")]
    NegativeBudget,
    #[error("Amount must be greater than zero")]
    NonPositiveAmount,
    #[error("Estimated cost cannot be negative")]
    NegativeCost,
    #[error("Expense date must be between {start} and {end}")]
    OutsideTrip { start: NaiveDate, end: NaiveDate },
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),
    #[error("{0} must be a time in HH:MM format")]
    InvalidTime(&'static str),
    #[error("End time must be after start time")]
    EndTimeBeforeStart,
}

/// Trims `value` and fails with [`ValidationError::Required`] when nothing is left.
pub fn require_text(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(trimmed.to_string())
    }
}

pub fn check_date_range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate), ValidationError> {
    let (Some(start), Some(end)) = (start, end) else {
        return Err(ValidationError::DatesRequired);
    };
    if end < start {
        return Err(ValidationError::EndBeforeStart);
    }
    Ok((start, end))
}

/// Minutes since midnight for an `HH:MM` string.
pub fn minutes_of_day(value: &str) -> Option<u32> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .ok()
        .map(|time| time.hour() * 60 + time.minute())
}

/// Empty times are allowed; anything else must parse as `HH:MM`.
pub fn check_time(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    minutes_of_day(trimmed)
        .map(|_| trimmed.to_string())
        .ok_or(ValidationError::InvalidTime(field))
}

pub fn check_time_window(start: &str, end: &str) -> Result<(), ValidationError> {
    match (minutes_of_day(start), minutes_of_day(end)) {
        (Some(start), Some(end)) if end < start => Err(ValidationError::EndTimeBeforeStart),
        _ => Ok(()),
    }
}

pub fn normalize_optional(input: Option<String>) -> Option<String> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
