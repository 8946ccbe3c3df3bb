use std::fmt;

use thiserror::Error;

pub const ACCEPTED_FORMATS: &str = "enter time as SS, MM:SS or HH:MM:SS (example: 90 -> 00:01:30)";

/// A positive countdown length, normalized so minutes and seconds stay below 60.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct CountdownDuration {
    total_seconds: u64,
}

impl CountdownDuration {
    pub fn total_seconds(&self) -> u64 {
        self.total_seconds
    }

    pub fn canonical(&self) -> String {
        format_hms(self.total_seconds)
    }
}

impl fmt::Display for CountdownDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
pub enum InvalidReason {
    #[error("input is empty")]
    Empty,
    #[error("fields must not be negative")]
    Negative,
    #[error("{0} field is not a whole number")]
    NotAnInteger(FieldPosition),
    #[error("at most three fields are allowed")]
    TooManyFields,
    #[error("duration is too large")]
    Overflow,
    #[error("duration must be greater than zero")]
    Zero,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum FieldPosition {
    Hours,
    Minutes,
    Seconds,
}

impl fmt::Display for FieldPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FieldPosition::Hours => "hours",
            FieldPosition::Minutes => "minutes",
            FieldPosition::Seconds => "seconds",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Error)]
#[error("invalid duration: {reason}; {}", ACCEPTED_FORMATS)]
pub struct InvalidDurationInput {
    pub reason: InvalidReason,
}

impl From<InvalidReason> for InvalidDurationInput {
    fn from(reason: InvalidReason) -> Self {
        Self { reason }
    }
}

/// Parses `SS`, `MM:SS` or `HH:MM:SS`, carrying seconds and minutes overflow upward.
pub fn parse_duration(input: &str) -> Result<CountdownDuration, InvalidDurationInput> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InvalidReason::Empty.into());
    }

    let fields = trimmed.split(':').map(str::trim).collect::<Vec<_>>();
    if fields.len() > 3 {
        return Err(InvalidReason::TooManyFields.into());
    }

    // Right-to-left: the last field is always seconds.
    let positions = [
        FieldPosition::Seconds,
        FieldPosition::Minutes,
        FieldPosition::Hours,
    ];
    let mut values = [0_u64; 3];
    for (slot, (field, position)) in fields.iter().rev().zip(positions).enumerate() {
        values[slot] = parse_field(field, position)?;
    }
    let [seconds, minutes, hours] = values;

    let total_seconds = hours
        .checked_mul(3600)
        .and_then(|h| minutes.checked_mul(60).and_then(|m| h.checked_add(m)))
        .and_then(|hm| hm.checked_add(seconds))
        .ok_or(InvalidReason::Overflow)?;
    if total_seconds == 0 {
        return Err(InvalidReason::Zero.into());
    }

    Ok(CountdownDuration { total_seconds })
}

fn parse_field(field: &str, position: FieldPosition) -> Result<u64, InvalidReason> {
    if let Some(rest) = field.strip_prefix('-') {
        if !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()) {
            return Err(InvalidReason::Negative);
        }
        return Err(InvalidReason::NotAnInteger(position));
    }
    let digits = field.strip_prefix('+').unwrap_or(field);
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(InvalidReason::NotAnInteger(position));
    }
    digits.parse::<u64>().map_err(|_| InvalidReason::Overflow)
}

pub fn format_hms(total_seconds: u64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
