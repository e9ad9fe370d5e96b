//! Timestamp parsing for clip boundaries.
//!
//! Accepts `MM:SS` and `HH:MM:SS`. Anything else is either read as zero
//! (lenient mode) or rejected (strict mode).

use std::str::FromStr;

use super::error::ClipError;

/// Largest accepted timestamp, so durations can be computed as `i64`.
pub const MAX_TIMESTAMP_SECONDS: u64 = i64::MAX as u64;

/// How malformed timestamps are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimestampMode {
    /// Malformed input is read as 0 seconds.
    #[default]
    Lenient,
    /// Malformed input fails the request with a validation error.
    Strict,
}

impl FromStr for TimestampMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(TimestampMode::Lenient),
            "strict" => Ok(TimestampMode::Strict),
            other => Err(format!("unknown timestamp mode '{}'", other)),
        }
    }
}

/// Parses `MM:SS` or `HH:MM:SS` into seconds, or `None` if the shape or any
/// component is invalid.
pub fn try_parse_timestamp(input: &str) -> Option<u64> {
    let parts = input
        .split(':')
        .map(|part| part.trim().parse::<u64>().ok())
        .collect::<Option<Vec<u64>>>()?;

    // overflow counts as malformed; seconds must also fit a signed duration
    let total = match parts.as_slice() {
        [minutes, seconds] => minutes.checked_mul(60)?.checked_add(*seconds),
        [hours, minutes, seconds] => hours
            .checked_mul(3600)?
            .checked_add(minutes.checked_mul(60)?)?
            .checked_add(*seconds),
        _ => None,
    }?;
    (total <= MAX_TIMESTAMP_SECONDS).then_some(total)
}

/// Lenient parse: malformed timestamps become 0.
pub fn parse_timestamp(input: &str) -> u64 {
    try_parse_timestamp(input).unwrap_or(0)
}

/// Parses a timestamp according to `mode`. `field` names the request field
/// in the validation message.
pub fn parse_with_mode(input: &str, field: &str, mode: TimestampMode) -> Result<u64, ClipError> {
    match mode {
        TimestampMode::Lenient => Ok(parse_timestamp(input)),
        TimestampMode::Strict => try_parse_timestamp(input).ok_or_else(|| {
            ClipError::Validation(format!(
                "Invalid {} timestamp '{}': expected MM:SS or HH:MM:SS",
                field, input
            ))
        }),
    }
}
