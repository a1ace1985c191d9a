use std::time::Duration;

use super::types::{EndpointSpec, PercentX100, PositiveU64, PositiveUsize};
use crate::error::{AppError, AppResult, ValidationError};

pub(crate) fn parse_header(s: &str) -> Result<(String, String), ValidationError> {
    match s.split_once(':') {
        Some((key, value)) => Ok((key.trim().to_owned(), value.trim().to_owned())),
        None => Err(ValidationError::InvalidHeaderFormat {
            value: s.to_owned(),
        }),
    }
}

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(super) fn parse_endpoint(s: &str) -> AppResult<EndpointSpec> {
    s.parse::<EndpointSpec>().map_err(AppError::from)
}

pub(super) fn parse_percent(s: &str) -> AppResult<PercentX100> {
    s.parse::<PercentX100>().map_err(AppError::from)
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}

/// Parses `500ms`, `10s`, `5m`, `1h`, or a bare number of seconds.
pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(AppError::validation)
}

/// Milliseconds per supported unit suffix.
const DURATION_UNITS: [(&str, u64); 4] = [("ms", 1), ("s", 1_000), ("m", 60_000), ("h", 3_600_000)];

pub(crate) fn parse_duration_value(s: &str) -> Result<Duration, ValidationError> {
    let value = s.trim();
    if value.is_empty() {
        return Err(ValidationError::DurationEmpty);
    }

    let split = value
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(value.len());
    let (digits, suffix) = value.split_at(split);
    if digits.is_empty() {
        return Err(ValidationError::InvalidDurationFormat {
            value: value.to_owned(),
        });
    }
    let amount: u64 = digits
        .parse()
        .map_err(|err| ValidationError::InvalidDurationNumber {
            value: value.to_owned(),
            source: err,
        })?;

    let suffix = if suffix.is_empty() { "s" } else { suffix };
    let Some(&(_, millis_per_unit)) = DURATION_UNITS.iter().find(|(unit, _)| *unit == suffix)
    else {
        return Err(ValidationError::InvalidDurationUnit {
            unit: suffix.to_owned(),
        });
    };
    let millis = amount
        .checked_mul(millis_per_unit)
        .ok_or(ValidationError::DurationOverflow)?;
    if millis == 0 {
        return Err(ValidationError::DurationZero);
    }
    Ok(Duration::from_millis(millis))
}
