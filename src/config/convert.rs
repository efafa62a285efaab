//! Built-in converters for the standard [`TypeTag`](super::registry::TypeTag)s.
//!
//! Date and time values use the ISO-8601 textual grammar; seconds and
//! fractional seconds are optional.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, Utc};

use super::registry::ConvertError;
use crate::record::{OffsetTime, Value};

const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, thiserror::Error)]
pub enum InvalidValue {
    #[error("'{0}' is not a valid boolean value")]
    Boolean(String),
    #[error("'{0}' has no UTC offset (expected 'Z' or '+HH:MM')")]
    MissingOffset(String),
    #[error("offset in '{0}' is out of range")]
    OffsetOutOfRange(String),
    #[error("'{value}' does not match the {expected} format")]
    Format { value: String, expected: &'static str },
}

pub fn string(raw: &str) -> Result<Value, ConvertError> {
    Ok(Value::String(raw.to_owned()))
}

pub fn integer(raw: &str) -> Result<Value, ConvertError> {
    Ok(Value::Integer(raw.parse()?))
}

pub fn float(raw: &str) -> Result<Value, ConvertError> {
    Ok(Value::Float(raw.parse()?))
}

pub fn boolean(raw: &str) -> Result<Value, ConvertError> {
    match raw.to_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "t" => Ok(Value::Boolean(true)),
        "false" | "no" | "n" | "0" | "f" => Ok(Value::Boolean(false)),
        _ => Err(InvalidValue::Boolean(raw.to_owned()).into()),
    }
}

pub fn date(raw: &str) -> Result<Value, ConvertError> {
    Ok(Value::Date(NaiveDate::parse_from_str(raw, "%Y-%m-%d")?))
}

pub fn time(raw: &str) -> Result<Value, ConvertError> {
    Ok(Value::Time(naive_time(raw)?))
}

pub fn date_time(raw: &str) -> Result<Value, ConvertError> {
    Ok(Value::DateTime(naive_date_time(raw)?))
}

pub fn date_time_offset(raw: &str) -> Result<Value, ConvertError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Value::DateTimeOffset(parsed));
    }
    let (local, offset) = split_offset(raw)?;
    let parsed = naive_date_time(local)?
        .and_local_timezone(offset)
        .single()
        .ok_or_else(|| InvalidValue::OffsetOutOfRange(raw.to_owned()))?;
    Ok(Value::DateTimeOffset(parsed))
}

pub fn time_offset(raw: &str) -> Result<Value, ConvertError> {
    let (local, offset) = split_offset(raw)?;
    Ok(Value::TimeOffset(OffsetTime {
        time: naive_time(local)?,
        offset,
    }))
}

fn naive_time(raw: &str) -> Result<NaiveTime, InvalidValue> {
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| InvalidValue::Format { value: raw.to_owned(), expected: "HH:MM[:SS[.fff]]" })
}

fn naive_date_time(raw: &str) -> Result<NaiveDateTime, InvalidValue> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .ok_or_else(|| InvalidValue::Format {
            value: raw.to_owned(),
            expected: "YYYY-MM-DDTHH:MM[:SS[.fff]]",
        })
}

/// Splits a trailing `Z` or `±HH:MM` off `raw`.
fn split_offset(raw: &str) -> Result<(&str, FixedOffset), InvalidValue> {
    if let Some(local) = raw.strip_suffix(['Z', 'z']) {
        return Ok((local, Utc.fix()));
    }

    let missing = || InvalidValue::MissingOffset(raw.to_owned());
    let split = raw
        .len()
        .checked_sub(6)
        .filter(|&i| raw.is_char_boundary(i))
        .ok_or_else(missing)?;
    let (local, suffix) = raw.split_at(split);

    let sign = match suffix.as_bytes()[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return Err(missing()),
    };
    let (hours, minutes) = suffix[1..].split_once(':').ok_or_else(missing)?;
    let hours: i32 = hours.parse().map_err(|_| missing())?;
    let minutes: i32 = minutes.parse().map_err(|_| missing())?;

    let offset = FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| InvalidValue::OffsetOutOfRange(raw.to_owned()))?;
    Ok((local, offset))
}
