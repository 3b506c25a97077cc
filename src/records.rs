//! Typed access to the flat JSON records returned by the data source.
//!
//! Records have no shared schema; each dataset reads only the fields it
//! needs and ignores the rest.

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// One row of a dataset's `data` array.
pub type RawRecord = Map<String, Value>;

/// A record that cannot contribute to its series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("missing field `{field}`")]
    MissingField { field: String },
    #[error("field `{field}` has unusable value {value}")]
    InvalidValue { field: String, value: String },
}

impl RecordError {
    fn missing(field: &str) -> Self {
        RecordError::MissingField {
            field: field.to_string(),
        }
    }

    fn invalid(field: &str, value: &Value) -> Self {
        RecordError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }
}

/// Normalized year key. `2019` and `"2019"` map to the same `Year`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Year(pub i32);

impl fmt::Display for Year {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for Year {
    fn from(y: i32) -> Self {
        Year(y)
    }
}

fn field<'a>(record: &'a RawRecord, name: &str) -> Result<&'a Value, RecordError> {
    match record.get(name) {
        Some(v) => Ok(v),
        None => Err(RecordError::missing(name)),
    }
}

/// Reads a year key from either an integer or an integer-valued string.
pub fn year(record: &RawRecord, name: &str) -> Result<Year, RecordError> {
    let v = field(record, name)?;
    let parsed = match v {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => s.trim().parse::<i32>().ok(),
        _ => None,
    };
    parsed.map(Year).ok_or_else(|| RecordError::invalid(name, v))
}

/// Reads a finite number from a JSON number or a numeric string.
pub fn number(record: &RawRecord, name: &str) -> Result<f64, RecordError> {
    let v = field(record, name)?;
    let parsed = match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|x| x.is_finite())
        .ok_or_else(|| RecordError::invalid(name, v))
}

/// Reads a non-negative whole count (population, weight).
pub fn count(record: &RawRecord, name: &str) -> Result<u64, RecordError> {
    let v = field(record, name)?;
    if let Some(n) = v.as_u64() {
        return Ok(n);
    }
    let x = number(record, name)?;
    if x >= 0.0 && x.fract() == 0.0 && x <= u64::MAX as f64 {
        Ok(x as u64)
    } else {
        Err(RecordError::invalid(name, v))
    }
}

/// Reads a numeric age bucket.
pub fn age(record: &RawRecord, name: &str) -> Result<u32, RecordError> {
    let n = count(record, name)?;
    u32::try_from(n).map_err(|_| RecordError::invalid(name, &Value::from(n)))
}

pub fn text<'a>(record: &'a RawRecord, name: &str) -> Result<&'a str, RecordError> {
    let v = field(record, name)?;
    v.as_str().ok_or_else(|| RecordError::invalid(name, v))
}
