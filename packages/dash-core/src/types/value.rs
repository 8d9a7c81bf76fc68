//! Typed cell values.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use super::coercion::parse_temporal;
use super::column_type::ColumnType;
use crate::error::DashError;

/// Format used when a temporal value leaves the engine as text.
pub(crate) const TEMPORAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A single cell value.
///
/// `Null` is admitted by every column type. Equality is structural, so two
/// nulls compare equal; predicate evaluation uses [`Value::compare`], which
/// never orders a null.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Text(String),
    Temporal(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Equality for change detection: structural, except that two NaN
    /// floats are the same cell.
    pub fn same_as(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            _ => self == other,
        }
    }

    /// Name of the value's own type, for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Text(_) => "text",
            Value::Temporal(_) => "temporal",
        }
    }

    /// Column type this value belongs to, `None` for null.
    pub fn column_type(&self) -> Option<ColumnType> {
        match self {
            Value::Null => None,
            Value::Integer(_) => Some(ColumnType::Integer),
            Value::Float(_) => Some(ColumnType::Float),
            Value::Boolean(_) => Some(ColumnType::Boolean),
            Value::Text(_) => Some(ColumnType::Text),
            Value::Temporal(_) => Some(ColumnType::Temporal),
        }
    }

    /// Numeric view of integer and float values.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Converts an untyped JSON scalar into a value.
    ///
    /// Integral numbers become `Integer`, other numbers `Float`, strings
    /// `Text`. Arrays and objects are rejected.
    pub fn from_json(json: &JsonValue) -> Result<Value, DashError> {
        match json {
            JsonValue::Null => Ok(Value::Null),
            JsonValue::Bool(b) => Ok(Value::Boolean(*b)),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Value::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Value::Float(f))
                } else {
                    Err(DashError::TypeMismatch {
                        expected: "number within 64-bit range".to_string(),
                        got: n.to_string(),
                    })
                }
            }
            JsonValue::String(s) => Ok(Value::Text(s.clone())),
            JsonValue::Array(_) | JsonValue::Object(_) => Err(DashError::TypeMismatch {
                expected: "scalar value".to_string(),
                got: json.to_string(),
            }),
        }
    }

    /// JSON representation; temporal values become ISO-8601 strings.
    pub fn to_json(&self) -> JsonValue {
        match self {
            Value::Null => JsonValue::Null,
            Value::Integer(i) => JsonValue::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::Boolean(b) => JsonValue::Bool(*b),
            Value::Text(s) => JsonValue::String(s.clone()),
            Value::Temporal(t) => JsonValue::String(t.format(TEMPORAL_FORMAT).to_string()),
        }
    }

    /// Converts this value into one admitted by a column of type `target`.
    ///
    /// Null passes through unchanged. Lossy conversions (fractional float to
    /// integer, unparseable text) fail with `TypeMismatch`.
    pub fn coerce_to(&self, target: ColumnType) -> Result<Value, DashError> {
        let mismatch = || DashError::TypeMismatch {
            expected: target.name().to_string(),
            got: format!("{} {}", self.type_name(), self),
        };

        match (target, self) {
            (_, Value::Null) => Ok(Value::Null),

            (ColumnType::Integer, Value::Integer(_)) => Ok(self.clone()),
            (ColumnType::Integer, Value::Float(f)) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Ok(Value::Integer(*f as i64))
                } else {
                    Err(mismatch())
                }
            }
            (ColumnType::Integer, Value::Text(s)) => {
                s.trim().parse().map(Value::Integer).map_err(|_| mismatch())
            }

            (ColumnType::Float, Value::Float(_)) => Ok(self.clone()),
            (ColumnType::Float, Value::Integer(i)) => Ok(Value::Float(*i as f64)),
            (ColumnType::Float, Value::Text(s)) => {
                s.trim().parse().map(Value::Float).map_err(|_| mismatch())
            }

            (ColumnType::Boolean, Value::Boolean(_)) => Ok(self.clone()),
            (ColumnType::Boolean, Value::Integer(0)) => Ok(Value::Boolean(false)),
            (ColumnType::Boolean, Value::Integer(1)) => Ok(Value::Boolean(true)),
            (ColumnType::Boolean, Value::Text(s)) => match s.trim().to_ascii_lowercase().as_str()
            {
                "true" => Ok(Value::Boolean(true)),
                "false" => Ok(Value::Boolean(false)),
                _ => Err(mismatch()),
            },

            (ColumnType::Text, Value::Text(_)) => Ok(self.clone()),
            (ColumnType::Text, other) => Ok(Value::Text(other.to_string())),

            (ColumnType::Temporal, Value::Temporal(_)) => Ok(self.clone()),
            (ColumnType::Temporal, Value::Text(s)) => parse_temporal(s)
                .map(Value::Temporal)
                .ok_or_else(mismatch),

            _ => Err(mismatch()),
        }
    }

    /// Natural ordering used by predicates.
    ///
    /// Numeric values compare across integer and float; other types only
    /// compare with their own kind. Null never compares.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Temporal(a), Value::Temporal(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order for sorting labels: nulls first, then by type, then by value.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        fn rank(value: &Value) -> u8 {
            match value {
                Value::Null => 0,
                Value::Boolean(_) => 1,
                Value::Integer(_) | Value::Float(_) => 2,
                Value::Temporal(_) => 3,
                Value::Text(_) => 4,
            }
        }

        match (self, other) {
            (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
                match (self, other) {
                    (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
                    _ => self
                        .as_f64()
                        .unwrap_or(f64::NAN)
                        .total_cmp(&other.as_f64().unwrap_or(f64::NAN)),
                }
            }
            _ => self
                .compare(other)
                .unwrap_or_else(|| rank(self).cmp(&rank(other))),
        }
    }

    /// Returns true if the timestamp has no time-of-day component.
    pub(crate) fn is_midnight(&self) -> bool {
        match self {
            Value::Temporal(t) => t.num_seconds_from_midnight() == 0 && t.nanosecond() == 0,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Integer(i) => write!(f, "{}", i),
            // keep a trailing ".0" so floats stay distinguishable from integers
            Value::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{:.1}", v)
            }
            Value::Float(v) => write!(f, "{}", v),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Text(s) => f.write_str(s),
            Value::Temporal(t) => write!(f, "{}", t.format(TEMPORAL_FORMAT)),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Temporal(v)
    }
}
