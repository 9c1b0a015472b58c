//! Typed column values
//!
//! One variant per declared column type. Values are checked against the
//! column's declared type whenever they enter the store (decode, insert,
//! update), so the query layer can match on the variant directly.

use std::cmp::Ordering;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::error::{FlintError, Result};
use crate::schema::ColumnType;

/// A single typed cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    String(String),
    Boolean(bool),
    Float(f64),
}

impl Value {
    /// The column type this value belongs to
    pub fn value_type(&self) -> ColumnType {
        match self {
            Value::Integer(_) => ColumnType::Integer,
            Value::String(_) => ColumnType::String,
            Value::Boolean(_) => ColumnType::Boolean,
            Value::Float(_) => ColumnType::Float,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view of integer and float values
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Decode a stored JSON scalar as a value of type `ty`
    ///
    /// Float columns accept JSON integers; integer columns reject JSON floats.
    pub fn from_json(json: &serde_json::Value, ty: ColumnType) -> Option<Value> {
        match ty {
            ColumnType::Integer => json.as_i64().map(Value::Integer),
            ColumnType::Float => json.as_f64().map(Value::Float),
            ColumnType::String => json.as_str().map(|s| Value::String(s.to_string())),
            ColumnType::Boolean => json.as_bool().map(Value::Boolean),
        }
    }

    /// Convert into a value storable in a column of type `ty`
    ///
    /// Integers widen into float columns. Non-finite floats are rejected
    /// because JSON cannot represent them.
    pub fn coerce_to(self, column: &str, ty: ColumnType) -> Result<Value> {
        match (ty, self) {
            (ColumnType::Integer, v @ Value::Integer(_)) => Ok(v),
            (ColumnType::String, v @ Value::String(_)) => Ok(v),
            (ColumnType::Boolean, v @ Value::Boolean(_)) => Ok(v),
            (ColumnType::Float, Value::Integer(i)) => Ok(Value::Float(i as f64)),
            (ColumnType::Float, Value::Float(f)) if f.is_finite() => Ok(Value::Float(f)),
            (ColumnType::Float, Value::Float(f)) => Err(FlintError::TypeMismatch {
                column: column.to_string(),
                detail: format!("{} cannot be stored", f),
            }),
            (ty, other) => Err(FlintError::TypeMismatch {
                column: column.to_string(),
                detail: format!("expected {}, got {}", ty, other.value_type()),
            }),
        }
    }

    /// Parse text as a value of type `ty`
    pub fn parse_as(text: &str, ty: ColumnType) -> Result<Value> {
        let invalid = || FlintError::Parse(format!("\"{}\" is not a valid {}", text, ty));
        match ty {
            ColumnType::Integer => text.parse().map(Value::Integer).map_err(|_| invalid()),
            ColumnType::Float => text.parse().map(Value::Float).map_err(|_| invalid()),
            ColumnType::Boolean => text.parse().map(Value::Boolean).map_err(|_| invalid()),
            ColumnType::String => Ok(Value::String(text.to_string())),
        }
    }

    /// Best-effort typing of untyped text: integer, then float, then
    /// boolean, otherwise string
    pub fn infer(text: &str) -> Value {
        if let Ok(i) = text.parse::<i64>() {
            Value::Integer(i)
        } else if let Ok(f) = text.parse::<f64>() {
            Value::Float(f)
        } else if let Ok(b) = text.parse::<bool>() {
            Value::Boolean(b)
        } else {
            Value::String(text.to_string())
        }
    }

    /// Total order between two values of the same column
    ///
    /// Mixed integer/float compares numerically; any other mix of variants
    /// is ordered by variant so sorting never panics.
    pub fn total_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x.total_cmp(&y),
                _ => a.rank().cmp(&b.rank()),
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Boolean(_) => 0,
            Value::Integer(_) | Value::Float(_) => 1,
            Value::String(_) => 2,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(i) => write!(f, "{}", i),
            Value::String(s) => f.write_str(s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Float(x) => write!(f, "{}", x),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::String(s) => serializer.serialize_str(s),
            Value::Boolean(b) => serializer.serialize_bool(*b),
            Value::Float(f) => serializer.serialize_f64(*f),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Integer(v as i64)
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
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}
