//! # Attribute Values
//!
//! Literal values carried by predicates and field setters, together with the capability
//! traits that decide which predicate operators an attribute exposes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// A literal attribute value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uuid(Uuid),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Compare two values the way a predicate does.
    ///
    /// Integers and floats widen to a common numeric comparison. `Null` and values of
    /// different kinds are not comparable and yield `None`.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Uuid(a), Value::Uuid(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Total order used for sorting. `Null` sorts after every other value.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Null, _) => Ordering::Greater,
            (_, Value::Null) => Ordering::Less,
            _ => self
                .compare(other)
                .unwrap_or_else(|| self.kind_rank().cmp(&other.kind_rank())),
        }
    }

    fn kind_rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Int(_) | Value::Float(_) => 1,
            Value::Text(_) => 2,
            Value::Uuid(_) => 3,
            Value::Timestamp(_) => 4,
            Value::Null => 5,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(value) => write!(f, "{value}"),
            Value::Int(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value}"),
            Value::Text(value) => write!(f, "'{}'", value.replace('\'', "''")),
            Value::Uuid(value) => write!(f, "'{value}'"),
            Value::Timestamp(value) => write!(f, "'{}'", value.to_rfc3339()),
        }
    }
}

impl<V: AttributeValue> From<Option<V>> for Value {
    fn from(value: Option<V>) -> Self {
        value.map_or(Value::Null, |v| v.to_value())
    }
}

/// A type that can be the value type of an attribute.
pub trait AttributeValue: Clone + Send + Sync + 'static {
    fn to_value(&self) -> Value;
}

/// Values with a natural ordering; unlocks `is_less_than` and friends.
pub trait ComparableValue: AttributeValue {}

/// Comparable values with a zero; unlocks the sign tests.
pub trait NumericValue: ComparableValue {
    fn zero() -> Self;
}

macro_rules! integer_value {
    ($($ty:ty),*) => {
        $(
            impl AttributeValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }
            }

            impl ComparableValue for $ty {}

            impl NumericValue for $ty {
                fn zero() -> Self {
                    0
                }
            }
        )*
    };
}

integer_value!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! float_value {
    ($($ty:ty),*) => {
        $(
            impl AttributeValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Float(f64::from(*self))
                }
            }

            impl ComparableValue for $ty {}

            impl NumericValue for $ty {
                fn zero() -> Self {
                    0.0
                }
            }
        )*
    };
}

float_value!(f32, f64);

impl AttributeValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ComparableValue for bool {}

impl AttributeValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl ComparableValue for String {}

impl AttributeValue for Uuid {
    fn to_value(&self) -> Value {
        Value::Uuid(*self)
    }
}

impl ComparableValue for Uuid {}

impl AttributeValue for DateTime<Utc> {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl ComparableValue for DateTime<Utc> {}
