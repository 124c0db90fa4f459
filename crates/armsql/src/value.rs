//! Runtime values bound to statements.
//!
//! [`Value`] is the single currency between row accessors, generators, and the statement
//! context. Conversions to and from Rust types are provided through `From<T>` and
//! [`FromValue`], which is what `#[derive(RowAccessor)]` expands to.

use crate::meta::HostType;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use uuid::Uuid;

/// A dynamically typed SQL value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    I16(i16),
    I32(i32),
    I64(i64),
    /// Arbitrary precision integer, stored as a scale-0 decimal.
    BigInt(Decimal),
    Decimal(Decimal),
    F32(f32),
    F64(f64),
    Text(String),
    Bytes(Vec<u8>),
    Uuid(Uuid),
    Date(NaiveDate),
    Time(NaiveTime),
    /// Local date-time without zone.
    DateTime(NaiveDateTime),
    OffsetDateTime(DateTime<FixedOffset>),
    /// Date-time carrying the configured zone; rendered like `OffsetDateTime`.
    ZonedDateTime(DateTime<FixedOffset>),
    Json(serde_json::Value),
}

impl Value {
    /// Check if this value is SQL `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short type name, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::I16(_) => "i16",
            Value::I32(_) => "i32",
            Value::I64(_) => "i64",
            Value::BigInt(_) => "bigint",
            Value::Decimal(_) => "decimal",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Uuid(_) => "uuid",
            Value::Date(_) => "date",
            Value::Time(_) => "time",
            Value::DateTime(_) => "datetime",
            Value::OffsetDateTime(_) => "offset_datetime",
            Value::ZonedDateTime(_) => "zoned_datetime",
            Value::Json(_) => "json",
        }
    }

    /// Whether this value can be stored in a column of the given host type.
    ///
    /// `NULL` matches every host type; nullability is checked separately.
    pub fn matches_host(&self, host: HostType) -> bool {
        matches!(
            (self, host),
            (Value::Null, _)
                | (Value::Bool(_), HostType::Bool)
                | (Value::I16(_), HostType::I16)
                | (Value::I32(_), HostType::I32)
                | (Value::I64(_), HostType::I64)
                | (Value::BigInt(_), HostType::BigInt)
                | (Value::Decimal(_), HostType::Decimal)
                | (Value::F32(_), HostType::F32)
                | (Value::F64(_), HostType::F64)
                | (Value::Text(_), HostType::Text)
                | (Value::Bytes(_), HostType::Bytes)
                | (Value::Uuid(_), HostType::Uuid)
                | (Value::Date(_), HostType::Date)
                | (Value::Time(_), HostType::Time)
                | (Value::DateTime(_), HostType::LocalDateTime)
                | (Value::OffsetDateTime(_), HostType::OffsetDateTime)
                | (Value::ZonedDateTime(_), HostType::ZonedDateTime)
                | (Value::Json(_), HostType::Json)
        )
    }
}

impl Value {
    /// Host type this value naturally belongs to; `None` for `NULL`.
    pub fn host_type(&self) -> Option<HostType> {
        Some(match self {
            Value::Null => return None,
            Value::Bool(_) => HostType::Bool,
            Value::I16(_) => HostType::I16,
            Value::I32(_) => HostType::I32,
            Value::I64(_) => HostType::I64,
            Value::BigInt(_) => HostType::BigInt,
            Value::Decimal(_) => HostType::Decimal,
            Value::F32(_) => HostType::F32,
            Value::F64(_) => HostType::F64,
            Value::Text(_) => HostType::Text,
            Value::Bytes(_) => HostType::Bytes,
            Value::Uuid(_) => HostType::Uuid,
            Value::Date(_) => HostType::Date,
            Value::Time(_) => HostType::Time,
            Value::DateTime(_) => HostType::LocalDateTime,
            Value::OffsetDateTime(_) => HostType::OffsetDateTime,
            Value::ZonedDateTime(_) => HostType::ZonedDateTime,
            Value::Json(_) => HostType::Json,
        })
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::I16(v) => write!(f, "{v}"),
            Value::I32(v) => write!(f, "{v}"),
            Value::I64(v) => write!(f, "{v}"),
            Value::BigInt(v) | Value::Decimal(v) => write!(f, "{v}"),
            Value::F32(v) => write!(f, "{v}"),
            Value::F64(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Uuid(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Time(v) => write!(f, "{v}"),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::OffsetDateTime(v) | Value::ZonedDateTime(v) => write!(f, "{}", v.to_rfc3339()),
            Value::Json(v) => write!(f, "{v}"),
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::$variant(v)
            }
        })+
    };
}

value_from! {
    bool => Bool,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    Decimal => Decimal,
    f32 => F32,
    f64 => F64,
    String => Text,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => OffsetDateTime,
    serde_json::Value => Json,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::OffsetDateTime(v.fixed_offset())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Convert a [`Value`] back into a Rust type.
///
/// Returns a human-readable message on mismatch; callers attach the property name.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, String>;
}

macro_rules! from_value {
    ($($ty:ty => $($variant:ident)|+),+ $(,)?) => {
        $(impl FromValue for $ty {
            fn from_value(value: Value) -> Result<Self, String> {
                match value {
                    $(Value::$variant(v) => Ok(v),)+
                    other => Err(format!(
                        "expected {}, found {}",
                        stringify!($ty),
                        other.type_name()
                    )),
                }
            }
        })+
    };
}

from_value! {
    bool => Bool,
    i16 => I16,
    i32 => I32,
    Decimal => Decimal | BigInt,
    f32 => F32,
    f64 => F64,
    String => Text,
    Vec<u8> => Bytes,
    Uuid => Uuid,
    NaiveDate => Date,
    NaiveTime => Time,
    NaiveDateTime => DateTime,
    DateTime<FixedOffset> => OffsetDateTime | ZonedDateTime,
    serde_json::Value => Json,
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, String> {
        // Post-generated ids come back from drivers as the widest integer type.
        match value {
            Value::I64(v) => Ok(v),
            Value::I32(v) => Ok(v.into()),
            Value::I16(v) => Ok(v.into()),
            other => Err(format!("expected i64, found {}", other.type_name())),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
