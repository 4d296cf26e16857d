//! Dynamic values exchanged with the database.
//!
//! [`Value`] is what rows contain and what parameters are bound as. Typed DTO
//! properties move in and out of it through [`DtoValue`].

use crate::dto::FieldType;
use crate::error::{OrmError, OrmResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::fmt;

/// A single database scalar (or a typed value on its way to becoming one).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// Timestamp without time zone.
    DateTime(NaiveDateTime),
    /// Timestamp in UTC.
    DateTimeUtc(DateTime<Utc>),
    Date(NaiveDate),
    /// A member of a backed enum.
    Enum(EnumValue),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Text(_) => "string",
            Value::DateTime(_) => "datetime",
            Value::DateTimeUtc(_) => "datetime_utc",
            Value::Date(_) => "date",
            Value::Enum(_) => "enum",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "\"{s}\""),
            Value::DateTime(v) => write!(f, "{v}"),
            Value::DateTimeUtc(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{v}"),
            Value::Enum(e) => write!(f, "{}::{}", e.type_name, e.variant),
        }
    }
}

/// Scalar a backed enum member stands for in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backing {
    Int(i64),
    Str(&'static str),
}

impl Backing {
    pub fn to_value(self) -> Value {
        match self {
            Backing::Int(i) => Value::Int(i),
            Backing::Str(s) => Value::Text(s.to_string()),
        }
    }

    /// Whether a raw database value denotes this backing scalar.
    ///
    /// Drivers that return numbers as text are accepted for int backings.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (Backing::Int(i), Value::Int(v)) => i == v,
            (Backing::Int(i), Value::Text(s)) => s.trim().parse::<i64>().is_ok_and(|v| v == *i),
            (Backing::Str(s), Value::Text(v)) => s == v,
            (Backing::Str(s), Value::Int(v)) => s.parse::<i64>().is_ok_and(|i| i == *v),
            _ => false,
        }
    }
}

impl fmt::Display for Backing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backing::Int(i) => write!(f, "{i}"),
            Backing::Str(s) => write!(f, "\"{s}\""),
        }
    }
}

/// A backed enum member carried as a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumValue {
    /// Descriptor of the enum type (see [`crate::BackedEnum::TYPE_NAME`]).
    pub type_name: &'static str,
    pub variant: &'static str,
    pub backing: Backing,
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTimeUtc(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// A Rust type that can live in a DTO property.
///
/// `TYPE` is the declared type the hydrator casts raw values to; `from_value`
/// then unwraps the already-cast value into the native type.
pub trait DtoValue: Sized {
    const TYPE: FieldType;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> OrmResult<Self>;
}

fn mismatch<T>(expected: &str, value: &Value) -> OrmResult<T> {
    Err(OrmError::cast(format!(
        "expected {expected}, got {} ({value})",
        value.kind()
    )))
}

macro_rules! impl_dto_value_int {
    ($($t:ty),*) => {
        $(
            impl DtoValue for $t {
                const TYPE: FieldType = FieldType::named("int");

                fn to_value(&self) -> Value {
                    Value::Int(i64::from(*self))
                }

                fn from_value(value: Value) -> OrmResult<Self> {
                    match value {
                        Value::Int(i) => <$t>::try_from(i).map_err(|_| {
                            OrmError::cast(format!(
                                "{i} is out of range for {}",
                                stringify!($t)
                            ))
                        }),
                        other => mismatch("int", &other),
                    }
                }
            }
        )*
    };
}

impl_dto_value_int!(i16, i32, i64, u16, u32);

impl DtoValue for f64 {
    const TYPE: FieldType = FieldType::named("float");

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Float(v) => Ok(v),
            Value::Int(i) => Ok(i as f64),
            other => mismatch("float", &other),
        }
    }
}

impl DtoValue for f32 {
    const TYPE: FieldType = FieldType::named("float");

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> OrmResult<Self> {
        f64::from_value(value).map(|v| v as f32)
    }
}

impl DtoValue for bool {
    const TYPE: FieldType = FieldType::named("bool");

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            other => mismatch("bool", &other),
        }
    }
}

impl DtoValue for String {
    const TYPE: FieldType = FieldType::named("string");

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => mismatch("string", &other),
        }
    }
}

impl DtoValue for NaiveDateTime {
    const TYPE: FieldType = FieldType::named("datetime");

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::DateTime(v) => Ok(v),
            other => mismatch("datetime", &other),
        }
    }
}

impl DtoValue for DateTime<Utc> {
    const TYPE: FieldType = FieldType::named("datetime_utc");

    fn to_value(&self) -> Value {
        Value::DateTimeUtc(*self)
    }

    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::DateTimeUtc(v) => Ok(v),
            other => mismatch("datetime_utc", &other),
        }
    }
}

impl DtoValue for NaiveDate {
    const TYPE: FieldType = FieldType::named("date");

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Date(v) => Ok(v),
            other => mismatch("date", &other),
        }
    }
}

/// An untyped property: receives the raw row value as-is.
impl DtoValue for Value {
    const TYPE: FieldType = FieldType::Mixed;

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn from_value(value: Value) -> OrmResult<Self> {
        Ok(value)
    }
}

impl<T: DtoValue> DtoValue for Option<T> {
    const TYPE: FieldType = T::TYPE.nullable();

    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
