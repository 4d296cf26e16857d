//! Value conversion for writes: typed DTO values → database scalars.

use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use chrono::format::{Item, StrftimeItems};
use std::fmt::Write as _;

/// Default output format for timestamps.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Default output format for dates.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Turns one kind of [`Value`] into something the driver can bind.
pub trait ValueConverter: Send + Sync {
    fn supports(&self, value: &Value) -> bool;

    fn convert_for_db(&self, value: Value) -> Value;
}

/// `true`/`false` → `1`/`0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolValueConverter;

impl ValueConverter for BoolValueConverter {
    fn supports(&self, value: &Value) -> bool {
        matches!(value, Value::Bool(_))
    }

    fn convert_for_db(&self, value: Value) -> Value {
        match value {
            Value::Bool(b) => Value::Int(i64::from(b)),
            other => other,
        }
    }
}

/// Enum member → its backing scalar.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumValueConverter;

impl ValueConverter for EnumValueConverter {
    fn supports(&self, value: &Value) -> bool {
        matches!(value, Value::Enum(_))
    }

    fn convert_for_db(&self, value: Value) -> Value {
        match value {
            Value::Enum(e) => e.backing.to_value(),
            other => other,
        }
    }
}

/// Date/time values → formatted strings.
#[derive(Debug, Clone)]
pub struct DateTimeValueConverter {
    datetime_format: String,
    date_format: String,
}

impl Default for DateTimeValueConverter {
    fn default() -> Self {
        Self {
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl DateTimeValueConverter {
    /// Use custom `strftime` formats for timestamps and dates.
    pub fn new(datetime_format: impl Into<String>, date_format: impl Into<String>) -> OrmResult<Self> {
        let datetime_format = datetime_format.into();
        let date_format = date_format.into();
        check_format(&datetime_format)?;
        check_format(&date_format)?;
        Ok(Self {
            datetime_format,
            date_format,
        })
    }

    pub fn datetime_format(&self) -> &str {
        &self.datetime_format
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }
}

fn check_format(format: &str) -> OrmResult<()> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(OrmError::logic(format!("invalid date/time format \"{format}\"")));
    }
    Ok(())
}

// A valid format can still fail for a given value (e.g. `%z` on a naive
// timestamp); fall back to the default format instead of panicking.
fn render(formatted: impl std::fmt::Display, fallback: impl std::fmt::Display) -> String {
    let mut out = String::new();
    if write!(out, "{formatted}").is_err() {
        out.clear();
        let _ = write!(out, "{fallback}");
    }
    out
}

impl ValueConverter for DateTimeValueConverter {
    fn supports(&self, value: &Value) -> bool {
        matches!(
            value,
            Value::DateTime(_) | Value::DateTimeUtc(_) | Value::Date(_)
        )
    }

    fn convert_for_db(&self, value: Value) -> Value {
        match value {
            Value::DateTime(v) => Value::Text(render(
                v.format(&self.datetime_format),
                v.format(DEFAULT_DATETIME_FORMAT),
            )),
            Value::DateTimeUtc(v) => Value::Text(render(
                v.format(&self.datetime_format),
                v.format(DEFAULT_DATETIME_FORMAT),
            )),
            Value::Date(v) => Value::Text(render(
                v.format(&self.date_format),
                v.format(DEFAULT_DATE_FORMAT),
            )),
            other => other,
        }
    }
}

/// Ordered chain of converters; the first one that supports a value wins.
pub struct ValueConverterRegistry {
    converters: Vec<Box<dyn ValueConverter>>,
}

impl std::fmt::Debug for ValueConverterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueConverterRegistry")
            .field("converters", &self.converters.len())
            .finish()
    }
}

impl Default for ValueConverterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ValueConverterRegistry {
    /// A registry with no converters: every value passes through.
    pub fn new() -> Self {
        Self {
            converters: Vec::new(),
        }
    }

    /// Bool, enum and date/time converters (default formats).
    pub fn with_defaults() -> Self {
        Self::new()
            .with_converter(BoolValueConverter)
            .with_converter(EnumValueConverter)
            .with_converter(DateTimeValueConverter::default())
    }

    pub fn with_converter(mut self, converter: impl ValueConverter + 'static) -> Self {
        self.add_converter(converter);
        self
    }

    pub fn add_converter(&mut self, converter: impl ValueConverter + 'static) -> &mut Self {
        self.converters.push(Box::new(converter));
        self
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }
}

impl ValueConverter for ValueConverterRegistry {
    fn supports(&self, value: &Value) -> bool {
        self.converters.iter().any(|c| c.supports(value))
    }

    fn convert_for_db(&self, value: Value) -> Value {
        if value.is_null() {
            return value;
        }
        match self.converters.iter().find(|c| c.supports(&value)) {
            Some(converter) => converter.convert_for_db(value),
            None => value,
        }
    }
}
