use super::TypeCaster;
use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// Casts to `int`, `float`, `bool` and `string`.
///
/// NULL becomes the zero value of the target type. Numeric text is parsed
/// without locale rules; text that is not numeric is an error.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarTypeCaster;

const TYPES: &[&str] = &["int", "float", "bool", "string"];

impl TypeCaster for ScalarTypeCaster {
    fn supports(&self, type_name: &str) -> bool {
        TYPES.contains(&type_name)
    }

    fn cast(&self, value: Value, type_name: &str) -> OrmResult<Value> {
        match type_name {
            "int" => to_int(value).map(Value::Int),
            "float" => to_float(value).map(Value::Float),
            "bool" => Ok(Value::Bool(truthy(&value))),
            "string" => Ok(Value::Text(to_text(value))),
            other => Err(OrmError::cast(format!("ScalarTypeCaster cannot cast to \"{other}\""))),
        }
    }
}

fn to_int(value: Value) -> OrmResult<i64> {
    match value {
        Value::Null => Ok(0),
        Value::Int(i) => Ok(i),
        Value::Bool(b) => Ok(i64::from(b)),
        Value::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
        Value::Text(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(i);
            }
            match parse_float(trimmed) {
                Some(f) => Ok(f.trunc() as i64),
                None => Err(OrmError::cast(format!("\"{s}\" is not a valid int"))),
            }
        }
        other => Err(OrmError::cast(format!("cannot cast {} to int", other.kind()))),
    }
}

fn to_float(value: Value) -> OrmResult<f64> {
    match value {
        Value::Null => Ok(0.0),
        Value::Float(f) => Ok(f),
        Value::Int(i) => Ok(i as f64),
        Value::Bool(b) => Ok(if b { 1.0 } else { 0.0 }),
        Value::Text(s) => parse_float(s.trim())
            .ok_or_else(|| OrmError::cast(format!("\"{s}\" is not a valid float"))),
        other => Err(OrmError::cast(format!("cannot cast {} to float", other.kind()))),
    }
}

// Rust's float parser also accepts "inf" and "NaN"; databases never mean that.
fn parse_float(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|f| f.is_finite())
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Int(i) => *i != 0,
        Value::Float(f) => *f != 0.0,
        Value::Text(s) => !(s.is_empty() || s == "0"),
        _ => true,
    }
}

fn to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Text(s) => s,
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) => String::new(),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::DateTime(v) => v.format(crate::convert::DEFAULT_DATETIME_FORMAT).to_string(),
        Value::DateTimeUtc(v) => v.format(crate::convert::DEFAULT_DATETIME_FORMAT).to_string(),
        Value::Date(v) => v.format(crate::convert::DEFAULT_DATE_FORMAT).to_string(),
        Value::Enum(e) => match e.backing {
            crate::value::Backing::Int(i) => i.to_string(),
            crate::value::Backing::Str(s) => s.to_string(),
        },
    }
}
