//! Conversions between [`Value`] and Postgres wire values.
//!
//! Binding adapts to the parameter type the server inferred, so text bound
//! into an `int4` slot is parsed and an int bound into `timestamp` is read as
//! a unix timestamp. Decoding picks a [`Value`] variant from the column type.

use crate::cast::{parse_date, parse_datetime, parse_datetime_utc};
use crate::error::{OrmError, OrmResult};
use crate::row::Row;
use crate::value::Value;
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use std::error::Error;
use std::str::FromStr;
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type};

type BoxError = Box<dyn Error + Sync + Send>;

fn is_textual(ty: &Type) -> bool {
    *ty == Type::TEXT
        || *ty == Type::VARCHAR
        || *ty == Type::BPCHAR
        || *ty == Type::NAME
        || *ty == Type::UNKNOWN
        || matches!(ty.kind(), Kind::Enum(_))
}

fn mismatch(value: &Value, ty: &Type) -> BoxError {
    format!("cannot bind {} value to parameter of type {ty}", value.kind()).into()
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(b) => bool_to_sql(*b, ty, out),
            Value::Int(i) => int_to_sql(*i, ty, out),
            Value::Float(f) => float_to_sql(*f, ty, out),
            Value::Text(s) => text_to_sql(s, ty, out),
            Value::DateTime(dt) => {
                if *ty == Type::TIMESTAMP {
                    dt.to_sql(ty, out)
                } else if *ty == Type::TIMESTAMPTZ {
                    dt.and_utc().to_sql(ty, out)
                } else if *ty == Type::DATE {
                    dt.date().to_sql(ty, out)
                } else if is_textual(ty) {
                    dt.to_string().as_str().to_sql(ty, out)
                } else {
                    Err(mismatch(self, ty))
                }
            }
            Value::DateTimeUtc(dt) => {
                if *ty == Type::TIMESTAMPTZ {
                    dt.to_sql(ty, out)
                } else if *ty == Type::TIMESTAMP {
                    dt.naive_utc().to_sql(ty, out)
                } else if *ty == Type::DATE {
                    dt.date_naive().to_sql(ty, out)
                } else if is_textual(ty) {
                    dt.to_rfc3339().as_str().to_sql(ty, out)
                } else {
                    Err(mismatch(self, ty))
                }
            }
            Value::Date(d) => {
                if *ty == Type::DATE {
                    d.to_sql(ty, out)
                } else if *ty == Type::TIMESTAMP {
                    d.and_time(chrono::NaiveTime::MIN).to_sql(ty, out)
                } else if is_textual(ty) {
                    d.to_string().as_str().to_sql(ty, out)
                } else {
                    Err(mismatch(self, ty))
                }
            }
            Value::Enum(e) => e.backing.to_value().to_sql(ty, out),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

fn bool_to_sql(b: bool, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if *ty == Type::BOOL {
        b.to_sql(ty, out)
    } else {
        int_to_sql(i64::from(b), ty, out)
    }
}

fn int_to_sql(i: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if *ty == Type::INT8 {
        i.to_sql(ty, out)
    } else if *ty == Type::INT4 {
        i32::try_from(i)?.to_sql(ty, out)
    } else if *ty == Type::INT2 {
        i16::try_from(i)?.to_sql(ty, out)
    } else if *ty == Type::OID {
        u32::try_from(i)?.to_sql(ty, out)
    } else if *ty == Type::FLOAT8 {
        (i as f64).to_sql(ty, out)
    } else if *ty == Type::FLOAT4 {
        (i as f32).to_sql(ty, out)
    } else if *ty == Type::NUMERIC {
        Decimal::from(i).to_sql(ty, out)
    } else if *ty == Type::BOOL {
        (i != 0).to_sql(ty, out)
    } else if *ty == Type::TIMESTAMP || *ty == Type::TIMESTAMPTZ {
        let dt = DateTime::<Utc>::from_timestamp(i, 0)
            .ok_or_else(|| format!("{i} is out of range for a timestamp"))?;
        Value::DateTimeUtc(dt).to_sql(ty, out)
    } else if is_textual(ty) {
        i.to_string().as_str().to_sql(ty, out)
    } else {
        Err(mismatch(&Value::Int(i), ty))
    }
}

fn float_to_sql(f: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if *ty == Type::FLOAT8 {
        f.to_sql(ty, out)
    } else if *ty == Type::FLOAT4 {
        (f as f32).to_sql(ty, out)
    } else if *ty == Type::NUMERIC {
        if !f.is_finite() {
            return Err(format!("{f} cannot be stored as numeric").into());
        }
        Decimal::from_str(&f.to_string())?.to_sql(ty, out)
    } else if is_textual(ty) {
        f.to_string().as_str().to_sql(ty, out)
    } else {
        Err(mismatch(&Value::Float(f), ty))
    }
}

fn text_to_sql(s: &str, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    if is_textual(ty) {
        return s.to_sql(ty, out);
    }
    let trimmed = s.trim();
    if *ty == Type::INT2 || *ty == Type::INT4 || *ty == Type::INT8 || *ty == Type::OID {
        int_to_sql(trimmed.parse::<i64>()?, ty, out)
    } else if *ty == Type::FLOAT4 || *ty == Type::FLOAT8 {
        float_to_sql(trimmed.parse::<f64>()?, ty, out)
    } else if *ty == Type::NUMERIC {
        Decimal::from_str(trimmed)?.to_sql(ty, out)
    } else if *ty == Type::BOOL {
        match trimmed.to_ascii_lowercase().as_str() {
            "t" | "true" | "1" | "y" | "yes" | "on" => true.to_sql(ty, out),
            "f" | "false" | "0" | "n" | "no" | "off" | "" => false.to_sql(ty, out),
            _ => Err(format!("\"{s}\" is not a boolean").into()),
        }
    } else if *ty == Type::TIMESTAMP {
        parse_datetime(trimmed)
            .ok_or_else(|| format!("\"{s}\" is not a timestamp"))?
            .to_sql(ty, out)
    } else if *ty == Type::TIMESTAMPTZ {
        parse_datetime_utc(trimmed)
            .ok_or_else(|| format!("\"{s}\" is not a timestamp"))?
            .to_sql(ty, out)
    } else if *ty == Type::DATE {
        parse_date(trimmed)
            .ok_or_else(|| format!("\"{s}\" is not a date"))?
            .to_sql(ty, out)
    } else if *ty == Type::UUID {
        uuid::Uuid::parse_str(trimmed)?.to_sql(ty, out)
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        serde_json::from_str::<serde_json::Value>(s)?.to_sql(ty, out)
    } else {
        Err(mismatch(&Value::Text(s.to_string()), ty))
    }
}

/// A `numeric` column. NaN and the infinities have no decimal form.
struct Numeric(Decimal);

impl<'a> FromSql<'a> for Numeric {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        let special = match raw.get(4..6) {
            Some([0xC0, 0x00]) => Some("NaN"),
            Some([0xD0, 0x00]) => Some("Infinity"),
            Some([0xF0, 0x00]) => Some("-Infinity"),
            _ => None,
        };
        if let Some(special) = special {
            return Err(format!("numeric {special} cannot be represented as a decimal").into());
        }
        Decimal::from_sql(ty, raw).map(Numeric)
    }

    fn accepts(ty: &Type) -> bool {
        *ty == Type::NUMERIC
    }
}

/// Label of a Postgres enum (or any text-encoded value).
struct EnumLabel(String);

impl<'a> FromSql<'a> for EnumLabel {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        Ok(EnumLabel(std::str::from_utf8(raw)?.to_owned()))
    }

    fn accepts(ty: &Type) -> bool {
        matches!(ty.kind(), Kind::Enum(_))
    }
}

/// Decode a driver row into a [`Row`].
///
/// Numeric, uuid and json columns come back as text.
pub(crate) fn decode_row(row: &tokio_postgres::Row) -> OrmResult<Row> {
    let mut out = Row::new();
    for (idx, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let value = decode_column(row, idx, column.type_())
            .map_err(|e| OrmError::decode(name, e.to_string()))?;
        out.insert(name, value);
    }
    Ok(out)
}

fn decode_column(row: &tokio_postgres::Row, idx: usize, ty: &Type) -> Result<Value, BoxError> {
    fn get<'a, T: FromSql<'a>>(row: &'a tokio_postgres::Row, idx: usize) -> Result<Option<T>, BoxError> {
        row.try_get::<_, Option<T>>(idx).map_err(Into::into)
    }

    let value = if *ty == Type::BOOL {
        get::<bool>(row, idx)?.map(Value::Bool)
    } else if *ty == Type::INT2 {
        get::<i16>(row, idx)?.map(Value::from)
    } else if *ty == Type::INT4 {
        get::<i32>(row, idx)?.map(Value::from)
    } else if *ty == Type::INT8 {
        get::<i64>(row, idx)?.map(Value::Int)
    } else if *ty == Type::OID {
        get::<u32>(row, idx)?.map(Value::from)
    } else if *ty == Type::FLOAT4 {
        get::<f32>(row, idx)?.map(Value::from)
    } else if *ty == Type::FLOAT8 {
        get::<f64>(row, idx)?.map(Value::Float)
    } else if *ty == Type::NUMERIC {
        get::<Numeric>(row, idx)?.map(|n| Value::Text(n.0.to_string()))
    } else if *ty == Type::TEXT
        || *ty == Type::VARCHAR
        || *ty == Type::BPCHAR
        || *ty == Type::NAME
        || *ty == Type::UNKNOWN
    {
        get::<String>(row, idx)?.map(Value::Text)
    } else if *ty == Type::TIMESTAMP {
        get::<NaiveDateTime>(row, idx)?.map(Value::DateTime)
    } else if *ty == Type::TIMESTAMPTZ {
        get::<DateTime<Utc>>(row, idx)?.map(Value::DateTimeUtc)
    } else if *ty == Type::DATE {
        get::<NaiveDate>(row, idx)?.map(Value::Date)
    } else if *ty == Type::UUID {
        get::<uuid::Uuid>(row, idx)?.map(|u| Value::Text(u.to_string()))
    } else if *ty == Type::JSON || *ty == Type::JSONB {
        get::<serde_json::Value>(row, idx)?.map(|j| Value::Text(j.to_string()))
    } else if matches!(ty.kind(), Kind::Enum(_)) {
        get::<EnumLabel>(row, idx)?.map(|l| Value::Text(l.0))
    } else {
        return Err(format!("unsupported column type {ty}").into());
    };
    Ok(value.unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_roundtrip(value: Value) -> String {
        let mut buf = BytesMut::new();
        value.to_sql(&Type::NUMERIC, &mut buf).unwrap();
        Numeric::from_sql(&Type::NUMERIC, &buf).unwrap().0.to_string()
    }

    #[test]
    fn numeric_text_is_preserved() {
        assert_eq!(numeric_roundtrip("12345.678".into()), "12345.678");
        assert_eq!(numeric_roundtrip("-0.0001".into()), "-0.0001");
        assert_eq!(numeric_roundtrip("19.90".into()), "19.90");
        assert_eq!(numeric_roundtrip("100000000.00000001".into()), "100000000.00000001");
        assert_eq!(numeric_roundtrip(Value::Int(10_000)), "10000");
        assert_eq!(numeric_roundtrip(Value::Float(2.5)), "2.5");
    }

    #[test]
    fn numeric_rejects_garbage() {
        let mut buf = BytesMut::new();
        assert!(Value::from("abc").to_sql(&Type::NUMERIC, &mut buf).is_err());
        assert!(Value::from("").to_sql(&Type::NUMERIC, &mut buf).is_err());
        assert!(Value::Float(f64::NAN).to_sql(&Type::NUMERIC, &mut buf).is_err());
    }

    #[test]
    fn numeric_specials_fail_to_decode() {
        // ndigits, weight, sign, dscale
        let pos_inf = [0u8, 0, 0, 0, 0xD0, 0x00, 0, 0];
        let neg_inf = [0u8, 0, 0, 0, 0xF0, 0x00, 0, 0];
        let nan = [0u8, 0, 0, 0, 0xC0, 0x00, 0, 0];
        for raw in [pos_inf, neg_inf, nan] {
            assert!(Numeric::from_sql(&Type::NUMERIC, &raw).is_err());
        }
    }

    #[test]
    fn text_adapts_to_parameter_type() {
        let mut buf = BytesMut::new();
        Value::from("42").to_sql(&Type::INT4, &mut buf).unwrap();
        assert_eq!(&buf[..], &42i32.to_be_bytes());

        let mut buf = BytesMut::new();
        assert!(Value::from("abc").to_sql(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn int_width_is_checked() {
        let mut buf = BytesMut::new();
        assert!(Value::Int(70_000).to_sql(&Type::INT2, &mut buf).is_err());
        let mut buf = BytesMut::new();
        Value::Int(7).to_sql(&Type::INT2, &mut buf).unwrap();
        assert_eq!(&buf[..], &7i16.to_be_bytes());
    }

    #[test]
    fn null_binds_as_null() {
        let mut buf = BytesMut::new();
        assert!(matches!(Value::Null.to_sql(&Type::TEXT, &mut buf).unwrap(), IsNull::Yes));
    }
}
