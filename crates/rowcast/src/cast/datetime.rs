use super::TypeCaster;
use crate::error::{OrmError, OrmResult};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Casts to `datetime` (naive), `datetime_utc` and `date`.
///
/// Text is parsed (`2024-01-15 10:30:00`, ISO-8601 with `T`, fractional
/// seconds, RFC 3339 offsets); integers are Unix timestamps. Naive values are
/// taken to be UTC when converting between naive and UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeTypeCaster;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%#z", "%Y-%m-%d %H:%M:%S%.f%#z"];

/// Parse a timestamp, dropping any offset after converting to UTC.
pub(crate) fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| parse_with_offset(s).map(|dt| dt.naive_utc()))
        .or_else(|| parse_date(s).map(|d| d.and_time(NaiveTime::MIN)))
}

pub(crate) fn parse_datetime_utc(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    parse_with_offset(s).or_else(|| parse_datetime(s).map(|dt| dt.and_utc()))
}

pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

fn parse_with_offset(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        })
        .map(|dt| dt.with_timezone(&Utc))
}

fn from_timestamp(secs: i64) -> OrmResult<DateTime<Utc>> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| OrmError::cast(format!("timestamp {secs} is out of range")))
}

fn unparseable(s: &str, type_name: &str) -> OrmError {
    OrmError::cast(format!("\"{s}\" is not a valid {type_name}"))
}

impl TypeCaster for DateTimeTypeCaster {
    fn supports(&self, type_name: &str) -> bool {
        matches!(type_name, "datetime" | "datetime_utc" | "date")
    }

    fn cast(&self, value: Value, type_name: &str) -> OrmResult<Value> {
        match (type_name, value) {
            ("datetime", Value::DateTime(v)) => Ok(Value::DateTime(v)),
            ("datetime", Value::DateTimeUtc(v)) => Ok(Value::DateTime(v.naive_utc())),
            ("datetime", Value::Date(d)) => Ok(Value::DateTime(d.and_time(NaiveTime::MIN))),
            ("datetime", Value::Int(secs)) => from_timestamp(secs).map(|v| Value::DateTime(v.naive_utc())),
            ("datetime", Value::Text(s)) => parse_datetime(&s)
                .map(Value::DateTime)
                .ok_or_else(|| unparseable(&s, type_name)),

            ("datetime_utc", Value::DateTimeUtc(v)) => Ok(Value::DateTimeUtc(v)),
            ("datetime_utc", Value::DateTime(v)) => Ok(Value::DateTimeUtc(v.and_utc())),
            ("datetime_utc", Value::Date(d)) => {
                Ok(Value::DateTimeUtc(d.and_time(NaiveTime::MIN).and_utc()))
            }
            ("datetime_utc", Value::Int(secs)) => from_timestamp(secs).map(Value::DateTimeUtc),
            ("datetime_utc", Value::Text(s)) => parse_datetime_utc(&s)
                .map(Value::DateTimeUtc)
                .ok_or_else(|| unparseable(&s, type_name)),

            ("date", Value::Date(d)) => Ok(Value::Date(d)),
            ("date", Value::DateTime(v)) => Ok(Value::Date(v.date())),
            ("date", Value::DateTimeUtc(v)) => Ok(Value::Date(v.date_naive())),
            ("date", Value::Text(s)) => parse_date(&s)
                .or_else(|| parse_datetime(&s).map(|v| v.date()))
                .map(Value::Date)
                .ok_or_else(|| unparseable(&s, type_name)),

            (_, other) => Err(OrmError::cast(format!(
                "cannot cast {} to {type_name}",
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd_hms(y: i32, m: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, mi, s)
            .unwrap()
    }

    #[test]
    fn parses_database_text() {
        let expected = Value::DateTime(ymd_hms(2024, 1, 15, 10, 30, 0));
        for raw in [
            "2024-01-15 10:30:00",
            "2024-01-15T10:30:00",
            "2024-01-15 10:30:00.000",
            "2024-01-15T10:30:00Z",
            "2024-01-15 12:30:00+02",
        ] {
            assert_eq!(
                DateTimeTypeCaster.cast(raw.into(), "datetime").unwrap(),
                expected,
                "{raw}"
            );
        }
    }

    #[test]
    fn utc_from_naive_assumes_utc() {
        let naive = ymd_hms(2024, 1, 15, 10, 30, 0);
        assert_eq!(
            DateTimeTypeCaster
                .cast(Value::DateTime(naive), "datetime_utc")
                .unwrap(),
            Value::DateTimeUtc(naive.and_utc())
        );
        assert_eq!(
            DateTimeTypeCaster
                .cast("2024-01-15 10:30:00".into(), "datetime_utc")
                .unwrap(),
            Value::DateTimeUtc(naive.and_utc())
        );
    }

    #[test]
    fn same_type_passes_through() {
        let naive = ymd_hms(2023, 6, 1, 0, 0, 0);
        assert_eq!(
            DateTimeTypeCaster.cast(Value::DateTime(naive), "datetime").unwrap(),
            Value::DateTime(naive)
        );
    }

    #[test]
    fn dates() {
        let d = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(
            DateTimeTypeCaster.cast("2024-02-29".into(), "date").unwrap(),
            Value::Date(d)
        );
        assert_eq!(
            DateTimeTypeCaster
                .cast("2024-02-29 23:59:59".into(), "date")
                .unwrap(),
            Value::Date(d)
        );
    }

    #[test]
    fn unix_timestamps() {
        assert_eq!(
            DateTimeTypeCaster.cast(Value::Int(0), "datetime").unwrap(),
            Value::DateTime(ymd_hms(1970, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn rejects_garbage_and_null() {
        assert!(DateTimeTypeCaster
            .cast("yesterday".into(), "datetime")
            .unwrap_err()
            .is_cast());
        assert!(DateTimeTypeCaster
            .cast(Value::Null, "datetime")
            .unwrap_err()
            .is_cast());
        assert!(DateTimeTypeCaster
            .cast(Value::Bool(true), "date")
            .unwrap_err()
            .is_cast());
    }
}
