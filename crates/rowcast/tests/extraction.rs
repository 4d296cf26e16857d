mod common;

use chrono::{NaiveDate, NaiveDateTime};
use common::{DtoWithEnum, Priority, SimpleUser, UserStatus, UserWithDates, simple_user};
use rowcast::{
    Dto, DtoExtractor, Field, Hydrator, IdentityConverter, MapperConfig, ResultSetMapping, Row,
    Value, ValueConverterRegistry,
};

fn created() -> NaiveDateTime {
    NaiveDateTime::parse_from_str("2024-01-15 10:30:00", "%Y-%m-%d %H:%M:%S").unwrap()
}

#[test]
fn unset_fields_are_skipped_and_null_is_kept() {
    let mut user = simple_user("Alice", true);
    user.email.set(None);

    let data = DtoExtractor::default().extract(&user, None).unwrap();

    let columns: Vec<_> = data.keys().map(String::as_str).collect();
    assert_eq!(columns, ["name", "email", "active"]);
    assert_eq!(data["name"], Value::from("Alice"));
    assert_eq!(data["email"], Value::Null);
    assert_eq!(data["active"], Value::Int(1));
}

#[test]
fn blank_dto_extracts_nothing() {
    let data = DtoExtractor::default()
        .extract(&SimpleUser::blank(), None)
        .unwrap();
    assert!(data.is_empty());
}

#[test]
fn property_names_become_snake_case_columns() {
    let mut user = UserWithDates::blank();
    user.created_at.set(created());
    user.birthday.set(NaiveDate::from_ymd_opt(1990, 5, 1));

    let data = DtoExtractor::default().extract(&user, None).unwrap();

    assert_eq!(data["created_at"], Value::from("2024-01-15 10:30:00"));
    assert_eq!(data["birthday"], Value::from("1990-05-01"));
}

#[test]
fn identity_naming_keeps_property_names() {
    let extractor = DtoExtractor::new(IdentityConverter, ValueConverterRegistry::with_defaults());
    let mut user = UserWithDates::blank();
    user.created_at.set(created());

    let data = extractor.extract(&user, None).unwrap();
    assert!(data.contains_key("createdAt"));
}

#[test]
fn custom_formats_from_config() {
    let extractor = MapperConfig::new()
        .with_datetime_format("%d/%m/%Y %H:%M")
        .with_date_format("%Y%m%d")
        .extractor()
        .unwrap();
    let mut user = UserWithDates::blank();
    user.created_at.set(created());
    user.birthday.set(NaiveDate::from_ymd_opt(1990, 5, 1));

    let data = extractor.extract(&user, None).unwrap();
    assert_eq!(data["created_at"], Value::from("15/01/2024 10:30"));
    assert_eq!(data["birthday"], Value::from("19900501"));
}

#[test]
fn invalid_format_is_rejected_up_front() {
    let err = MapperConfig::new()
        .with_datetime_format("%Y-%Q")
        .extractor()
        .unwrap_err();
    assert!(err.is_logic());
}

#[test]
fn enums_become_backing_scalars() {
    let mut task = DtoWithEnum::blank();
    task.status.set(UserStatus::Banned);
    task.priority.set(Some(Priority::Low));

    let data = DtoExtractor::default().extract(&task, None).unwrap();
    assert_eq!(data["status"], Value::from("banned"));
    assert_eq!(data["priority"], Value::Int(1));
}

#[test]
fn mapping_mode_uses_mapping_columns_and_order() {
    let rsm = ResultSetMapping::<SimpleUser>::with_table("custom_users")
        .field("usr_active", "active")
        .field("usr_nm", "name")
        .field("usr_id", "id")
        .field("usr_nick", "nickname");
    let user = simple_user("Bob", false);

    let data = DtoExtractor::default().extract(&user, Some(&rsm)).unwrap();

    // `id` is unset and `nickname` is not a property: both skipped.
    let columns: Vec<_> = data.keys().map(String::as_str).collect();
    assert_eq!(columns, ["usr_active", "usr_nm"]);
    assert_eq!(data["usr_active"], Value::Int(0));
}

#[test]
fn extract_then_hydrate_round_trip() {
    let mut user = simple_user("Carol", true);
    user.id.set(5);
    user.email.set(Some("carol@example.com".to_string()));

    let data = DtoExtractor::default().extract(&user, None).unwrap();
    let row: Row = data.into();
    let back: SimpleUser = Hydrator::default().hydrate(&row, None).unwrap();

    assert_eq!(back.id, Field::Set(5));
    assert_eq!(back.name, user.name);
    assert_eq!(back.email, user.email);
    assert_eq!(back.active, Field::Set(true));
}
