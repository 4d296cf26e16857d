mod common;

use common::{AllScalarsDto, DtoWithEnum, Priority, SimpleUser, UserStatus, UserWithDates};
use rowcast::dto::find_enum_registration;
use rowcast::{BackedEnum, Backing, Dto, DtoValue, Field, FieldType, Value};

#[test]
fn fields_are_described_in_declaration_order() {
    let names: Vec<_> = SimpleUser::FIELDS.iter().map(|f| f.name).collect();
    assert_eq!(names, ["id", "name", "email", "active"]);

    let email = SimpleUser::field_def("email").unwrap();
    assert_eq!(email.ty.descriptor(), "?string");
    assert_eq!(SimpleUser::field_def("id").unwrap().ty.descriptor(), "int");
    assert!(!SimpleUser::has_property("nickname"));
}

#[test]
fn table_and_short_name() {
    assert_eq!(SimpleUser::SHORT_NAME, "SimpleUser");
    assert_eq!(SimpleUser::TABLE, None);
    assert_eq!(UserWithDates::TABLE, Some("users"));
}

#[test]
fn rename_changes_property_name() {
    assert!(UserWithDates::has_property("createdAt"));
    assert!(!UserWithDates::has_property("created_at"));
    assert_eq!(
        UserWithDates::field_def("createdAt").unwrap().ty,
        FieldType::named("datetime")
    );
}

#[test]
fn skipped_and_untyped_fields() {
    assert!(!AllScalarsDto::has_property("scratch"));
    assert_eq!(
        AllScalarsDto::field_def("reference").unwrap().ty,
        FieldType::Union(&["int", "string"])
    );
    assert_eq!(
        AllScalarsDto::field_def("anything").unwrap().ty,
        FieldType::Mixed
    );
}

#[test]
fn blank_leaves_everything_unset() {
    let user = SimpleUser::blank();
    assert!(user.id.is_unset());
    assert_eq!(user.get_field("id"), Some(Field::Unset));
    assert_eq!(user.get_field("nickname"), None);
}

#[test]
fn get_and_set_field() {
    let mut user = SimpleUser::blank();
    user.set_field("name", Value::from("Neo")).unwrap();
    user.set_field("email", Value::Null).unwrap();

    assert_eq!(user.name, Field::Set("Neo".to_string()));
    assert_eq!(user.email, Field::Set(None));
    assert_eq!(user.get_field("email"), Some(Field::Set(Value::Null)));

    let err = user.set_field("nickname", Value::Null).unwrap_err();
    assert!(err.is_logic());
    // Values reaching set_field are already cast.
    assert!(user.set_field("id", Value::from("1")).is_err());
}

#[test]
fn string_backed_enum_defaults_to_snake_case() {
    assert_eq!(UserStatus::Active.backing(), Backing::Str("active"));
    assert_eq!(UserStatus::CASES.len(), 3);
    assert_eq!(
        UserStatus::from_backing(Backing::Str("banned")),
        Some(UserStatus::Banned)
    );
    assert_eq!(UserStatus::from_backing(Backing::Str("gone")), None);
    assert!(UserStatus::TYPE_NAME.ends_with("::UserStatus"));
}

#[test]
fn int_backed_enum() {
    assert_eq!(Priority::TYPE_NAME, "priority");
    assert_eq!(Priority::High.backing(), Backing::Int(2));
    assert_eq!(Priority::try_from_value(&Value::from("1")), Some(Priority::Low));
    assert_eq!(Priority::try_from_value(&Value::Int(3)), None);
}

#[test]
fn enum_values_round_trip_through_value() {
    let value = UserStatus::Inactive.to_value();
    assert!(matches!(value, Value::Enum(e) if e.variant == "Inactive"));
    assert_eq!(UserStatus::from_value(value).unwrap(), UserStatus::Inactive);
    assert_eq!(UserStatus::from_value(Value::from("banned")).unwrap(), UserStatus::Banned);
    assert!(UserStatus::from_value(Value::from("deleted")).unwrap_err().is_cast());
    assert!(UserStatus::from_value(Priority::Low.to_value()).is_err());
}

#[test]
fn enums_register_themselves() {
    let reg = find_enum_registration(Priority::TYPE_NAME).unwrap();
    assert_eq!(reg.cases, Priority::CASES);
    assert!(find_enum_registration(UserStatus::TYPE_NAME).is_some());
    assert_eq!(
        <Option<Priority> as DtoValue>::TYPE,
        FieldType::named("priority").nullable()
    );
    assert!(DtoWithEnum::has_property("priority"));
}
