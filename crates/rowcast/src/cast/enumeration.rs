use super::TypeCaster;
use crate::dto::{BackedEnum, EnumRegistration, find_enum_registration};
use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// Casts raw ints/strings to members of backed enums.
///
/// Enums deriving `BackedEnum` register themselves; others can be added with
/// [`EnumTypeCaster::register`]. A raw value outside the enum's backing values
/// is an error, never a fallback member.
#[derive(Debug, Clone)]
pub struct EnumTypeCaster {
    registered: Vec<EnumRegistration>,
    auto_registered: bool,
}

impl Default for EnumTypeCaster {
    fn default() -> Self {
        Self::new()
    }
}

impl EnumTypeCaster {
    /// Caster that sees every auto-registered enum.
    pub fn new() -> Self {
        Self {
            registered: Vec::new(),
            auto_registered: true,
        }
    }

    /// Caster that only sees explicitly registered enums.
    pub fn explicit() -> Self {
        Self {
            registered: Vec::new(),
            auto_registered: false,
        }
    }

    pub fn register<E: BackedEnum>(mut self) -> Self {
        self.registered.push(E::registration());
        self
    }

    pub fn with_registration(mut self, registration: EnumRegistration) -> Self {
        self.registered.push(registration);
        self
    }

    fn lookup(&self, type_name: &str) -> Option<EnumRegistration> {
        self.registered
            .iter()
            .find(|reg| reg.type_name == type_name)
            .copied()
            .or_else(|| {
                self.auto_registered
                    .then(|| find_enum_registration(type_name).copied())
                    .flatten()
            })
    }
}

impl TypeCaster for EnumTypeCaster {
    fn supports(&self, type_name: &str) -> bool {
        self.lookup(type_name).is_some()
    }

    fn cast(&self, value: Value, type_name: &str) -> OrmResult<Value> {
        let reg = self
            .lookup(type_name)
            .ok_or_else(|| OrmError::cast(format!("\"{type_name}\" is not a registered enum")))?;

        match value {
            Value::Enum(e) if e.type_name == reg.type_name => Ok(Value::Enum(e)),
            Value::Enum(e) => Err(OrmError::cast(format!(
                "{}::{} is not a member of {}",
                e.type_name, e.variant, reg.type_name
            ))),
            raw @ (Value::Int(_) | Value::Text(_)) => reg
                .resolve(&raw)
                .map(Value::Enum)
                .ok_or_else(|| {
                    OrmError::cast(format!(
                        "{raw} is not a valid backing value for enum {}",
                        reg.type_name
                    ))
                }),
            other => Err(OrmError::cast(format!(
                "enum {} expects an int or string backing value, got {}",
                reg.type_name,
                other.kind()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Backing, EnumValue};

    const STATUS: EnumRegistration = EnumRegistration::new(
        "tests::UserStatus",
        &[
            ("Active", Backing::Str("active")),
            ("Inactive", Backing::Str("inactive")),
            ("Banned", Backing::Str("banned")),
        ],
    );

    fn caster() -> EnumTypeCaster {
        EnumTypeCaster::explicit().with_registration(STATUS)
    }

    #[test]
    fn resolves_backing_value() {
        let v = caster().cast("inactive".into(), "tests::UserStatus").unwrap();
        assert_eq!(
            v,
            Value::Enum(EnumValue {
                type_name: "tests::UserStatus",
                variant: "Inactive",
                backing: Backing::Str("inactive"),
            })
        );
    }

    #[test]
    fn unknown_backing_value_errors() {
        let err = caster()
            .cast("deleted".into(), "tests::UserStatus")
            .unwrap_err();
        assert!(err.is_cast());
        assert!(err.to_string().contains("\"deleted\""));
    }

    #[test]
    fn existing_member_passes_through() {
        let member = Value::Enum(EnumValue {
            type_name: "tests::UserStatus",
            variant: "Banned",
            backing: Backing::Str("banned"),
        });
        assert_eq!(
            caster().cast(member.clone(), "tests::UserStatus").unwrap(),
            member
        );
    }

    #[test]
    fn only_registered_types_supported() {
        assert!(caster().supports("tests::UserStatus"));
        assert!(!caster().supports("tests::Other"));
        assert!(!EnumTypeCaster::explicit().supports("tests::UserStatus"));
    }
}
