//! Static DTO descriptors.
//!
//! A DTO is a plain struct whose mapped properties are [`Field<T>`]. The
//! [`Dto`] trait (normally produced by `#[derive(Dto)]`) exposes the declared
//! properties, their types, and untyped get/set access so the hydrator and
//! extractor can work without reflection.

use crate::error::OrmResult;
use crate::value::{Backing, DtoValue, EnumValue, Value};

/// A DTO property that may not have been assigned yet.
///
/// `Unset` properties are skipped on extraction, so they never show up in
/// generated SQL. Nullable properties are `Field<Option<T>>`, where
/// `Set(None)` is an explicit NULL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field<T> {
    Unset,
    Set(T),
}

impl<T> Default for Field<T> {
    fn default() -> Self {
        Field::Unset
    }
}

impl<T> From<T> for Field<T> {
    fn from(value: T) -> Self {
        Field::Set(value)
    }
}

impl<T> Field<T> {
    pub fn is_set(&self) -> bool {
        matches!(self, Field::Set(_))
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Field::Unset)
    }

    pub fn get(&self) -> Option<&T> {
        match self {
            Field::Set(v) => Some(v),
            Field::Unset => None,
        }
    }

    pub fn set(&mut self, value: T) {
        *self = Field::Set(value);
    }

    /// Take the value out, leaving the field unset.
    pub fn take(&mut self) -> Option<T> {
        match std::mem::take(self) {
            Field::Set(v) => Some(v),
            Field::Unset => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Field::Set(v) => Some(v),
            Field::Unset => None,
        }
    }

    pub fn as_ref(&self) -> Field<&T> {
        match self {
            Field::Set(v) => Field::Set(v),
            Field::Unset => Field::Unset,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Field<U> {
        match self {
            Field::Set(v) => Field::Set(f(v)),
            Field::Unset => Field::Unset,
        }
    }
}

impl<T> Field<Option<T>> {
    /// The inner value of a nullable field, flattening unset and NULL.
    pub fn value(&self) -> Option<&T> {
        self.get().and_then(Option::as_ref)
    }
}

/// Declared type of a DTO property.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// A named type resolved through the type-caster registry.
    Named { name: &'static str, nullable: bool },
    /// No declared type: the raw value is assigned as-is.
    Mixed,
    /// Several admissible types: the raw value is assigned uncast.
    Union(&'static [&'static str]),
}

impl FieldType {
    pub const fn named(name: &'static str) -> Self {
        FieldType::Named {
            name,
            nullable: false,
        }
    }

    pub const fn nullable(self) -> Self {
        match self {
            FieldType::Named { name, .. } => FieldType::Named {
                name,
                nullable: true,
            },
            other => other,
        }
    }

    /// Type descriptor as understood by the casters (`?` prefix when nullable).
    pub fn descriptor(&self) -> String {
        match self {
            FieldType::Named {
                name,
                nullable: true,
            } => format!("?{name}"),
            FieldType::Named { name, .. } => (*name).to_string(),
            FieldType::Mixed => "mixed".to_string(),
            FieldType::Union(names) => names.join("|"),
        }
    }
}

/// One declared property of a DTO.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
}

impl FieldDef {
    pub const fn new(name: &'static str, ty: FieldType) -> Self {
        Self { name, ty }
    }
}

/// Static description of a DTO type.
///
/// Usually derived:
///
/// ```ignore
/// use rowcast::{Dto, Field};
///
/// #[derive(Debug, Dto)]
/// #[orm(table = "users")]
/// struct User {
///     id: Field<i64>,
///     name: Field<String>,
///     email: Field<Option<String>>,
/// }
/// ```
pub trait Dto: Sized {
    /// Unqualified type name.
    const SHORT_NAME: &'static str;

    /// Explicit table name (`#[orm(table = "...")]`).
    const TABLE: Option<&'static str> = None;

    /// Mapped properties in declaration order.
    const FIELDS: &'static [FieldDef];

    /// An instance with every mapped property unset.
    fn blank() -> Self;

    /// Current state of a property as a [`Value`]; `None` if no such property.
    fn get_field(&self, property: &str) -> Option<Field<Value>>;

    /// Assign an already-cast value to a property.
    fn set_field(&mut self, property: &str, value: Value) -> OrmResult<()>;

    fn field_def(property: &str) -> Option<&'static FieldDef> {
        Self::FIELDS.iter().find(|def| def.name == property)
    }

    fn has_property(property: &str) -> bool {
        Self::field_def(property).is_some()
    }
}

/// A string- or int-backed enum (`#[derive(BackedEnum)]`).
pub trait BackedEnum: Copy + DtoValue + 'static {
    /// Type descriptor used by the enum caster.
    const TYPE_NAME: &'static str;

    /// Every member as `(variant name, backing value)`.
    const CASES: &'static [(&'static str, Backing)];

    fn backing(&self) -> Backing;

    fn from_backing(backing: Backing) -> Option<Self>;

    /// Look a raw database value up among the backing values.
    fn try_from_value(value: &Value) -> Option<Self> {
        Self::CASES
            .iter()
            .find(|(_, backing)| backing.matches(value))
            .and_then(|(_, backing)| Self::from_backing(*backing))
    }

    fn registration() -> EnumRegistration {
        EnumRegistration::new(Self::TYPE_NAME, Self::CASES)
    }
}

/// Runtime description of a backed enum, consumed by the enum type caster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumRegistration {
    pub type_name: &'static str,
    pub cases: &'static [(&'static str, Backing)],
}

impl EnumRegistration {
    pub const fn new(type_name: &'static str, cases: &'static [(&'static str, Backing)]) -> Self {
        Self { type_name, cases }
    }

    /// The member a raw value denotes, if any.
    pub fn resolve(&self, value: &Value) -> Option<EnumValue> {
        self.cases
            .iter()
            .find(|(_, backing)| backing.matches(value))
            .map(|(variant, backing)| EnumValue {
                type_name: self.type_name,
                variant,
                backing: *backing,
            })
    }
}

inventory::collect!(EnumRegistration);

/// Find an auto-registered enum by its type descriptor.
pub fn find_enum_registration(type_name: &str) -> Option<&'static EnumRegistration> {
    inventory::iter::<EnumRegistration>
        .into_iter()
        .find(|reg| reg.type_name == type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_tri_state() {
        let unset: Field<Option<String>> = Field::Unset;
        let null: Field<Option<String>> = Field::Set(None);
        let nick: Field<Option<String>> = Field::Set(Some("neo".into()));

        assert!(unset.is_unset());
        assert!(null.is_set());
        assert_eq!(null.value(), None);
        assert_eq!(nick.value().map(String::as_str), Some("neo"));
    }

    #[test]
    fn field_take_leaves_unset() {
        let mut f = Field::Set(3);
        assert_eq!(f.take(), Some(3));
        assert!(f.is_unset());
    }

    #[test]
    fn union_descriptor() {
        let ty = FieldType::Union(&["int", "string"]);
        assert_eq!(ty.descriptor(), "int|string");
        assert_eq!(ty.nullable(), ty);
    }

    #[test]
    fn registration_resolves_backing() {
        const CASES: &[(&str, Backing)] = &[("Low", Backing::Int(1)), ("High", Backing::Int(9))];
        let reg = EnumRegistration::new("tests::Priority", CASES);

        let v = reg.resolve(&Value::Text("9".into())).unwrap();
        assert_eq!(v.variant, "High");
        assert!(reg.resolve(&Value::Int(5)).is_none());
    }
}
