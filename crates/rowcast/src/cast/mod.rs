//! Type casting for reads: raw row values → values of a declared type.
//!
//! Casters are keyed by a type descriptor (`"int"`, `"datetime"`, an enum's
//! type name, ...). A leading `?` marks the descriptor nullable.

mod datetime;
mod enumeration;
mod scalar;

pub use datetime::DateTimeTypeCaster;
pub use enumeration::EnumTypeCaster;
pub use scalar::ScalarTypeCaster;

pub(crate) use datetime::{parse_date, parse_datetime, parse_datetime_utc};

use crate::error::{OrmError, OrmResult};
use crate::value::Value;

/// Marks a nullable type descriptor.
pub const NULLABLE_MARKER: char = '?';

/// Converts raw values to a declared type.
pub trait TypeCaster: Send + Sync {
    fn supports(&self, type_name: &str) -> bool;

    fn cast(&self, value: Value, type_name: &str) -> OrmResult<Value>;
}

/// Split a descriptor into `(nullable, base type)`.
pub fn split_nullable(type_name: &str) -> (bool, &str) {
    let base = type_name.trim_start_matches(NULLABLE_MARKER);
    (base.len() != type_name.len(), base)
}

/// Ordered chain of casters; the first one supporting the base type wins.
pub struct TypeCasterRegistry {
    casters: Vec<Box<dyn TypeCaster>>,
}

impl std::fmt::Debug for TypeCasterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeCasterRegistry")
            .field("casters", &self.casters.len())
            .finish()
    }
}

impl Default for TypeCasterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl TypeCasterRegistry {
    pub fn new() -> Self {
        Self {
            casters: Vec::new(),
        }
    }

    /// Scalar, date/time and enum casters.
    pub fn with_defaults() -> Self {
        Self::new()
            .with_caster(ScalarTypeCaster)
            .with_caster(DateTimeTypeCaster)
            .with_caster(EnumTypeCaster::new())
    }

    pub fn with_caster(mut self, caster: impl TypeCaster + 'static) -> Self {
        self.add_caster(caster);
        self
    }

    pub fn add_caster(&mut self, caster: impl TypeCaster + 'static) -> &mut Self {
        self.casters.push(Box::new(caster));
        self
    }

    fn find(&self, base: &str) -> Option<&dyn TypeCaster> {
        self.casters
            .iter()
            .find(|c| c.supports(base))
            .map(|c| c.as_ref())
    }
}

impl TypeCaster for TypeCasterRegistry {
    fn supports(&self, type_name: &str) -> bool {
        let (_, base) = split_nullable(type_name);
        self.find(base).is_some()
    }

    fn cast(&self, value: Value, type_name: &str) -> OrmResult<Value> {
        let (nullable, base) = split_nullable(type_name);
        if nullable && value.is_null() {
            return Ok(Value::Null);
        }
        match self.find(base) {
            Some(caster) => caster.cast(value, base),
            None => Err(OrmError::cast(format!(
                "No type caster registered for type \"{base}\""
            ))),
        }
    }
}
