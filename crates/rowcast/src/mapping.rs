//! Explicit column ↔ property mappings.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Explicit mapping between result columns and the properties of `T`.
///
/// Used instead of name conversion when column names do not follow a
/// convention, and to supply a table name for write operations.
///
/// ```ignore
/// let rsm = ResultSetMapping::<User>::with_table("custom_users")
///     .field("usr_id", "id")
///     .field("usr_nm", "name");
/// ```
pub struct ResultSetMapping<T> {
    table: Option<String>,
    fields: IndexMap<String, String>,
    _marker: PhantomData<fn() -> T>,
}

/// Deserializable form of a [`ResultSetMapping`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsmConfig {
    #[serde(default)]
    pub table: Option<String>,
    /// Column → property, in mapping order.
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

impl<T> ResultSetMapping<T> {
    pub fn new() -> Self {
        Self {
            table: None,
            fields: IndexMap::new(),
            _marker: PhantomData,
        }
    }

    pub fn with_table(table: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            ..Self::new()
        }
    }

    pub fn from_config(config: RsmConfig) -> Self {
        Self {
            table: config.table,
            fields: config.fields,
            _marker: PhantomData,
        }
    }

    /// Map `column` to `property`. Re-adding a column replaces its property.
    pub fn add_field(&mut self, column: impl Into<String>, property: impl Into<String>) -> &mut Self {
        self.fields.insert(column.into(), property.into());
        self
    }

    /// Builder form of [`ResultSetMapping::add_field`].
    pub fn field(mut self, column: impl Into<String>, property: impl Into<String>) -> Self {
        self.add_field(column, property);
        self
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Column → property pairs in insertion order.
    pub fn fields(&self) -> &IndexMap<String, String> {
        &self.fields
    }

    /// Fully qualified name of the mapped type.
    pub fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    pub fn property_name(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Column mapped to `property`.
    ///
    /// When several columns map to the same property the one added last is
    /// returned.
    pub fn column_name(&self, property: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(_, prop)| prop.as_str() == property)
            .map(|(column, _)| column.as_str())
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn has_property(&self, property: &str) -> bool {
        self.fields.values().any(|prop| prop == property)
    }

    pub fn to_config(&self) -> RsmConfig {
        RsmConfig {
            table: self.table.clone(),
            fields: self.fields.clone(),
        }
    }
}

impl<T> Default for ResultSetMapping<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ResultSetMapping<T> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            fields: self.fields.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for ResultSetMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResultSetMapping")
            .field("type", &self.type_name())
            .field("table", &self.table)
            .field("fields", &self.fields)
            .finish()
    }
}

impl<T> From<RsmConfig> for ResultSetMapping<T> {
    fn from(config: RsmConfig) -> Self {
        Self::from_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct User;

    #[test]
    fn lookups() {
        let rsm = ResultSetMapping::<User>::with_table("custom_users")
            .field("usr_id", "id")
            .field("usr_nm", "name");

        assert_eq!(rsm.table(), Some("custom_users"));
        assert_eq!(rsm.property_name("usr_nm"), Some("name"));
        assert_eq!(rsm.column_name("id"), Some("usr_id"));
        assert!(rsm.has_column("usr_id"));
        assert!(!rsm.has_column("id"));
        assert!(rsm.has_property("name"));
        assert!(!rsm.has_property("email"));
        assert!(rsm.type_name().ends_with("User"));
    }

    #[test]
    fn reverse_lookup_last_added_wins() {
        let mut rsm = ResultSetMapping::<User>::new();
        rsm.add_field("a", "name").add_field("b", "name");
        assert_eq!(rsm.column_name("name"), Some("b"));
    }

    #[test]
    fn insertion_order_kept() {
        let rsm = ResultSetMapping::<User>::new()
            .field("z", "last")
            .field("a", "first");
        let columns: Vec<_> = rsm.fields().keys().map(String::as_str).collect();
        assert_eq!(columns, ["z", "a"]);
    }

    #[test]
    fn from_json_config() {
        let config: RsmConfig = serde_json::from_str(
            r#"{"table": "users", "fields": {"user_id": "id", "user_name": "name"}}"#,
        )
        .unwrap();
        let rsm = ResultSetMapping::<User>::from_config(config);

        assert_eq!(rsm.table(), Some("users"));
        assert_eq!(rsm.property_name("user_id"), Some("id"));
        assert_eq!(rsm.to_config().fields.len(), 2);
    }

    #[test]
    fn config_without_table() {
        let config: RsmConfig = serde_json::from_str(r#"{"fields": {"x": "y"}}"#).unwrap();
        let rsm: ResultSetMapping<User> = config.into();
        assert_eq!(rsm.table(), None);
    }
}
