//! Result rows.

use crate::error::{OrmError, OrmResult};
use crate::value::{DtoValue, Value};
use indexmap::IndexMap;

/// One result row: column name → value, in select order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: IndexMap<String, Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Row::insert`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Typed access to a column that already holds the right kind of value.
    pub fn try_get<T: DtoValue>(&self, column: &str) -> OrmResult<T> {
        let value = self
            .columns
            .get(column)
            .ok_or_else(|| OrmError::decode(column, "no such column"))?;
        T::from_value(value.clone()).map_err(|e| OrmError::decode(column, e.to_string()))
    }

    pub fn contains_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Value of the first column.
    pub fn first(&self) -> Option<&Value> {
        self.columns.get_index(0).map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn into_inner(self) -> IndexMap<String, Value> {
        self.columns
    }
}

impl From<IndexMap<String, Value>> for Row {
    fn from(columns: IndexMap<String, Value>) -> Self {
        Self { columns }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}
