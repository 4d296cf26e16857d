//! DTO → column values.

use crate::convert::{ValueConverter, ValueConverterRegistry};
use crate::dto::{Dto, Field};
use crate::error::OrmResult;
use crate::mapping::ResultSetMapping;
use crate::naming::{NameConverter, SnakeCaseConverter};
use crate::value::Value;
use indexmap::IndexMap;
use std::sync::Arc;

/// Column → database-ready value, in mapping order.
pub type ColumnValues = IndexMap<String, Value>;

/// Reads the set properties of a DTO into column values.
///
/// Unset properties are skipped. An explicit `None` is kept as
/// [`Value::Null`].
#[derive(Clone)]
pub struct DtoExtractor {
    name_converter: Arc<dyn NameConverter>,
    value_converter: Arc<dyn ValueConverter>,
}

impl Default for DtoExtractor {
    fn default() -> Self {
        Self::new(SnakeCaseConverter, ValueConverterRegistry::with_defaults())
    }
}

impl std::fmt::Debug for DtoExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DtoExtractor").finish_non_exhaustive()
    }
}

impl DtoExtractor {
    pub fn new(
        name_converter: impl NameConverter + 'static,
        value_converter: impl ValueConverter + 'static,
    ) -> Self {
        Self::from_arcs(Arc::new(name_converter), Arc::new(value_converter))
    }

    pub fn from_arcs(
        name_converter: Arc<dyn NameConverter>,
        value_converter: Arc<dyn ValueConverter>,
    ) -> Self {
        Self {
            name_converter,
            value_converter,
        }
    }

    pub fn name_converter(&self) -> &dyn NameConverter {
        self.name_converter.as_ref()
    }

    pub fn value_converter(&self) -> &dyn ValueConverter {
        self.value_converter.as_ref()
    }

    /// Extract through `rsm` when given (RSM order, RSM column names),
    /// otherwise through the declared properties and the name converter.
    pub fn extract<T: Dto>(
        &self,
        dto: &T,
        rsm: Option<&ResultSetMapping<T>>,
    ) -> OrmResult<ColumnValues> {
        let mut data = ColumnValues::new();

        match rsm {
            Some(rsm) => {
                for (column, property) in rsm.fields() {
                    // Properties the DTO does not declare are ignored.
                    if let Some(Field::Set(value)) = dto.get_field(property) {
                        data.insert(column.clone(), self.value_converter.convert_for_db(value));
                    }
                }
            }
            None => {
                for def in T::FIELDS {
                    if let Some(Field::Set(value)) = dto.get_field(def.name) {
                        let column = self.name_converter.to_column_name(def.name);
                        data.insert(column, self.value_converter.convert_for_db(value));
                    }
                }
            }
        }

        Ok(data)
    }
}
