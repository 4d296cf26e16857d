//! Data-mapper configuration.

use crate::cast::TypeCasterRegistry;
use crate::convert::{
    BoolValueConverter, DEFAULT_DATE_FORMAT, DEFAULT_DATETIME_FORMAT, DateTimeValueConverter,
    EnumValueConverter, ValueConverterRegistry,
};
use crate::error::OrmResult;
use crate::extract::DtoExtractor;
use crate::hydrate::Hydrator;
use crate::naming::{IdentityConverter, NameConverter, SnakeCaseConverter};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// How property names map to column names when no explicit mapping is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Naming {
    /// `createdAt` ↔ `created_at`; snake_case properties map to themselves.
    #[default]
    SnakeCase,
    /// Column names equal property names.
    Identity,
}

impl Naming {
    pub fn converter(&self) -> Arc<dyn NameConverter> {
        match self {
            Naming::SnakeCase => Arc::new(SnakeCaseConverter),
            Naming::Identity => Arc::new(IdentityConverter),
        }
    }
}

/// Configuration for a [`crate::DataMapper`].
///
/// Deserializable, so it can be loaded from an application config file:
///
/// ```ignore
/// let config: MapperConfig = serde_json::from_str(
///     r#"{"naming": "identity", "datetime_format": "%Y-%m-%dT%H:%M:%S"}"#,
/// )?;
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    pub naming: Naming,
    /// `strftime` format used to write timestamps.
    pub datetime_format: String,
    /// `strftime` format used to write dates.
    pub date_format: String,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            naming: Naming::default(),
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
            date_format: DEFAULT_DATE_FORMAT.to_string(),
        }
    }
}

impl MapperConfig {
    /// Create a new configuration with defaults (snake_case naming, `%Y-%m-%d %H:%M:%S`).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_datetime_format(mut self, format: impl Into<String>) -> Self {
        self.datetime_format = format.into();
        self
    }

    pub fn with_date_format(mut self, format: impl Into<String>) -> Self {
        self.date_format = format.into();
        self
    }

    /// Extractor using the configured naming and formats.
    ///
    /// Fails if a format string is not valid `strftime`.
    pub fn extractor(&self) -> OrmResult<DtoExtractor> {
        let converters = ValueConverterRegistry::new()
            .with_converter(BoolValueConverter)
            .with_converter(EnumValueConverter)
            .with_converter(DateTimeValueConverter::new(
                self.datetime_format.clone(),
                self.date_format.clone(),
            )?);
        Ok(DtoExtractor::from_arcs(
            self.naming.converter(),
            Arc::new(converters),
        ))
    }

    /// Hydrator using the configured naming and the default casters.
    pub fn hydrator(&self) -> Hydrator {
        Hydrator::from_arcs(
            Arc::new(TypeCasterRegistry::with_defaults()),
            self.naming.converter(),
        )
    }
}
