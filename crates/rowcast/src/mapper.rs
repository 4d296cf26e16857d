//! Persisting and querying DTOs.

use crate::config::MapperConfig;
use crate::connection::Connection;
use crate::dto::Dto;
use crate::error::{OrmError, OrmResult};
use crate::extract::DtoExtractor;
use crate::hydrate::{HydratingStream, Hydrator};
use crate::log::rowcast_debug;
use crate::mapping::ResultSetMapping;
use crate::naming::table_name_for;
use crate::qb::{QueryBuilder, placeholder_name};
use crate::value::Value;
use indexmap::IndexMap;
use std::borrow::Cow;
use std::marker::PhantomData;
use std::sync::Arc;

/// Equality conditions, AND-ed together in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    conditions: IndexMap<String, Value>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `column = value`.
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.insert(column.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            conditions: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Filtering, ordering and pagination for [`DataMapper::find_all`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindOptions {
    pub criteria: Criteria,
    /// Column → direction (`asc`/`desc`, any case).
    pub order_by: IndexMap<String, String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl FindOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_criteria(mut self, criteria: Criteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Add `column = value` to the criteria.
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.criteria = self.criteria.with(column, value);
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: impl Into<String>) -> Self {
        self.order_by.insert(column.into(), direction.into());
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Where a write goes: a plain table, or a mapping that names its table.
pub enum WriteTarget<'a, T> {
    Table(&'a str),
    Mapping(&'a ResultSetMapping<T>),
}

impl<'a, T> From<&'a str> for WriteTarget<'a, T> {
    fn from(table: &'a str) -> Self {
        WriteTarget::Table(table)
    }
}

impl<'a, T> From<&'a String> for WriteTarget<'a, T> {
    fn from(table: &'a String) -> Self {
        WriteTarget::Table(table)
    }
}

impl<'a, T> From<&'a ResultSetMapping<T>> for WriteTarget<'a, T> {
    fn from(rsm: &'a ResultSetMapping<T>) -> Self {
        WriteTarget::Mapping(rsm)
    }
}

impl<'a, T> WriteTarget<'a, T> {
    fn resolve(self) -> OrmResult<(&'a str, Option<&'a ResultSetMapping<T>>)> {
        match self {
            WriteTarget::Table(table) => Ok((table, None)),
            WriteTarget::Mapping(rsm) => {
                let table = rsm.table().ok_or_else(|| {
                    OrmError::logic("ResultSetMapping must have a table name for write operations")
                })?;
                Ok((table, Some(rsm)))
            }
        }
    }
}

/// Table for a delete: a name, or a mapping that names its table.
///
/// Separate from [`WriteTarget`] because a delete has no DTO to infer the
/// mapped type from.
pub struct DeleteTarget<'a> {
    table: Option<&'a str>,
}

impl<'a> From<&'a str> for DeleteTarget<'a> {
    fn from(table: &'a str) -> Self {
        Self { table: Some(table) }
    }
}

impl<'a> From<&'a String> for DeleteTarget<'a> {
    fn from(table: &'a String) -> Self {
        Self { table: Some(table) }
    }
}

impl<'a, T> From<&'a ResultSetMapping<T>> for DeleteTarget<'a> {
    fn from(rsm: &'a ResultSetMapping<T>) -> Self {
        Self { table: rsm.table() }
    }
}

/// What a read hydrates: `T` by convention, or through a mapping.
pub enum ReadTarget<'a, T> {
    /// Table from `#[orm(table = "...")]` or derived from the type name;
    /// columns through the name converter.
    Type(PhantomData<fn() -> T>),
    Mapping(&'a ResultSetMapping<T>),
}

impl<T> ReadTarget<'_, T> {
    pub fn auto() -> Self {
        ReadTarget::Type(PhantomData)
    }
}

impl<'a, T> From<&'a ResultSetMapping<T>> for ReadTarget<'a, T> {
    fn from(rsm: &'a ResultSetMapping<T>) -> Self {
        ReadTarget::Mapping(rsm)
    }
}

impl<'a, T> From<Option<&'a ResultSetMapping<T>>> for ReadTarget<'a, T> {
    fn from(rsm: Option<&'a ResultSetMapping<T>>) -> Self {
        match rsm {
            Some(rsm) => ReadTarget::Mapping(rsm),
            None => ReadTarget::auto(),
        }
    }
}

impl<'a, T: Dto> ReadTarget<'a, T> {
    fn resolve(self) -> OrmResult<(Cow<'a, str>, Option<&'a ResultSetMapping<T>>)> {
        match self {
            ReadTarget::Type(_) => Ok((table_for::<T>(), None)),
            ReadTarget::Mapping(rsm) => {
                let table = rsm.table().ok_or_else(|| {
                    OrmError::logic("ResultSetMapping must have a table name for read operations")
                })?;
                Ok((Cow::Borrowed(table), Some(rsm)))
            }
        }
    }
}

/// Table a DTO type reads from when no mapping is given.
pub fn table_for<T: Dto>() -> Cow<'static, str> {
    match T::TABLE {
        Some(table) => Cow::Borrowed(table),
        None => Cow::Owned(table_name_for(T::SHORT_NAME)),
    }
}

/// Inserts, updates, deletes and finds DTOs over a [`Connection`].
///
/// ```ignore
/// let mapper = DataMapper::new(conn);
///
/// let mut user = User::blank();
/// user.name.set("Alice".into());
/// let id = mapper.insert("users", &user).await?;
///
/// let found: Option<User> = mapper
///     .find_one(ReadTarget::auto(), &Criteria::new().with("id", id.parse::<i64>()?))
///     .await?;
/// ```
pub struct DataMapper<C> {
    connection: C,
    extractor: DtoExtractor,
    hydrator: Arc<Hydrator>,
}

impl<C: Connection> DataMapper<C> {
    /// Mapper with snake_case naming and default converters/casters.
    pub fn new(connection: C) -> Self {
        Self::with_parts(connection, DtoExtractor::default(), Hydrator::default())
    }

    pub fn with_config(connection: C, config: &MapperConfig) -> OrmResult<Self> {
        Ok(Self::with_parts(
            connection,
            config.extractor()?,
            config.hydrator(),
        ))
    }

    /// Mapper with a custom extractor and hydrator.
    pub fn with_parts(connection: C, extractor: DtoExtractor, hydrator: Hydrator) -> Self {
        Self {
            connection,
            extractor,
            hydrator: Arc::new(hydrator),
        }
    }

    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn extractor(&self) -> &DtoExtractor {
        &self.extractor
    }

    pub fn hydrator(&self) -> &Hydrator {
        &self.hydrator
    }

    pub fn into_connection(self) -> C {
        self.connection
    }

    /// Insert the set properties of `dto`; returns the last insert id.
    pub async fn insert<'a, T: Dto + 'a>(
        &self,
        target: impl Into<WriteTarget<'a, T>>,
        dto: &T,
    ) -> OrmResult<String> {
        let (table, rsm) = target.into().resolve()?;
        let data = self.extractor.extract(dto, rsm)?;
        if data.is_empty() {
            return Err(OrmError::logic(
                "Cannot insert: no data extracted from the DTO",
            ));
        }

        let mut qb = QueryBuilder::new();
        qb.insert(table);
        let mut values = IndexMap::with_capacity(data.len());
        for (column, value) in data {
            let param = placeholder_name("", &column);
            values.insert(column, format!(":{param}"));
            qb.set_parameter(param, value);
        }
        qb.values(values);

        rowcast_debug!(target: "rowcast.mapper", op = "insert", table, dto = T::SHORT_NAME);
        qb.execute_statement(&self.connection).await?;
        self.connection.last_insert_id().await
    }

    /// Update rows matching `criteria` with the set properties of `dto`.
    pub async fn update<'a, T: Dto + 'a>(
        &self,
        target: impl Into<WriteTarget<'a, T>>,
        dto: &T,
        criteria: &Criteria,
    ) -> OrmResult<u64> {
        let (table, rsm) = target.into().resolve()?;
        let data = self.extractor.extract(dto, rsm)?;
        if data.is_empty() {
            return Err(OrmError::logic(
                "Cannot update: no data extracted from the DTO",
            ));
        }
        if criteria.is_empty() {
            return Err(OrmError::logic(
                "Cannot update: WHERE conditions are required",
            ));
        }

        let mut qb = QueryBuilder::new();
        qb.update(table);
        for (column, value) in data {
            let param = placeholder_name("v_", &column);
            qb.set(&column, &format!(":{param}"));
            qb.set_parameter(param, value);
        }
        self.apply_where(&mut qb, criteria, "w_");

        rowcast_debug!(target: "rowcast.mapper", op = "update", table, dto = T::SHORT_NAME);
        qb.execute_statement(&self.connection).await
    }

    /// Delete rows matching `criteria`.
    pub async fn delete<'a>(
        &self,
        target: impl Into<DeleteTarget<'a>>,
        criteria: &Criteria,
    ) -> OrmResult<u64> {
        let table = target.into().table.ok_or_else(|| {
            OrmError::logic("ResultSetMapping must have a table name for write operations")
        })?;
        if criteria.is_empty() {
            return Err(OrmError::logic(
                "Cannot delete: WHERE conditions are required",
            ));
        }

        let mut qb = QueryBuilder::new();
        qb.delete(table);
        self.apply_where(&mut qb, criteria, "");

        rowcast_debug!(target: "rowcast.mapper", op = "delete", table);
        qb.execute_statement(&self.connection).await
    }

    /// Find every row matching `options` and hydrate it.
    pub async fn find_all<'a, T: Dto + 'a>(
        &self,
        target: impl Into<ReadTarget<'a, T>>,
        options: &FindOptions,
    ) -> OrmResult<Vec<T>> {
        let (table, rsm) = target.into().resolve()?;
        let qb = self.select_query(&table, options);

        rowcast_debug!(target: "rowcast.mapper", op = "find_all", table = %table, dto = T::SHORT_NAME);
        let rows = qb.fetch_all_associative(&self.connection).await?;
        self.hydrator.hydrate_all(&rows, rsm)
    }

    /// Like [`DataMapper::find_all`], but hydrates lazily from a row stream.
    pub async fn iterate_all<'a, T: Dto + 'a>(
        &self,
        target: impl Into<ReadTarget<'a, T>>,
        options: &FindOptions,
    ) -> OrmResult<HydratingStream<T>> {
        let (table, rsm) = target.into().resolve()?;
        let qb = self.select_query(&table, options);

        rowcast_debug!(target: "rowcast.mapper", op = "iterate_all", table = %table, dto = T::SHORT_NAME);
        let rows = qb.to_iterable(&self.connection).await?;
        Ok(HydratingStream::new(
            rows,
            self.hydrator.clone(),
            rsm.cloned(),
        ))
    }

    /// Find the first row matching `criteria`.
    pub async fn find_one<'a, T: Dto + 'a>(
        &self,
        target: impl Into<ReadTarget<'a, T>>,
        criteria: &Criteria,
    ) -> OrmResult<Option<T>> {
        let (table, rsm) = target.into().resolve()?;
        let mut qb = QueryBuilder::new();
        qb.select(["*"]).from(&table);
        self.apply_where(&mut qb, criteria, "");
        qb.set_max_results(1);

        rowcast_debug!(target: "rowcast.mapper", op = "find_one", table = %table, dto = T::SHORT_NAME);
        match qb.fetch_associative(&self.connection).await? {
            Some(row) => self.hydrator.hydrate(&row, rsm).map(Some),
            None => Ok(None),
        }
    }

    fn select_query(&self, table: &str, options: &FindOptions) -> QueryBuilder {
        let mut qb = QueryBuilder::new();
        qb.select(["*"]).from(table);
        self.apply_where(&mut qb, &options.criteria, "");
        for (column, direction) in &options.order_by {
            qb.add_order_by(column, direction);
        }
        if let Some(limit) = options.limit {
            qb.set_max_results(limit);
        }
        if let Some(offset) = options.offset {
            qb.set_first_result(offset);
        }
        qb
    }

    fn apply_where(&self, qb: &mut QueryBuilder, criteria: &Criteria, prefix: &str) {
        let converter = self.extractor.value_converter();
        for (i, (column, value)) in criteria.iter().enumerate() {
            let param = placeholder_name(prefix, column);
            let predicate = format!("{column} = :{param}");
            if i == 0 {
                qb.where_(&predicate);
            } else {
                qb.and_where(&predicate);
            }
            qb.set_parameter(param, converter.convert_for_db(value.clone()));
        }
    }
}
