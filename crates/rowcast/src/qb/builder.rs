use super::compiler::compile;
use super::param::{ParamKey, Params};
use super::parts::{
    DeleteParts, InsertParts, Join, JoinKind, QueryState, QueryType, SelectParts, TableRef,
    UpdateParts,
};
use crate::connection::{Connection, Driver, RowStream};
use crate::error::{OrmError, OrmResult};
use crate::log::rowcast_debug;
use crate::row::Row;
use crate::value::Value;

/// Fluent description of one SELECT/INSERT/UPDATE/DELETE statement.
///
/// Clauses accumulate until the statement is compiled (with [`get_sql`] or
/// one of the execution methods). Calling a clause that does not belong to
/// the current statement kind is not an immediate failure: it is recorded and
/// reported as a logic error when compiling.
///
/// ```ignore
/// let mut qb = QueryBuilder::new();
/// qb.select(["id", "name"])
///     .from("users")
///     .where_("id = :id")
///     .set_parameter("id", 1);
/// let rows = qb.fetch_all_associative(&conn).await?;
/// ```
///
/// [`get_sql`]: QueryBuilder::get_sql
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    state: QueryState,
    parameters: Params,
    build_error: Option<String>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query_type(&self) -> Option<QueryType> {
        self.state.query_type()
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// First misapplied clause, if any.
    pub fn build_error(&self) -> Option<&str> {
        self.build_error.as_deref()
    }

    fn record(&mut self, clause: &str) {
        if self.build_error.is_none() {
            let kind = match self.state.query_type() {
                Some(kind) => kind.to_string(),
                None => "a query without a type".to_string(),
            };
            self.build_error = Some(format!("{clause} is not valid for {kind}"));
        }
    }

    /// Switch statement kind. Clauses misapplied to the previous kind are forgotten.
    fn start(&mut self, state: QueryState) {
        self.state = state;
        self.build_error = None;
    }

    fn select_parts(&mut self, clause: &str) -> Option<&mut SelectParts> {
        if !matches!(self.state, QueryState::Select(_)) {
            self.record(clause);
            return None;
        }
        match &mut self.state {
            QueryState::Select(parts) => Some(parts),
            _ => None,
        }
    }

    fn where_list(&mut self, clause: &str) -> Option<&mut Vec<String>> {
        if self.state.where_list().is_none() {
            self.record(clause);
            return None;
        }
        self.state.where_list()
    }

    // --- SELECT ---

    /// Start a SELECT of `columns` (none means `*`).
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.start(QueryState::Select(SelectParts {
            columns: columns.into_iter().map(Into::into).collect(),
            ..SelectParts::default()
        }));
        self
    }

    /// Append select columns, starting a SELECT if none is being built.
    pub fn add_select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if matches!(self.state, QueryState::Unset) {
            self.start(QueryState::Select(SelectParts::default()));
        }
        if let Some(parts) = self.select_parts("add_select") {
            parts.columns.extend(columns.into_iter().map(Into::into));
        }
        self
    }

    pub fn from(&mut self, table: &str) -> &mut Self {
        self.set_from(TableRef::new(table, None))
    }

    pub fn from_as(&mut self, table: &str, alias: &str) -> &mut Self {
        self.set_from(TableRef::new(table, Some(alias)))
    }

    fn set_from(&mut self, table: TableRef) -> &mut Self {
        if matches!(self.state, QueryState::Unset) {
            self.start(QueryState::Select(SelectParts::default()));
        }
        if let Some(parts) = self.select_parts("FROM") {
            parts.from = Some(table);
        }
        self
    }

    /// Same as [`QueryBuilder::inner_join`].
    pub fn join(&mut self, from_alias: &str, table: &str, alias: &str, condition: &str) -> &mut Self {
        self.add_join(JoinKind::Inner, from_alias, table, alias, condition)
    }

    pub fn inner_join(
        &mut self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: &str,
    ) -> &mut Self {
        self.add_join(JoinKind::Inner, from_alias, table, alias, condition)
    }

    pub fn left_join(
        &mut self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: &str,
    ) -> &mut Self {
        self.add_join(JoinKind::Left, from_alias, table, alias, condition)
    }

    pub fn right_join(
        &mut self,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: &str,
    ) -> &mut Self {
        self.add_join(JoinKind::Right, from_alias, table, alias, condition)
    }

    fn add_join(
        &mut self,
        kind: JoinKind,
        from_alias: &str,
        table: &str,
        alias: &str,
        condition: &str,
    ) -> &mut Self {
        if let Some(parts) = self.select_parts("JOIN") {
            parts.joins.push(Join {
                kind,
                from_alias: from_alias.to_string(),
                table: table.to_string(),
                alias: alias.to_string(),
                condition: condition.to_string(),
            });
        }
        self
    }

    /// Replace the WHERE list with a single predicate.
    pub fn where_(&mut self, predicate: &str) -> &mut Self {
        if let Some(list) = self.where_list("WHERE") {
            list.clear();
            list.push(predicate.to_string());
        }
        self
    }

    pub fn and_where(&mut self, predicate: &str) -> &mut Self {
        if let Some(list) = self.where_list("WHERE") {
            list.push(predicate.to_string());
        }
        self
    }

    /// OR `predicate` with the last WHERE predicate: `(last OR predicate)`.
    pub fn or_where(&mut self, predicate: &str) -> &mut Self {
        if let Some(list) = self.where_list("WHERE") {
            match list.pop() {
                Some(last) => list.push(format!("({last} OR {predicate})")),
                None => list.push(predicate.to_string()),
            }
        }
        self
    }

    pub fn group_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if let Some(parts) = self.select_parts("GROUP BY") {
            parts.group_by = columns.into_iter().map(Into::into).collect();
        }
        self
    }

    pub fn having(&mut self, predicate: &str) -> &mut Self {
        if let Some(parts) = self.select_parts("HAVING") {
            parts.having = vec![predicate.to_string()];
        }
        self
    }

    pub fn and_having(&mut self, predicate: &str) -> &mut Self {
        if let Some(parts) = self.select_parts("HAVING") {
            parts.having.push(predicate.to_string());
        }
        self
    }

    /// Replace ordering. The direction is upper-cased.
    pub fn order_by(&mut self, sort: &str, order: &str) -> &mut Self {
        if let Some(parts) = self.select_parts("ORDER BY") {
            parts.order_by = vec![format!("{sort} {}", order.to_uppercase())];
        }
        self
    }

    pub fn add_order_by(&mut self, sort: &str, order: &str) -> &mut Self {
        if let Some(parts) = self.select_parts("ORDER BY") {
            parts.order_by.push(format!("{sort} {}", order.to_uppercase()));
        }
        self
    }

    /// Row offset; only emitted together with a limit, and only when > 0.
    pub fn set_first_result(&mut self, first_result: u64) -> &mut Self {
        if let Some(parts) = self.select_parts("OFFSET") {
            parts.first_result = first_result;
        }
        self
    }

    pub fn set_max_results(&mut self, max_results: u64) -> &mut Self {
        if let Some(parts) = self.select_parts("LIMIT") {
            parts.max_results = Some(max_results);
        }
        self
    }

    // --- INSERT ---

    pub fn insert(&mut self, table: &str) -> &mut Self {
        self.start(QueryState::Insert(InsertParts {
            table: table.to_string(),
            ..InsertParts::default()
        }));
        self
    }

    /// Replace the column → placeholder map of an INSERT.
    pub fn values<I, C, P>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = (C, P)>,
        C: Into<String>,
        P: Into<String>,
    {
        match &mut self.state {
            QueryState::Insert(parts) => {
                parts.values = values
                    .into_iter()
                    .map(|(c, p)| (c.into(), p.into()))
                    .collect();
            }
            _ => self.record("VALUES"),
        }
        self
    }

    // --- UPDATE ---

    pub fn update(&mut self, table: &str) -> &mut Self {
        self.start_update(TableRef::new(table, None))
    }

    pub fn update_as(&mut self, table: &str, alias: &str) -> &mut Self {
        self.start_update(TableRef::new(table, Some(alias)))
    }

    fn start_update(&mut self, table: TableRef) -> &mut Self {
        self.start(QueryState::Update(UpdateParts {
            table,
            set: Default::default(),
            where_: Vec::new(),
        }));
        self
    }

    /// `SET column = placeholder`.
    pub fn set(&mut self, column: &str, placeholder: &str) -> &mut Self {
        match &mut self.state {
            QueryState::Update(parts) => {
                parts.set.insert(column.to_string(), placeholder.to_string());
            }
            _ => self.record("SET"),
        }
        self
    }

    // --- DELETE ---

    pub fn delete(&mut self, table: &str) -> &mut Self {
        self.start_delete(TableRef::new(table, None))
    }

    pub fn delete_as(&mut self, table: &str, alias: &str) -> &mut Self {
        self.start_delete(TableRef::new(table, Some(alias)))
    }

    fn start_delete(&mut self, table: TableRef) -> &mut Self {
        self.start(QueryState::Delete(DeleteParts {
            table,
            where_: Vec::new(),
        }));
        self
    }

    // --- Parameters ---

    pub fn set_parameter(&mut self, key: impl Into<ParamKey>, value: impl Into<Value>) -> &mut Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    /// Replace all parameters.
    pub fn set_parameters<I, K, V>(&mut self, params: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<ParamKey>,
        V: Into<Value>,
    {
        self.parameters = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    pub fn parameters(&self) -> &Params {
        &self.parameters
    }

    pub fn parameter(&self, key: impl Into<ParamKey>) -> Option<&Value> {
        self.parameters.get(&key.into())
    }

    // --- Compilation & execution ---

    /// Compile the statement for `driver`.
    pub fn get_sql(&self, driver: &Driver) -> OrmResult<String> {
        if let Some(error) = &self.build_error {
            return Err(OrmError::logic(error.clone()));
        }
        let sql = compile(&self.state, driver)?;
        rowcast_debug!(target: "rowcast.sql", sql = %sql, params = self.parameters.len(), "compiled");
        Ok(sql)
    }

    /// Run the statement and return its rows.
    pub async fn execute_query(&self, conn: &impl Connection) -> OrmResult<Vec<Row>> {
        let sql = self.get_sql(&conn.driver())?;
        conn.query(&sql, &self.parameters).await
    }

    /// Run the statement and return the affected row count.
    pub async fn execute_statement(&self, conn: &impl Connection) -> OrmResult<u64> {
        let sql = self.get_sql(&conn.driver())?;
        conn.execute(&sql, &self.parameters).await
    }

    pub async fn fetch_all_associative(&self, conn: &impl Connection) -> OrmResult<Vec<Row>> {
        self.execute_query(conn).await
    }

    /// First row, if any.
    pub async fn fetch_associative(&self, conn: &impl Connection) -> OrmResult<Option<Row>> {
        let sql = self.get_sql(&conn.driver())?;
        conn.query_opt(&sql, &self.parameters).await
    }

    /// First column of the first row, if any.
    pub async fn fetch_one(&self, conn: &impl Connection) -> OrmResult<Option<Value>> {
        let sql = self.get_sql(&conn.driver())?;
        conn.query_scalar(&sql, &self.parameters).await
    }

    /// Stream rows one at a time.
    pub async fn to_iterable(&self, conn: &impl Connection) -> OrmResult<RowStream> {
        let sql = self.get_sql(&conn.driver())?;
        conn.query_stream(&sql, &self.parameters).await
    }
}
