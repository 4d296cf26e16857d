//! Accumulated clauses of each statement kind.

use indexmap::IndexMap;
use std::fmt;

/// The kind of statement a builder describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QueryType::Select => "SELECT",
            QueryType::Insert => "INSERT",
            QueryType::Update => "UPDATE",
            QueryType::Delete => "DELETE",
        })
    }
}

/// A table with an optional alias.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub table: String,
    pub alias: Option<String>,
}

impl TableRef {
    pub fn new(table: impl Into<String>, alias: Option<&str>) -> Self {
        Self {
            table: table.into(),
            alias: alias.map(str::to_string),
        }
    }

    /// `table` or `table alias`.
    pub fn to_sql(&self) -> String {
        match &self.alias {
            Some(alias) => format!("{} {}", self.table, alias),
            None => self.table.clone(),
        }
    }

    /// As [`TableRef::to_sql`], but an alias equal to the table is dropped.
    /// Used for `FROM`, where the alias defaults to the table name.
    pub fn to_from_sql(&self) -> String {
        match &self.alias {
            Some(alias) if alias != &self.table => format!("{} {}", self.table, alias),
            _ => self.table.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
}

impl JoinKind {
    pub fn as_sql(&self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER",
            JoinKind::Left => "LEFT",
            JoinKind::Right => "RIGHT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    /// Alias of the table being joined from. Informational only.
    pub from_alias: String,
    pub table: String,
    pub alias: String,
    pub condition: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectParts {
    pub columns: Vec<String>,
    pub from: Option<TableRef>,
    pub joins: Vec<Join>,
    pub where_: Vec<String>,
    pub group_by: Vec<String>,
    pub having: Vec<String>,
    pub order_by: Vec<String>,
    pub max_results: Option<u64>,
    pub first_result: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InsertParts {
    pub table: String,
    /// Column → placeholder.
    pub values: IndexMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateParts {
    pub table: TableRef,
    /// Column → placeholder.
    pub set: IndexMap<String, String>,
    pub where_: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteParts {
    pub table: TableRef,
    pub where_: Vec<String>,
}

/// Builder state: which statement is being described, with its clauses.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum QueryState {
    #[default]
    Unset,
    Select(SelectParts),
    Insert(InsertParts),
    Update(UpdateParts),
    Delete(DeleteParts),
}

impl QueryState {
    pub fn query_type(&self) -> Option<QueryType> {
        match self {
            QueryState::Unset => None,
            QueryState::Select(_) => Some(QueryType::Select),
            QueryState::Insert(_) => Some(QueryType::Insert),
            QueryState::Update(_) => Some(QueryType::Update),
            QueryState::Delete(_) => Some(QueryType::Delete),
        }
    }

    pub(crate) fn where_list(&mut self) -> Option<&mut Vec<String>> {
        match self {
            QueryState::Select(parts) => Some(&mut parts.where_),
            QueryState::Update(parts) => Some(&mut parts.where_),
            QueryState::Delete(parts) => Some(&mut parts.where_),
            QueryState::Unset | QueryState::Insert(_) => None,
        }
    }
}
