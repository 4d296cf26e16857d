//! Bound parameter keys.

use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;

/// Key of a bound parameter.
///
/// `Named("id")` binds `:id`; `Positional(n)` binds the `n`-th (0-based) `?`
/// in the statement text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Named(String),
    Positional(usize),
}

impl ParamKey {
    pub fn named(name: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        ParamKey::Named(name.strip_prefix(':').unwrap_or(name).to_string())
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Named(name) => write!(f, ":{name}"),
            ParamKey::Positional(index) => write!(f, "?{index}"),
        }
    }
}

/// A leading `:` is accepted and dropped, so `":id"` and `"id"` are the same key.
impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        ParamKey::named(name)
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        ParamKey::named(name)
    }
}

impl From<&String> for ParamKey {
    fn from(name: &String) -> Self {
        ParamKey::named(name)
    }
}

impl From<usize> for ParamKey {
    fn from(index: usize) -> Self {
        ParamKey::Positional(index)
    }
}

/// Parameters of a statement, in binding order.
pub type Params = IndexMap<ParamKey, Value>;

/// Turn an arbitrary column name into a valid placeholder name.
///
/// `u.created_at` → `u_created_at`.
pub fn placeholder_name(prefix: &str, column: &str) -> String {
    let mut name = String::with_capacity(prefix.len() + column.len());
    name.push_str(prefix);
    name.extend(
        column
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }),
    );
    name
}
