//! Query builder and per-kind SQL compilers.
//!
//! [`QueryBuilder`] accumulates the clauses of a single statement; the
//! compilers in [`compiler`] turn them into SQL text. Placeholders (`:name`,
//! `?`) are written by the caller and bound from the builder's parameters.
//!
//! ```ignore
//! use rowcast::qb::QueryBuilder;
//!
//! let mut qb = QueryBuilder::new();
//! qb.select(["u.id", "u.name", "p.title"])
//!     .from_as("users", "u")
//!     .left_join("u", "posts", "p", "p.user_id = u.id")
//!     .where_("u.status = :status")
//!     .order_by("u.name", "asc")
//!     .set_max_results(10)
//!     .set_parameter("status", "active");
//!
//! let rows = qb.fetch_all_associative(&conn).await?;
//! ```

mod builder;
pub mod compiler;
mod param;
mod parts;

pub use builder::QueryBuilder;
pub use compiler::{
    DeleteCompiler, InsertCompiler, SelectCompiler, SqlCompiler, UpdateCompiler, compile,
};
pub use param::{ParamKey, Params, placeholder_name};
pub use parts::{
    DeleteParts, InsertParts, Join, JoinKind, QueryState, QueryType, SelectParts, TableRef,
    UpdateParts,
};
