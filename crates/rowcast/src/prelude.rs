//! Convenient imports for typical `rowcast` usage.
//!
//! ```ignore
//! use rowcast::prelude::*;
//! ```

pub use crate::{
    Connection, Criteria, DataMapper, Driver, Field, FindOptions, OrmError, OrmResult,
    QueryBuilder, ReadTarget, ResultSetMapping, Row, Value,
};

// Traits are needed in scope for their associated items.
pub use crate::dto::{BackedEnum as _, Dto as _};
pub use crate::value::DtoValue as _;

#[cfg(feature = "pool")]
pub use crate::{PgConnection, create_pool, pooled_connection};

#[cfg(feature = "derive")]
pub use crate::{BackedEnum, Dto};
