//! # rowcast
//!
//! A SQL statement builder and a data-mapper that moves rows in and out of
//! plain DTO structs.
//!
//! ## Features
//!
//! - **Query builder**: assemble SELECT/INSERT/UPDATE/DELETE with named parameters
//! - **Hydration**: rows → DTOs through name conversion or an explicit [`ResultSetMapping`]
//! - **Extraction**: DTOs → column/value maps, skipping unset fields
//! - **Pluggable conversion**: name, value and type converters are all traits
//! - **Safe defaults**: UPDATE and DELETE through the mapper require WHERE criteria
//! - **Postgres**: a ready [`Connection`] over `tokio-postgres` (feature `postgres`)
//!
//! ## Query Builder (qb)
//!
//! ```ignore
//! use rowcast::{Driver, QueryBuilder};
//!
//! let mut qb = QueryBuilder::new();
//! qb.select(["id", "name"])
//!     .from_as("users", "u")
//!     .where_("u.id = :id")
//!     .set_parameter("id", 42);
//! let rows = qb.fetch_all_associative(&conn).await?;
//! ```
//!
//! ## Data mapper
//!
//! ```ignore
//! use rowcast::{DataMapper, Dto, Field, FindOptions, ReadTarget};
//!
//! #[derive(Dto, Default)]
//! struct User {
//!     id: Field<i64>,
//!     name: Field<String>,
//! }
//!
//! let mapper = DataMapper::new(conn);
//! let id = mapper.insert("users", &user).await?;
//! let active: Vec<User> = mapper
//!     .find_all(ReadTarget::auto(), FindOptions::new().filter("status", "active"))
//!     .await?;
//! ```

// Lets derive output (`::rowcast::...`) resolve inside this crate's own tests.
extern crate self as rowcast;

mod log;

pub mod cast;
pub mod config;
pub mod connection;
pub mod convert;
pub mod dto;
pub mod error;
pub mod extract;
pub mod hydrate;
pub mod mapper;
pub mod mapping;
pub mod naming;
pub mod prelude;
pub mod qb;
pub mod row;
pub mod transaction;
pub mod value;

#[cfg(feature = "postgres")]
pub mod pg;

#[cfg(feature = "pool")]
pub mod pool;

pub use cast::{
    DateTimeTypeCaster, EnumTypeCaster, ScalarTypeCaster, TypeCaster, TypeCasterRegistry,
};
pub use config::{MapperConfig, Naming};
pub use connection::{Connection, Driver, RowStream};
pub use convert::{
    BoolValueConverter, DateTimeValueConverter, EnumValueConverter, ValueConverter,
    ValueConverterRegistry,
};
pub use dto::{BackedEnum, Dto, EnumRegistration, Field, FieldDef, FieldType};
pub use error::{OrmError, OrmResult};
pub use extract::{ColumnValues, DtoExtractor};
pub use hydrate::{HydratingStream, Hydrator};
pub use mapper::{Criteria, DataMapper, DeleteTarget, FindOptions, ReadTarget, WriteTarget};
pub use mapping::{ResultSetMapping, RsmConfig};
pub use naming::{IdentityConverter, NameConverter, SnakeCaseConverter};
pub use qb::{Params, ParamKey, QueryBuilder, QueryType};
pub use row::Row;
pub use value::{Backing, DtoValue, EnumValue, Value};

#[cfg(feature = "postgres")]
pub use pg::{PgClient, PgConnection};

#[cfg(feature = "pool")]
pub use pool::{
    PoolOptions, PooledConnection, create_pool, create_pool_with_config, pooled_connection,
};

#[cfg(feature = "derive")]
pub use rowcast_derive::{BackedEnum, Dto};

// Re-export inventory for use by derive macros
pub use inventory;

// Re-export tokio_postgres so callers can connect without a direct dependency
#[cfg(feature = "postgres")]
pub use tokio_postgres;
