//! The database connection contract.
//!
//! The query builder and data mapper only ever talk to a database through
//! [`Connection`]. A Postgres implementation lives in [`crate::pg`]; anything
//! else (another driver, a test double) can implement the trait directly.

use crate::error::{OrmError, OrmResult};
use crate::qb::Params;
use crate::row::Row;
use crate::value::Value;
use futures_core::Stream;
use std::fmt;
use std::pin::Pin;
use std::str::FromStr;
use std::task::{Context, Poll};

/// Which database a connection talks to.
///
/// Only used to decide whether `LIMIT`/`OFFSET` can be emitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Driver {
    Sqlite,
    Mysql,
    Postgres,
    Other(String),
}

impl Driver {
    /// Parse a driver name (`sqlite`, `mysql`, `pgsql`/`postgres`/`postgresql`).
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "sqlite" => Driver::Sqlite,
            "mysql" => Driver::Mysql,
            "pgsql" | "postgres" | "postgresql" => Driver::Postgres,
            _ => Driver::Other(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Driver::Sqlite => "sqlite",
            Driver::Mysql => "mysql",
            Driver::Postgres => "pgsql",
            Driver::Other(name) => name,
        }
    }

    /// Whether `LIMIT n [OFFSET m]` is understood by this driver.
    pub fn supports_limit_offset(&self) -> bool {
        matches!(self, Driver::Sqlite | Driver::Mysql | Driver::Postgres)
    }
}

impl fmt::Display for Driver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Driver {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Driver::parse(s))
    }
}

impl From<&str> for Driver {
    fn from(name: &str) -> Self {
        Driver::parse(name)
    }
}

/// A database connection as seen by the query builder and data mapper.
///
/// SQL text uses `:name` and `?` placeholders; values come from [`Params`].
pub trait Connection: Send + Sync {
    fn driver(&self) -> Driver;

    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send;

    /// Execute a query and return the first row, if any.
    fn query_opt(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<Option<Row>>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Execute a query and return the first column of the first row, if any.
    fn query_scalar(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<Option<Value>>> + Send {
        async move {
            let row = self.query_opt(sql, params).await?;
            Ok(row.and_then(|row| row.into_iter().next().map(|(_, value)| value)))
        }
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send;

    /// Identifier generated by the most recent insert on this connection.
    fn last_insert_id(&self) -> impl std::future::Future<Output = OrmResult<String>> + Send;

    /// Execute a query and return a forward-only stream of rows.
    ///
    /// The default implementation buffers the full result with
    /// [`Connection::query`].
    fn query_stream(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<RowStream>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            Ok(RowStream::from_rows(rows))
        }
    }

    fn begin_transaction(&self) -> impl std::future::Future<Output = OrmResult<()>> + Send {
        async { Err(unsupported_transactions()) }
    }

    fn commit(&self) -> impl std::future::Future<Output = OrmResult<()>> + Send {
        async { Err(unsupported_transactions()) }
    }

    fn roll_back(&self) -> impl std::future::Future<Output = OrmResult<()>> + Send {
        async { Err(unsupported_transactions()) }
    }

    /// Number of open (possibly nested) transactions.
    fn transaction_nesting_level(&self) -> u32 {
        0
    }
}

fn unsupported_transactions() -> OrmError {
    OrmError::Other("transactions are not supported by this connection".to_string())
}

impl<C: Connection> Connection for &C {
    fn driver(&self) -> Driver {
        (**self).driver()
    }

    fn query(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<Vec<Row>>> + Send {
        (**self).query(sql, params)
    }

    fn query_opt(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<Option<Row>>> + Send {
        (**self).query_opt(sql, params)
    }

    fn query_scalar(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<Option<Value>>> + Send {
        (**self).query_scalar(sql, params)
    }

    fn execute(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<u64>> + Send {
        (**self).execute(sql, params)
    }

    fn last_insert_id(&self) -> impl std::future::Future<Output = OrmResult<String>> + Send {
        (**self).last_insert_id()
    }

    fn query_stream(
        &self,
        sql: &str,
        params: &Params,
    ) -> impl std::future::Future<Output = OrmResult<RowStream>> + Send {
        (**self).query_stream(sql, params)
    }

    fn begin_transaction(&self) -> impl std::future::Future<Output = OrmResult<()>> + Send {
        (**self).begin_transaction()
    }

    fn commit(&self) -> impl std::future::Future<Output = OrmResult<()>> + Send {
        (**self).commit()
    }

    fn roll_back(&self) -> impl std::future::Future<Output = OrmResult<()>> + Send {
        (**self).roll_back()
    }

    fn transaction_nesting_level(&self) -> u32 {
        (**self).transaction_nesting_level()
    }
}

/// A stream of rows.
///
/// Type-erased so that every connection returns the same streaming type.
/// Dropping it releases whatever cursor backs it.
#[must_use = "streams do nothing unless polled"]
pub struct RowStream {
    inner: Pin<Box<dyn Stream<Item = OrmResult<Row>> + Send>>,
}

impl RowStream {
    /// Create a new `RowStream` from any compatible stream.
    pub fn new<S>(stream: S) -> Self
    where
        S: Stream<Item = OrmResult<Row>> + Send + 'static,
    {
        Self {
            inner: Box::pin(stream),
        }
    }

    /// A stream over rows that are already in memory.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self::new(BufferedRows {
            rows: rows.into_iter(),
        })
    }
}

impl fmt::Debug for RowStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowStream").finish_non_exhaustive()
    }
}

impl Stream for RowStream {
    type Item = OrmResult<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

struct BufferedRows {
    rows: std::vec::IntoIter<Row>,
}

impl Stream for BufferedRows {
    type Item = OrmResult<Row>;

    fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.rows.next().map(Ok))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}
