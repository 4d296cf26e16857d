//! Postgres-backed [`Connection`].
//!
//! Statements use `:name` / `?` placeholders like every other connection;
//! they are rewritten to `$N` before being sent.
//!
//! ```ignore
//! let (client, conn) = tokio_postgres::connect(url, NoTls).await?;
//! tokio::spawn(conn);
//! let conn = rowcast::PgConnection::new(client);
//! let users: Vec<User> = DataMapper::new(&conn).find_all(ReadTarget::auto(), FindOptions::new()).await?;
//! ```

mod placeholders;
mod types;

use crate::connection::{Connection, Driver, RowStream};
use crate::error::{OrmError, OrmResult};
use crate::log::{rowcast_debug, rowcast_warn};
use crate::qb::Params;
use crate::row::Row;
use crate::value::Value;
use futures_core::Stream;
use placeholders::rewrite;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::task::{Context, Poll};
use tokio_postgres::types::ToSql;

/// Anything that can lend a `tokio_postgres::Client`.
pub trait PgClient: Send + Sync {
    fn client(&self) -> &tokio_postgres::Client;
}

impl PgClient for tokio_postgres::Client {
    fn client(&self) -> &tokio_postgres::Client {
        self
    }
}

#[cfg(feature = "pool")]
impl PgClient for deadpool_postgres::Client {
    fn client(&self) -> &tokio_postgres::Client {
        self
    }
}

impl<T: PgClient> PgClient for Arc<T> {
    fn client(&self) -> &tokio_postgres::Client {
        (**self).client()
    }
}

/// A [`Connection`] over a Postgres client.
///
/// Nested [`Connection::begin_transaction`] calls open savepoints. The
/// nesting level is tracked per `PgConnection`, so share one instance rather
/// than wrapping the same client twice.
pub struct PgConnection<C = tokio_postgres::Client> {
    client: C,
    depth: AtomicU32,
}

impl<C: PgClient> PgConnection<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            depth: AtomicU32::new(0),
        }
    }

    /// The underlying driver client.
    pub fn client(&self) -> &tokio_postgres::Client {
        self.client.client()
    }

    pub fn into_inner(self) -> C {
        self.client
    }

    /// Current value of `sequence` in this session, for tables whose key is
    /// not the last sequence touched.
    ///
    /// ```ignore
    /// let id = conn.last_insert_id_for("users_id_seq").await?;
    /// ```
    pub async fn last_insert_id_for(&self, sequence: &str) -> OrmResult<String> {
        self.sequence_value("SELECT currval($1::text::regclass)", &[&sequence])
            .await
    }

    async fn sequence_value(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> OrmResult<String> {
        let row = self
            .client()
            .query_one(sql, params)
            .await
            .map_err(OrmError::from_db_error)?;
        let id: i64 = row
            .try_get(0)
            .map_err(|e| OrmError::decode("last_insert_id", e.to_string()))?;
        Ok(id.to_string())
    }

    async fn batch(&self, sql: &str) -> OrmResult<()> {
        self.client()
            .batch_execute(sql)
            .await
            .map_err(OrmError::from_db_error)
    }
}

impl<C> std::fmt::Debug for PgConnection<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgConnection")
            .field("depth", &self.depth.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

fn bind_refs<'a>(values: &'a [&'a Value]) -> Vec<&'a (dyn ToSql + Sync)> {
    values.iter().map(|v| *v as &(dyn ToSql + Sync)).collect()
}

fn savepoint_name(level: u32) -> String {
    format!("rowcast_sp_{level}")
}

impl<C: PgClient> Connection for PgConnection<C> {
    fn driver(&self) -> Driver {
        Driver::Postgres
    }

    async fn query(&self, sql: &str, params: &Params) -> OrmResult<Vec<Row>> {
        let prepared = rewrite(sql, params)?;
        rowcast_debug!(target: "rowcast.sql", sql = %prepared.sql, params = prepared.values.len(), "query");
        let rows = self
            .client()
            .query(prepared.sql.as_str(), &bind_refs(&prepared.values))
            .await
            .map_err(OrmError::from_db_error)?;
        rows.iter().map(types::decode_row).collect()
    }

    async fn execute(&self, sql: &str, params: &Params) -> OrmResult<u64> {
        let prepared = rewrite(sql, params)?;
        rowcast_debug!(target: "rowcast.sql", sql = %prepared.sql, params = prepared.values.len(), "execute");
        self.client()
            .execute(prepared.sql.as_str(), &bind_refs(&prepared.values))
            .await
            .map_err(OrmError::from_db_error)
    }

    async fn last_insert_id(&self) -> OrmResult<String> {
        self.sequence_value("SELECT LASTVAL()", &[]).await
    }

    async fn query_stream(&self, sql: &str, params: &Params) -> OrmResult<RowStream> {
        let prepared = rewrite(sql, params)?;
        rowcast_debug!(target: "rowcast.sql", sql = %prepared.sql, params = prepared.values.len(), "query_stream");
        let stream = self
            .client()
            .query_raw(prepared.sql.as_str(), prepared.values.iter().copied())
            .await
            .map_err(OrmError::from_db_error)?;
        Ok(RowStream::new(DecodedRows {
            inner: Box::pin(stream),
        }))
    }

    async fn begin_transaction(&self) -> OrmResult<()> {
        let depth = self.depth.load(Ordering::SeqCst);
        if depth == 0 {
            self.batch("BEGIN").await?;
        } else {
            self.batch(&format!("SAVEPOINT {}", savepoint_name(depth)))
                .await?;
        }
        self.depth.store(depth + 1, Ordering::SeqCst);
        rowcast_debug!(target: "rowcast.tx", depth = depth + 1, "begin");
        Ok(())
    }

    async fn commit(&self) -> OrmResult<()> {
        let depth = self.depth.load(Ordering::SeqCst);
        match depth {
            0 => return Err(OrmError::logic("There is no active transaction")),
            1 => {
                let result = self.batch("COMMIT").await;
                // A failed COMMIT still ends the transaction.
                self.depth.store(0, Ordering::SeqCst);
                result?;
            }
            _ => {
                self.batch(&format!("RELEASE SAVEPOINT {}", savepoint_name(depth - 1)))
                    .await?;
                self.depth.store(depth - 1, Ordering::SeqCst);
            }
        }
        rowcast_debug!(target: "rowcast.tx", depth, "commit");
        Ok(())
    }

    async fn roll_back(&self) -> OrmResult<()> {
        let depth = self.depth.load(Ordering::SeqCst);
        let result = match depth {
            0 => return Err(OrmError::logic("There is no active transaction")),
            1 => {
                let result = self.batch("ROLLBACK").await;
                self.depth.store(0, Ordering::SeqCst);
                result
            }
            _ => {
                let result = self
                    .batch(&format!("ROLLBACK TO SAVEPOINT {}", savepoint_name(depth - 1)))
                    .await;
                if result.is_ok() {
                    self.depth.store(depth - 1, Ordering::SeqCst);
                }
                result
            }
        };
        match &result {
            Ok(()) => rowcast_debug!(target: "rowcast.tx", depth, "rollback"),
            Err(e) => rowcast_warn!(target: "rowcast.tx", depth, error = %e, "rollback failed"),
        }
        result
    }

    fn transaction_nesting_level(&self) -> u32 {
        self.depth.load(Ordering::SeqCst)
    }
}

/// Decodes driver rows lazily as the stream is polled.
struct DecodedRows {
    inner: Pin<Box<tokio_postgres::RowStream>>,
}

impl Stream for DecodedRows {
    type Item = OrmResult<Row>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.inner.as_mut().poll_next(cx) {
            Poll::Ready(Some(Ok(row))) => Poll::Ready(Some(types::decode_row(&row))),
            Poll::Ready(Some(Err(e))) => Poll::Ready(Some(Err(OrmError::from_db_error(e)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}
