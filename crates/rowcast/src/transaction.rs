//! Transaction helper macro.
//!
//! Write operations are not transactional on their own. Wrap them with
//! [`transaction!`] (or call [`Connection::begin_transaction`],
//! [`Connection::commit`] and [`Connection::roll_back`] yourself).
//!
//! # Example
//!
//! ```ignore
//! use rowcast::{Criteria, DataMapper, OrmResult};
//!
//! # async fn demo(mapper: &DataMapper<rowcast::pg::PgConnection>) -> OrmResult<()> {
//! rowcast::transaction!(mapper.connection(), {
//!     mapper.insert("users", &alice).await?;
//!     mapper.delete("invites", &Criteria::new().with("email", "alice@example.com")).await?;
//!     Ok(())
//! })?;
//! # Ok(()) }
//! ```
//!
//! [`Connection::begin_transaction`]: crate::Connection::begin_transaction
//! [`Connection::commit`]: crate::Connection::commit
//! [`Connection::roll_back`]: crate::Connection::roll_back

/// Runs the given block inside a database transaction.
///
/// - Begins a transaction on `$conn` (a savepoint if one is already open).
/// - Commits on `Ok(_)`.
/// - Rolls back on `Err(_)` and returns the error.
///
/// `$conn` must be a reference to a [`Connection`](crate::Connection). The
/// block must evaluate to `rowcast::OrmResult<T>`.
#[macro_export]
macro_rules! transaction {
    ($conn:expr, $body:block) => {{
        let __rowcast_conn = $conn;
        $crate::Connection::begin_transaction(__rowcast_conn).await?;

        let __rowcast_tx_body_result: $crate::OrmResult<_> = async { $body }.await;
        match __rowcast_tx_body_result {
            Ok(value) => {
                $crate::Connection::commit(__rowcast_conn).await?;
                Ok(value)
            }
            Err(error) => match $crate::Connection::roll_back(__rowcast_conn).await {
                Ok(()) => Err(error),
                Err(rollback_err) => Err($crate::OrmError::Other(format!(
                    "{error} (rollback failed: {rollback_err})"
                ))),
            },
        }
    }};
}
