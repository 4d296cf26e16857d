mod common;

use common::{MockConnection, simple_user};
use rowcast::{Connection, Criteria, DataMapper, OrmError, OrmResult};

#[tokio::test]
async fn commits_on_ok() -> OrmResult<()> {
    let mapper = DataMapper::new(MockConnection::new().with_last_id("1"));

    let id = rowcast::transaction!(mapper.connection(), {
        let id = mapper.insert("users", &simple_user("Alice", true)).await?;
        mapper
            .delete("invites", &Criteria::new().with("email", "alice@example.com"))
            .await?;
        Ok(id)
    })?;

    assert_eq!(id, "1");
    assert_eq!(mapper.connection().tx_events(), ["begin", "commit"]);
    assert_eq!(mapper.connection().recorded().len(), 2);
    assert_eq!(mapper.connection().transaction_nesting_level(), 0);
    Ok(())
}

#[tokio::test]
async fn rolls_back_on_err() -> OrmResult<()> {
    let mapper = DataMapper::new(MockConnection::new());

    let result: OrmResult<()> = rowcast::transaction!(mapper.connection(), {
        mapper.insert("users", &simple_user("Bob", true)).await?;
        // Refused: no WHERE.
        mapper.delete("users", &Criteria::new()).await?;
        Ok(())
    });

    assert!(result.unwrap_err().is_logic());
    assert_eq!(mapper.connection().tx_events(), ["begin", "rollback"]);
    Ok(())
}

#[tokio::test]
async fn reports_failed_rollback() -> OrmResult<()> {
    let conn = MockConnection::new().failing_rollback();

    let result: OrmResult<()> = rowcast::transaction!(&conn, {
        Err(OrmError::Other("boom".to_string()))
    });

    let message = result.unwrap_err().to_string();
    assert!(message.contains("boom"));
    assert!(message.contains("rollback failed"));
    Ok(())
}

#[tokio::test]
async fn nested_transactions_track_depth() -> OrmResult<()> {
    let conn = MockConnection::new();

    rowcast::transaction!(&conn, {
        assert_eq!(conn.transaction_nesting_level(), 1);
        let inner: OrmResult<()> = rowcast::transaction!(&conn, {
            assert_eq!(conn.transaction_nesting_level(), 2);
            Err(OrmError::Other("inner".to_string()))
        });
        assert!(inner.is_err());
        assert_eq!(conn.transaction_nesting_level(), 1);
        Ok(())
    })?;

    assert_eq!(
        conn.tx_events(),
        ["begin", "begin", "rollback", "commit"]
    );
    Ok(())
}
