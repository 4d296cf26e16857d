mod common;

use common::MockConnection;
use futures_util::TryStreamExt;
use rowcast::{ParamKey, QueryBuilder, Row, Value};

#[tokio::test]
async fn select_by_id_end_to_end() {
    let conn = MockConnection::new().with_rows(vec![
        Row::new().with("id", 1).with("name", "Alice"),
    ]);

    let mut qb = QueryBuilder::new();
    qb.select(["*"]).from("users").where_("id = :id").set_parameter("id", 1);
    let rows = qb.fetch_all_associative(&conn).await.unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name"), Some(&Value::from("Alice")));
    let stmt = conn.last();
    assert_eq!(stmt.sql, "SELECT * FROM users WHERE id = :id");
    assert_eq!(stmt.params.get(&ParamKey::named("id")), Some(&Value::Int(1)));
}

#[tokio::test]
async fn fetch_one_returns_first_column_of_first_row() {
    let conn = MockConnection::new().with_rows(vec![
        Row::new().with("total", 12).with("other", 0),
        Row::new().with("total", 99),
    ]);

    let mut qb = QueryBuilder::new();
    qb.select(["COUNT(*) AS total"]).from("users");

    assert_eq!(qb.fetch_one(&conn).await.unwrap(), Some(Value::Int(12)));
    let first = qb.fetch_associative(&conn).await.unwrap().unwrap();
    assert_eq!(first.get("total"), Some(&Value::Int(12)));
}

#[tokio::test]
async fn fetch_one_on_empty_result_is_none() {
    let conn = MockConnection::new();
    let mut qb = QueryBuilder::new();
    qb.select(["id"]).from("users");

    assert_eq!(qb.fetch_one(&conn).await.unwrap(), None);
    assert!(qb.fetch_associative(&conn).await.unwrap().is_none());
}

#[tokio::test]
async fn execute_statement_returns_affected_rows() {
    let conn = MockConnection::new().with_affected(2);
    let mut qb = QueryBuilder::new();
    qb.update("users")
        .set("active", ":active")
        .where_("last_login < :cutoff")
        .set_parameter("active", 0)
        .set_parameter("cutoff", "2024-01-01");

    assert_eq!(qb.execute_statement(&conn).await.unwrap(), 2);
    assert_eq!(
        conn.last().sql,
        "UPDATE users SET active = :active WHERE last_login < :cutoff"
    );
}

#[tokio::test]
async fn build_errors_surface_before_sql_is_sent() {
    let conn = MockConnection::new();
    let mut qb = QueryBuilder::new();
    qb.delete("users").order_by("id", "asc");

    let err = qb.execute_statement(&conn).await.unwrap_err();
    assert!(err.is_logic());
    assert!(conn.recorded().is_empty());

    let mut qb = QueryBuilder::new();
    qb.select(["id"]);
    assert!(qb.execute_query(&conn).await.unwrap_err().is_logic());
    assert!(conn.recorded().is_empty());
}

#[tokio::test]
async fn to_iterable_streams_rows() {
    let conn = MockConnection::new().with_rows(vec![
        Row::new().with("id", 1),
        Row::new().with("id", 2),
    ]);
    let mut qb = QueryBuilder::new();
    qb.select(["id"]).from("users").set_max_results(2);

    let stream = qb.to_iterable(&conn).await.unwrap();
    let rows: Vec<Row> = stream.try_collect().await.unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!(conn.last().sql, "SELECT id FROM users LIMIT 2");
}

#[tokio::test]
async fn positional_parameters_are_passed_through() {
    let conn = MockConnection::new();
    let mut qb = QueryBuilder::new();
    qb.select(["*"])
        .from("users")
        .where_("a = ?")
        .and_where("b = ?")
        .set_parameter(0, "x")
        .set_parameter(1, 2);

    qb.execute_query(&conn).await.unwrap();

    let stmt = conn.last();
    assert_eq!(stmt.sql, "SELECT * FROM users WHERE a = ? AND b = ?");
    assert_eq!(stmt.params.get(&ParamKey::Positional(0)), Some(&Value::from("x")));
    assert_eq!(stmt.params.get(&ParamKey::Positional(1)), Some(&Value::Int(2)));
}
