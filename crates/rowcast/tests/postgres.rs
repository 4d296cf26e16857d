//! Runs against a live database when `DATABASE_URL` is set.
#![cfg(feature = "postgres")]

mod common;

use common::{SimpleUser, UserStatus};
use futures_util::TryStreamExt;
use rowcast::{
    Connection, Criteria, DataMapper, Dto, Field, FindOptions, OrmResult, Params, ParamKey,
    PgConnection, QueryBuilder, ReadTarget, ResultSetMapping, Value,
};

async fn connect(test: &str) -> OrmResult<Option<PgConnection>> {
    let _ = dotenvy::dotenv();
    let database_url = match std::env::var("DATABASE_URL") {
        Ok(v) => v,
        Err(_) => {
            eprintln!("DATABASE_URL is not set; skipping {test}");
            return Ok(None);
        }
    };
    let (client, connection) = tokio_postgres::connect(&database_url, tokio_postgres::NoTls)
        .await
        .map_err(rowcast::OrmError::from_db_error)?;
    tokio::spawn(async move {
        let _ = connection.await;
    });
    Ok(Some(PgConnection::new(client)))
}

async fn create_users(conn: &PgConnection) -> OrmResult<()> {
    conn.execute(
        "CREATE TEMP TABLE simple_users (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            status TEXT NOT NULL DEFAULT 'active'
        )",
        &Params::new(),
    )
    .await?;
    Ok(())
}

#[tokio::test]
async fn crud_round_trip() -> OrmResult<()> {
    let Some(conn) = connect("crud_round_trip").await? else {
        return Ok(());
    };
    create_users(&conn).await?;
    let mapper = DataMapper::new(conn);

    let mut alice = SimpleUser::blank();
    alice.name.set("Alice".to_string());
    alice.email.set(None);
    alice.active.set(true);
    let id: i64 = mapper
        .insert("simple_users", &alice)
        .await?
        .parse()
        .map_err(|e: std::num::ParseIntError| rowcast::OrmError::Other(e.to_string()))?;

    let found: Option<SimpleUser> = mapper
        .find_one(ReadTarget::auto(), &Criteria::new().with("id", id))
        .await?;
    let found = found.expect("inserted row");
    assert_eq!(found.name, Field::Set("Alice".to_string()));
    assert_eq!(found.email, Field::Set(None));
    assert_eq!(found.active, Field::Set(true));

    let mut patch = SimpleUser::blank();
    patch.active.set(false);
    let updated = mapper
        .update("simple_users", &patch, &Criteria::new().with("id", id))
        .await?;
    assert_eq!(updated, 1);

    let inactive: Vec<SimpleUser> = mapper
        .find_all(ReadTarget::auto(), &FindOptions::new().filter("active", false))
        .await?;
    assert_eq!(inactive.len(), 1);

    let deleted = mapper
        .delete("simple_users", &Criteria::new().with("id", id))
        .await?;
    assert_eq!(deleted, 1);
    Ok(())
}

#[tokio::test]
async fn streaming_and_mapping() -> OrmResult<()> {
    let Some(conn) = connect("streaming_and_mapping").await? else {
        return Ok(());
    };
    create_users(&conn).await?;
    let mapper = DataMapper::new(conn);
    for name in ["a", "b", "c"] {
        let mut user = SimpleUser::blank();
        user.name.set(name.to_string());
        mapper.insert("simple_users", &user).await?;
    }

    let rsm = ResultSetMapping::<SimpleUser>::with_table("simple_users")
        .field("name", "name")
        .field("status", "name");
    let users: Vec<SimpleUser> = mapper
        .iterate_all(&rsm, &FindOptions::new().order_by("id", "asc"))
        .await?
        .try_collect()
        .await?;
    assert_eq!(users.len(), 3);
    // The status column is mapped last and wins.
    assert_eq!(users[0].name, Field::Set("active".to_string()));
    Ok(())
}

#[tokio::test]
async fn placeholders_inside_literals_are_left_alone() -> OrmResult<()> {
    let Some(conn) = connect("placeholders_inside_literals_are_left_alone").await? else {
        return Ok(());
    };
    let mut qb = QueryBuilder::new();
    qb.select(["':skip' AS literal", ":n::int + 1 AS next", "'a?b' AS q"])
        .from("(SELECT 1) AS one")
        .set_parameter("n", 41);
    let row = qb.fetch_associative(&conn).await?.expect("one row");

    assert_eq!(row.get("literal"), Some(&Value::from(":skip")));
    assert_eq!(row.get("next"), Some(&Value::Int(42)));
    assert_eq!(row.get("q"), Some(&Value::from("a?b")));
    Ok(())
}

#[tokio::test]
async fn enum_and_text_parameters_adapt_to_column_types() -> OrmResult<()> {
    let Some(conn) = connect("enum_and_text_parameters_adapt_to_column_types").await? else {
        return Ok(());
    };
    let mut params = Params::new();
    params.insert(ParamKey::named("status"), UserStatus::Banned.into());
    params.insert(ParamKey::named("n"), Value::from("7"));
    let row = conn
        .query_opt("SELECT :status::text AS status, :n::int4 * 2 AS doubled", &params)
        .await?
        .expect("one row");

    assert_eq!(row.get("status"), Some(&Value::from("banned")));
    assert_eq!(row.get("doubled"), Some(&Value::Int(14)));
    Ok(())
}

#[tokio::test]
async fn nested_transaction_uses_savepoints() -> OrmResult<()> {
    let Some(conn) = connect("nested_transaction_uses_savepoints").await? else {
        return Ok(());
    };
    create_users(&conn).await?;
    let insert = "INSERT INTO simple_users (name) VALUES (:name)";
    let count = "SELECT COUNT(*) FROM simple_users";

    let outcome: OrmResult<()> = rowcast::transaction!(&conn, {
        let mut p = Params::new();
        p.insert(ParamKey::named("name"), Value::from("kept"));
        conn.execute(insert, &p).await?;

        let inner: OrmResult<()> = rowcast::transaction!(&conn, {
            let mut p = Params::new();
            p.insert(ParamKey::named("name"), Value::from("discarded"));
            conn.execute(insert, &p).await?;
            Err(rowcast::OrmError::Other("undo".to_string()))
        });
        assert!(inner.is_err());
        assert_eq!(conn.transaction_nesting_level(), 1);
        Ok(())
    });
    outcome?;

    let total = conn.query_scalar(count, &Params::new()).await?;
    assert_eq!(total, Some(Value::Int(1)));
    assert_eq!(conn.transaction_nesting_level(), 0);
    Ok(())
}

#[tokio::test]
async fn last_insert_id_for_named_sequence() -> OrmResult<()> {
    let Some(conn) = connect("last_insert_id_for_named_sequence").await? else {
        return Ok(());
    };
    create_users(&conn).await?;
    conn.execute(
        "INSERT INTO simple_users (name) VALUES ('first'), ('second')",
        &Params::new(),
    )
    .await?;
    // Touch another sequence so LASTVAL() no longer refers to the users key.
    conn.execute("CREATE TEMP SEQUENCE other_seq", &Params::new()).await?;
    conn.query_scalar("SELECT nextval('other_seq')", &Params::new()).await?;

    assert_eq!(conn.last_insert_id().await?, "1");
    assert_eq!(conn.last_insert_id_for("simple_users_id_seq").await?, "2");
    Ok(())
}

#[tokio::test]
async fn numeric_columns_keep_exact_text() -> OrmResult<()> {
    let Some(conn) = connect("numeric_columns_keep_exact_text").await? else {
        return Ok(());
    };
    let mut params = Params::new();
    params.insert(ParamKey::named("price"), Value::from("100000000.00000001"));
    let row = conn
        .query_opt("SELECT :price::numeric AS price, 19.90::numeric(6, 2) AS fixed", &params)
        .await?
        .expect("one row");
    assert_eq!(row.get("price"), Some(&Value::from("100000000.00000001")));
    assert_eq!(row.get("fixed"), Some(&Value::from("19.90")));

    let err = conn
        .query("SELECT 'NaN'::numeric AS n", &Params::new())
        .await
        .unwrap_err();
    assert!(matches!(err, rowcast::OrmError::Decode { .. }), "{err}");
    Ok(())
}
