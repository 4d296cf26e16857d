//! Shared fixtures: DTOs, enums and a scripted in-memory connection.
#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use futures_util::{StreamExt, stream};
use rowcast::{
    BackedEnum, Connection, Driver, Dto, Field, OrmError, OrmResult, Params, Row, RowStream,
    Value,
};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Dto)]
pub struct SimpleUser {
    pub id: Field<i64>,
    pub name: Field<String>,
    pub email: Field<Option<String>>,
    pub active: Field<bool>,
}

#[derive(Debug, Dto)]
#[orm(table = "users")]
pub struct UserWithDates {
    pub id: Field<i64>,
    #[orm(rename = "createdAt")]
    pub created_at: Field<NaiveDateTime>,
    pub birthday: Field<Option<NaiveDate>>,
}

#[derive(Debug, Clone, Copy, PartialEq, BackedEnum)]
pub enum UserStatus {
    Active,
    Inactive,
    Banned,
}

#[derive(Debug, Clone, Copy, PartialEq, BackedEnum)]
#[orm(type_name = "priority")]
pub enum Priority {
    #[orm(value = 1)]
    Low,
    #[orm(value = 2)]
    High,
}

#[derive(Debug, Dto)]
#[orm(table = "tasks")]
pub struct DtoWithEnum {
    pub id: Field<i64>,
    pub status: Field<UserStatus>,
    pub priority: Field<Option<Priority>>,
}

#[derive(Debug, Dto)]
pub struct AllScalarsDto {
    pub count: Field<i32>,
    pub ratio: Field<f64>,
    pub flag: Field<bool>,
    pub label: Field<String>,
    #[orm(types = "int|string")]
    pub reference: Field<Value>,
    pub anything: Field<Value>,
    #[orm(skip)]
    pub scratch: Vec<String>,
}

pub fn simple_user(name: &str, active: bool) -> SimpleUser {
    let mut user = SimpleUser::blank();
    user.name.set(name.to_string());
    user.active.set(active);
    user
}

/// One call made against [`MockConnection`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub sql: String,
    pub params: Params,
}

/// Records every statement and answers from a script.
pub struct MockConnection {
    driver: Driver,
    rows: Vec<Row>,
    affected: u64,
    last_id: String,
    fail_rollback: bool,
    log: Mutex<Vec<Recorded>>,
    tx_events: Mutex<Vec<&'static str>>,
    depth: AtomicU32,
    rows_pulled: Arc<AtomicUsize>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            driver: Driver::Postgres,
            rows: Vec::new(),
            affected: 0,
            last_id: "0".to_string(),
            fail_rollback: false,
            log: Mutex::new(Vec::new()),
            tx_events: Mutex::new(Vec::new()),
            depth: AtomicU32::new(0),
            rows_pulled: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_driver(mut self, driver: Driver) -> Self {
        self.driver = driver;
        self
    }

    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    pub fn with_last_id(mut self, id: &str) -> Self {
        self.last_id = id.to_string();
        self
    }

    pub fn failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.recorded().pop().expect("no statement recorded")
    }

    pub fn tx_events(&self) -> Vec<&'static str> {
        self.tx_events.lock().unwrap().clone()
    }

    /// Rows handed out by streams so far.
    pub fn rows_pulled(&self) -> usize {
        self.rows_pulled.load(Ordering::SeqCst)
    }

    fn record(&self, sql: &str, params: &Params) {
        self.log.lock().unwrap().push(Recorded {
            sql: sql.to_string(),
            params: params.clone(),
        });
    }
}

impl Connection for MockConnection {
    fn driver(&self) -> Driver {
        self.driver.clone()
    }

    async fn query(&self, sql: &str, params: &Params) -> OrmResult<Vec<Row>> {
        self.record(sql, params);
        Ok(self.rows.clone())
    }

    async fn execute(&self, sql: &str, params: &Params) -> OrmResult<u64> {
        self.record(sql, params);
        Ok(self.affected)
    }

    async fn last_insert_id(&self) -> OrmResult<String> {
        Ok(self.last_id.clone())
    }

    async fn query_stream(&self, sql: &str, params: &Params) -> OrmResult<RowStream> {
        self.record(sql, params);
        let pulled = self.rows_pulled.clone();
        let rows = stream::iter(self.rows.clone()).map(move |row| {
            pulled.fetch_add(1, Ordering::SeqCst);
            Ok(row)
        });
        Ok(RowStream::new(rows))
    }

    async fn begin_transaction(&self) -> OrmResult<()> {
        self.depth.fetch_add(1, Ordering::SeqCst);
        self.tx_events.lock().unwrap().push("begin");
        Ok(())
    }

    async fn commit(&self) -> OrmResult<()> {
        self.depth.fetch_sub(1, Ordering::SeqCst);
        self.tx_events.lock().unwrap().push("commit");
        Ok(())
    }

    async fn roll_back(&self) -> OrmResult<()> {
        self.depth.fetch_sub(1, Ordering::SeqCst);
        self.tx_events.lock().unwrap().push("rollback");
        if self.fail_rollback {
            return Err(OrmError::Connection("connection reset".to_string()));
        }
        Ok(())
    }

    fn transaction_nesting_level(&self) -> u32 {
        self.depth.load(Ordering::SeqCst)
    }
}
