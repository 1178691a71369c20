mod value;
use value::Value;

use quarry_core::{
    async_trait,
    driver::{Capability, Executor, Row, SqlStatement},
    stmt::Value as CoreValue,
    Error, Result,
};

use rusqlite::Connection;
use std::{
    path::Path,
    sync::{Arc, Mutex},
};

/// SQLite executor over a single rusqlite connection.
///
/// The connection is serialized behind a mutex; queries run inline on the
/// calling task. Good enough for the reference driver and the integration
/// suite. Production traffic belongs on a server-grade engine.
#[derive(Debug)]
pub struct Sqlite {
    connection: Mutex<Connection>,
}

impl Sqlite {
    /// Create an in-memory SQLite database.
    pub fn in_memory() -> Result<Self> {
        let connection = Connection::open_in_memory().map_err(Error::driver)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Open a SQLite database at the specified file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).map_err(Error::driver)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Run raw statements (DDL, seed data) outside the query contract.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        let connection = self.lock();
        connection.execute_batch(sql).map_err(Error::driver)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.connection
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn run(&self, stmt: &SqlStatement) -> Result<Vec<Row>> {
        let connection = self.lock();
        let mut prepared = connection.prepare(&stmt.sql).map_err(Error::driver)?;

        let columns: Arc<[String]> = prepared
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>()
            .into();

        for param in &stmt.params {
            let placeholder = format!(":{}", param.name);
            let index = prepared
                .parameter_index(&placeholder)
                .map_err(Error::driver)?
                .ok_or_else(|| {
                    quarry_core::err!("statement has no parameter named `{}`", param.name)
                })?;
            prepared
                .raw_bind_parameter(index, Value(&param.value))
                .map_err(Error::driver)?;
        }

        let mut rows = Vec::new();
        let mut raw = prepared.raw_query();
        while let Some(row) = raw.next().map_err(Error::driver)? {
            let mut values = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                let value = row.get_ref(index).map_err(Error::driver)?;
                values.push(value::from_sql(value).map_err(Error::driver)?);
            }
            rows.push(Row::new(columns.clone(), values));
        }

        Ok(rows)
    }
}

#[async_trait]
impl Executor for Sqlite {
    fn capability(&self) -> &Capability {
        &Capability::SQLITE
    }

    async fn query(&self, stmt: &SqlStatement) -> Result<Vec<Row>> {
        self.run(stmt)
    }

    async fn query_count(&self, stmt: &SqlStatement) -> Result<u64> {
        let rows = self.run(stmt)?;

        let count = rows
            .first()
            .and_then(|row| row.values().first())
            .and_then(CoreValue::as_i64)
            .ok_or_else(|| quarry_core::err!("count query returned no count row"))?;

        Ok(count as u64)
    }
}
