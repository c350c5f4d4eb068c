//! SQLite backend over `rusqlite`.

use crate::config::DbConfig;
use crate::connection::Connection;
use crate::error::{ChainError, ChainResult};
use crate::row::Row;
use crate::value::{Dialect, Value};
use rusqlite::types::Value as SqliteValue;
use std::sync::Arc;

/// A [`Connection`] backed by a single `rusqlite::Connection`.
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    /// Open the database named by `config.database`. An empty name or `:memory:`
    /// opens a private in-memory database.
    pub fn open(config: &DbConfig) -> ChainResult<Self> {
        let conn = match config.database.as_str() {
            "" | ":memory:" => rusqlite::Connection::open_in_memory(),
            path => rusqlite::Connection::open(path),
        }
        .map_err(|e| ChainError::Connection(format!("{}: {e}", config.dsn())))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> ChainResult<Self> {
        Self::open(&DbConfig::sqlite(":memory:"))
    }

    /// Wrap an already opened connection.
    pub fn from_raw(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    /// The underlying `rusqlite` handle.
    pub fn raw(&self) -> &rusqlite::Connection {
        &self.conn
    }
}

fn convert(value: SqliteValue) -> Value {
    match value {
        SqliteValue::Null => Value::Null,
        SqliteValue::Integer(i) => Value::Int(i),
        SqliteValue::Real(f) => Value::Float(f),
        SqliteValue::Text(s) => Value::Text(s),
        SqliteValue::Blob(b) => Value::Text(String::from_utf8_lossy(&b).into_owned()),
    }
}

fn driver_error(err: rusqlite::Error, sql: &str) -> ChainError {
    ChainError::statement(err.to_string(), sql)
}

impl Connection for SqliteConnection {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn query(&mut self, sql: &str) -> ChainResult<Vec<Row>> {
        let mut stmt = self.conn.prepare(sql).map_err(|e| driver_error(e, sql))?;
        let columns: Arc<[String]> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
            .into();
        let width = columns.len();

        let mut rows = stmt.query([]).map_err(|e| driver_error(e, sql))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(|e| driver_error(e, sql))? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                let raw: SqliteValue = row.get(idx).map_err(|e| driver_error(e, sql))?;
                values.push(convert(raw));
            }
            out.push(Row::new(Arc::clone(&columns), values));
        }
        Ok(out)
    }

    fn execute(&mut self, sql: &str) -> ChainResult<u64> {
        let affected = self.conn.execute(sql, []).map_err(|e| driver_error(e, sql))?;
        Ok(affected as u64)
    }

    fn last_insert_id(&mut self) -> Option<String> {
        match self.conn.last_insert_rowid() {
            0 => None,
            id => Some(id.to_string()),
        }
    }

    fn begin_transaction(&mut self) -> ChainResult<()> {
        self.exec_raw("BEGIN")
    }

    fn commit(&mut self) -> ChainResult<()> {
        self.exec_raw("COMMIT")
    }

    fn rollback(&mut self) -> ChainResult<()> {
        self.exec_raw("ROLLBACK")
    }

    fn exec_raw(&mut self, sql: &str) -> ChainResult<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| driver_error(e, sql))
    }
}
