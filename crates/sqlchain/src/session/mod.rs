//! Long-lived execution state shared by every statement.
//!
//! A [`Session`] owns the connection and the bookkeeping that outlives a single
//! statement: counters, the last statement text and error, transaction depth and the
//! registered monitors. Statements themselves are built as [`Query`] values obtained
//! from [`Session::table`] and handed back to the session by their terminal call.

mod execute;
mod prepared;

pub use execute::{Fetch, Outcome};
pub use prepared::Prepared;

use crate::cache::{CacheStore, FileCacheStore, ResultCache};
use crate::config::{DbConfig, ErrorMode};
use crate::connection::Connection;
use crate::error::{ChainError, ChainResult};
use crate::monitor::{QueryContext, QueryMonitor, QueryResult};
use crate::qb::Query;
use crate::value::{escape, Dialect, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Statement execution session over a [`Connection`].
pub struct Session<C: Connection> {
    pub(crate) conn: C,
    pub(crate) dialect: Dialect,
    prefix: String,
    error_mode: ErrorMode,
    cache_dir: PathBuf,
    cache_store: Option<Arc<dyn CacheStore>>,
    pub(crate) num_rows: usize,
    pub(crate) insert_id: Option<String>,
    pub(crate) query_count: u64,
    pub(crate) last_query: Option<String>,
    pub(crate) last_error: Option<String>,
    pub(crate) depth: u32,
    monitors: Vec<Arc<dyn QueryMonitor>>,
}

impl<C: Connection> Session<C> {
    /// Wrap an open connection and run the driver's post-connect statements.
    pub fn new(mut conn: C, config: &DbConfig) -> ChainResult<Self> {
        for stmt in config.init_statements() {
            conn.exec_raw(&stmt)
                .map_err(|e| ChainError::Connection(format!("{}: {e}", config.dsn())))?;
        }
        tracing::debug!(
            target: "sqlchain.sql",
            driver = %config.driver,
            prefix = %config.prefix,
            "session opened"
        );
        Ok(Self {
            dialect: conn.dialect(),
            conn,
            prefix: config.prefix.clone(),
            error_mode: config.error_mode(),
            cache_dir: config.cache_dir.clone(),
            cache_store: None,
            num_rows: 0,
            insert_id: None,
            query_count: 0,
            last_query: None,
            last_error: None,
            depth: 0,
            monitors: Vec::new(),
        })
    }

    /// Register a monitor.
    pub fn with_monitor<M: QueryMonitor + 'static>(mut self, monitor: M) -> Self {
        self.monitors.push(Arc::new(monitor));
        self
    }

    /// Register a monitor the caller keeps a handle to (e.g. a shared `StatsMonitor`).
    pub fn with_shared_monitor(mut self, monitor: Arc<dyn QueryMonitor>) -> Self {
        self.monitors.push(monitor);
        self
    }

    /// Replace the file cache under `cache_dir` with another store.
    pub fn with_cache_store<S: CacheStore + 'static>(mut self, store: S) -> Self {
        self.cache_store = Some(Arc::new(store));
        self
    }

    pub fn set_error_mode(&mut self, mode: ErrorMode) {
        self.error_mode = mode;
    }

    /// Start a statement on `table` (prefix and dialect taken from this session).
    pub fn table(&self, table: &str) -> Query {
        self.query_builder().table(table)
    }

    /// Start a statement on several tables.
    pub fn tables(&self, tables: &[&str]) -> Query {
        self.query_builder().tables(tables)
    }

    fn query_builder(&self) -> Query {
        Query::new().dialect(self.dialect).prefix(self.prefix.clone())
    }

    /// Render a value as a literal for this connection's dialect.
    pub fn escape(&self, value: impl Into<Value>) -> String {
        escape(&value.into(), self.dialect)
    }

    // ==================== introspection ====================

    /// Rows returned by the last read, or affected by the last write.
    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    /// Identifier generated by the last successful insert.
    pub fn insert_id(&self) -> Option<&str> {
        self.insert_id.as_deref()
    }

    /// Statements run so far, successful or not (cache hits included).
    pub fn query_count(&self) -> u64 {
        self.query_count
    }

    /// Text of the last statement (compiled or prepared).
    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Driver message of the most recent failure.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn error_mode(&self) -> ErrorMode {
        self.error_mode
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn into_inner(self) -> C {
        self.conn
    }

    // ==================== internals ====================

    pub(crate) fn cache_gate(&mut self, ttl: Duration) -> ChainResult<ResultCache<Arc<dyn CacheStore>>> {
        let store = match &self.cache_store {
            Some(store) => Arc::clone(store),
            None => {
                let store: Arc<dyn CacheStore> = Arc::new(FileCacheStore::new(&self.cache_dir)?);
                self.cache_store = Some(Arc::clone(&store));
                store
            }
        };
        Ok(ResultCache::new(store, ttl))
    }

    pub(crate) fn notify_start(&self, ctx: &QueryContext) {
        for monitor in &self.monitors {
            monitor.on_query_start(ctx);
        }
    }

    pub(crate) fn notify_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
        for monitor in &self.monitors {
            monitor.on_query_complete(ctx, duration, result);
        }
    }

    /// Record a driver failure for `sql` and surface it per the error mode.
    pub(crate) fn fail<T>(&mut self, err: ChainError, sql: &str) -> ChainResult<T> {
        let message = match err {
            ChainError::Statement { message, .. } => message,
            other => other.to_string(),
        };
        tracing::error!(target: "sqlchain.sql", error = %message, sql = %sql, "statement failed");
        self.last_error = Some(message.clone());
        match self.error_mode {
            ErrorMode::Debug => panic!("Query: {sql}\nError: {message}"),
            ErrorMode::Strict => Err(ChainError::statement(message, sql)),
        }
    }
}

#[cfg(feature = "sqlite")]
impl Session<crate::sqlite::SqliteConnection> {
    /// Open a session from configuration. Only the `sqlite` driver is built in;
    /// other drivers are used through [`Session::new`] with their own [`Connection`].
    pub fn open(config: &DbConfig) -> ChainResult<Self> {
        if config.driver != crate::config::Driver::Sqlite {
            return Err(ChainError::Connection(format!(
                "no built-in connection for driver '{}'",
                config.driver
            )));
        }
        let conn = crate::sqlite::SqliteConnection::open(config)?;
        Self::new(conn, config)
    }
}
