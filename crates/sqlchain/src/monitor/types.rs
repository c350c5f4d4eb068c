use crate::sql::{starts_with_keyword, StatementKind};
use std::fmt;
use std::time::Duration;

/// The type of SQL operation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    /// SELECT query
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE or TRUNCATE statement
    Delete,
    /// ANALYZE / CHECK / CHECKSUM / OPTIMIZE / REPAIR TABLE
    Maintenance,
    /// Anything else (DDL, savepoints, session settings)
    Other,
}

impl QueryType {
    /// Detect query type from the leading keyword.
    pub fn from_sql(sql: &str) -> Self {
        let sql = sql.trim_start();
        if starts_with_keyword(sql, "SELECT") {
            QueryType::Select
        } else if starts_with_keyword(sql, "INSERT") {
            QueryType::Insert
        } else if starts_with_keyword(sql, "UPDATE") {
            QueryType::Update
        } else if starts_with_keyword(sql, "DELETE") || starts_with_keyword(sql, "TRUNCATE") {
            QueryType::Delete
        } else if ["ANALYZE", "CHECK", "CHECKSUM", "OPTIMIZE", "REPAIR"]
            .iter()
            .any(|kw| starts_with_keyword(sql, kw))
        {
            QueryType::Maintenance
        } else {
            QueryType::Other
        }
    }
}

/// Context information about the statement being executed.
#[derive(Debug, Clone)]
pub struct QueryContext {
    /// Normalised SQL text, as executed and as used for the cache key.
    pub sql: String,
    /// Detected query type.
    pub query_type: QueryType,
    /// Read (fetched) or write (executed).
    pub kind: StatementKind,
    /// Whether the result cache was consulted for this statement.
    pub cache_consulted: bool,
    /// Optional tag for identification.
    pub tag: Option<String>,
}

impl QueryContext {
    pub fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            query_type: QueryType::from_sql(sql),
            kind: StatementKind::classify(sql),
            cache_consulted: false,
            tag: None,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub(crate) fn with_cache(mut self, consulted: bool) -> Self {
        self.cache_consulted = consulted;
        self
    }
}

/// Maximum length for error messages in `QueryResult::Error`.
const MAX_ERROR_LEN: usize = 512;

/// Outcome of a statement for monitoring purposes.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Read returned rows from the database.
    Rows(usize),
    /// Write affected rows.
    Affected(u64),
    /// Read served from the result cache.
    Cached(usize),
    /// Statement failed (message truncated to 512 bytes).
    Error(String),
}

impl QueryResult {
    /// Create an error result, truncating the message.
    pub fn error(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        if msg.len() > MAX_ERROR_LEN {
            Self::Error(format!("{}...", super::truncate_sql_bytes(&msg, MAX_ERROR_LEN)))
        } else {
            Self::Error(msg)
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, QueryResult::Error(_))
    }
}

impl fmt::Display for QueryResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryResult::Rows(n) => write!(f, "{n} rows"),
            QueryResult::Affected(n) => write!(f, "{n} affected"),
            QueryResult::Cached(n) => write!(f, "{n} rows (cached)"),
            QueryResult::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// Trait for observing statement execution.
///
/// Implement this trait to collect metrics or forward events to an
/// observability system, then register it with
/// [`Session::with_monitor`](crate::Session::with_monitor).
pub trait QueryMonitor: Send + Sync {
    /// Called before a statement is executed or looked up in the cache.
    fn on_query_start(&self, _ctx: &QueryContext) {}

    /// Called after a statement completes (success, cache hit or failure).
    fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult);
}
