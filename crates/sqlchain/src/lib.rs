//! # sqlchain
//!
//! A fluent SQL statement builder over a pluggable database connection.
//!
//! ## Features
//!
//! - **Fluent builder**: clauses accumulate in any order and compile in SQL order
//! - **Escaped values**: every value is rendered as a dialect-aware literal
//! - **Result cache**: opt-in, per statement, keyed by the exact SQL text
//! - **Nested transactions**: one real transaction with savepoints for inner levels
//! - **Query monitoring**: counters, timing and `tracing` output for every statement
//!
//! ## Usage
//!
//! ```ignore
//! use sqlchain::{DbConfig, Insert, Op, Session};
//! use std::time::Duration;
//!
//! let mut session = Session::open(&DbConfig::sqlite("app.db").prefix("app_"))?;
//!
//! // SELECT with a one-minute result cache
//! let users = session
//!     .table("users")
//!     .where_(("age", Op::Ge, 18))
//!     .order_by("name")
//!     .cache(Duration::from_secs(60))
//!     .get_all(&mut session)?;
//!
//! // INSERT
//! let id = session
//!     .table("users")
//!     .insert(&mut session, &Insert::row([("name", "ada"), ("email", "ada@example.com")]))?;
//!
//! // UPDATE / DELETE
//! session.table("users").where_(("id", 1)).update(&mut session, &[("name", "grace".into())])?;
//! session.table("users").where_(("id", 2)).delete(&mut session)?;
//! ```

pub mod cache;
pub mod config;
pub mod connection;
pub mod error;
pub mod monitor;
pub mod qb;
pub mod row;
pub mod session;
pub mod sql;
pub mod transaction;
pub mod value;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use cache::{CacheEntry, CacheStore, CachedRows, FileCacheStore, ResultCache};
pub use config::{DbConfig, Driver, ErrorMode};
pub use connection::Connection;
pub use error::{ChainError, ChainResult};
pub use monitor::{
    NoopMonitor, QueryContext, QueryMonitor, QueryResult, QueryStats, QueryType, StatsMonitor,
    TracingMonitor,
};
pub use qb::{Filter, Insert, JoinKind, JoinOn, Maintenance, Op, Query};
pub use row::{FromRow, FromValue, Representation, Row};
pub use session::{Fetch, Outcome, Prepared, Session};
pub use sql::{normalize_sql, StatementKind};
pub use value::{escape, Dialect, Value};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;
