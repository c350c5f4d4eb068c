//! Statement monitoring.
//!
//! Monitors registered on a [`Session`](crate::Session) are told about every statement
//! it runs, including reads answered from the result cache and failed statements.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlchain::monitor::{QueryContext, QueryMonitor, QueryResult, StatsMonitor, TracingMonitor};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct SlowLog;
//!
//! impl QueryMonitor for SlowLog {
//!     fn on_query_complete(&self, ctx: &QueryContext, duration: Duration, result: &QueryResult) {
//!         if duration > Duration::from_millis(200) {
//!             tracing::warn!(sql = %ctx.sql, %result, "slow statement");
//!         }
//!     }
//! }
//!
//! let stats = Arc::new(StatsMonitor::new());
//! let session = Session::open(&config)?
//!     .with_monitor(TracingMonitor::new())
//!     .with_monitor(SlowLog)
//!     .with_shared_monitor(stats.clone());
//! ```

mod monitors;
mod types;

#[cfg(test)]
mod tests;

pub use monitors::{NoopMonitor, QueryStats, StatsMonitor, TracingMonitor};
pub use types::{QueryContext, QueryMonitor, QueryResult, QueryType};

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}
