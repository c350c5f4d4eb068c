//! Fluent statement builder.
//!
//! A [`Query`] accumulates clauses through consuming method calls and compiles to
//! SQL text with every value escaped for the active [`Dialect`](crate::Dialect).
//! Identifiers (tables, columns, join conditions) are written verbatim.
//!
//! # Usage
//!
//! ```ignore
//! use sqlchain::{qb, Op};
//!
//! // Compile only
//! let sql = qb::table("users")
//!     .select("id, name")
//!     .where_(("status", "active"))
//!     .where_(("age", Op::Ge, 18))
//!     .order_by_dir("created_at", "desc")
//!     .limit(20)
//!     .to_select_sql()?;
//!
//! // Execute through a session
//! let rows = session
//!     .table("users")
//!     .where_in("id", [1, 2, 3])
//!     .get_all(&mut session)?;
//! ```

mod compile;
mod expr;
mod join;
mod query;


pub use compile::{Insert, Maintenance};
pub use expr::{render_clauses, Clause, Connector, Expr, Filter, Op};
pub use join::{Join, JoinKind, JoinOn};
pub use query::Query;

/// Start a statement on `table` with the default dialect and no prefix.
pub fn table(table: &str) -> Query {
    Query::new().table(table)
}
