//! Nested transactions over a single real transaction.
//!
//! The outermost [`begin`](Session::begin) starts a real transaction; every nested
//! level opens a savepoint named `trans<depth>`. Inner commits are absorbed and only
//! the outermost commit reaches the database. An inner rollback undoes just its own
//! level with `ROLLBACK TO trans<n>`.
//!
//! # Example
//!
//! ```ignore
//! session.transaction(|s| {
//!     s.table("accounts").where_(("id", 1)).update(s, &[("balance", 90.into())])?;
//!
//!     // a failed inner level only undoes its own work
//!     let audit = s.transaction(|s| {
//!         s.table("audit").insert(s, &Insert::row([("event", "debit")]))
//!     });
//!     if let Err(e) = audit {
//!         tracing::warn!("audit skipped: {e}");
//!     }
//!     Ok(())
//! })?;
//! ```

use crate::connection::Connection;
use crate::error::{ChainError, ChainResult};
use crate::session::Session;

impl<C: Connection> Session<C> {
    /// Open a transaction level.
    pub fn begin(&mut self) -> ChainResult<()> {
        self.depth += 1;
        tracing::debug!(target: "sqlchain.sql", depth = self.depth, "begin");
        if self.depth == 1 {
            return match self.conn.begin_transaction() {
                Ok(()) => Ok(()),
                Err(err) => self.fail(err, "BEGIN"),
            };
        }
        let sql = format!("SAVEPOINT trans{}", self.depth);
        self.exec_step(&sql)
    }

    /// Close the current level. Only the outermost commit is sent to the database.
    pub fn commit(&mut self) -> ChainResult<()> {
        if self.depth == 0 {
            return Err(ChainError::Transaction(
                "commit without an open transaction".to_string(),
            ));
        }
        self.depth -= 1;
        tracing::debug!(target: "sqlchain.sql", depth = self.depth, "commit");
        if self.depth > 0 {
            return Ok(());
        }
        match self.conn.commit() {
            Ok(()) => Ok(()),
            Err(err) => self.fail(err, "COMMIT"),
        }
    }

    /// Undo the current level: back to its savepoint when nested, the whole
    /// transaction at the outermost level.
    pub fn rollback(&mut self) -> ChainResult<()> {
        if self.depth == 0 {
            return Err(ChainError::Transaction(
                "rollback without an open transaction".to_string(),
            ));
        }
        self.depth -= 1;
        tracing::debug!(target: "sqlchain.sql", depth = self.depth, "rollback");
        if self.depth > 0 {
            let sql = format!("ROLLBACK TO trans{}", self.depth + 1);
            return self.exec_step(&sql);
        }
        match self.conn.rollback() {
            Ok(()) => Ok(()),
            Err(err) => self.fail(err, "ROLLBACK"),
        }
    }

    /// Run `body` inside a transaction level: commit on `Ok`, roll back on `Err`.
    ///
    /// If the level cannot be opened the error is returned and the depth is left
    /// as it was, so the next call starts from the same level.
    pub fn transaction<T, F>(&mut self, body: F) -> ChainResult<T>
    where
        F: FnOnce(&mut Self) -> ChainResult<T>,
    {
        if let Err(err) = self.begin() {
            self.depth = self.depth.saturating_sub(1);
            return Err(err);
        }
        match body(self) {
            Ok(value) => {
                self.commit()?;
                Ok(value)
            }
            Err(error) => match self.rollback() {
                Ok(()) => Err(error),
                Err(rollback_err) => Err(ChainError::Other(format!(
                    "{error} (rollback failed: {rollback_err})"
                ))),
            },
        }
    }

    /// Number of open transaction levels.
    pub fn transaction_depth(&self) -> u32 {
        self.depth
    }

    pub fn in_transaction(&self) -> bool {
        self.depth > 0
    }

    fn exec_step(&mut self, sql: &str) -> ChainResult<()> {
        match self.conn.exec_raw(sql) {
            Ok(()) => Ok(()),
            Err(err) => self.fail(err, sql),
        }
    }
}
