//! Driver contract consumed by [`Session`](crate::Session).

use crate::error::ChainResult;
use crate::row::Row;
use crate::value::Dialect;

/// A blocking database connection.
///
/// Implementations report driver failures as [`ChainError::Statement`](crate::ChainError)
/// or any other `ChainError`; the session attaches the offending SQL and applies the
/// configured [`ErrorMode`](crate::ErrorMode).
///
/// Access is serialised by the `&mut self` receivers: a connection shared between
/// sessions must be wrapped by the caller.
pub trait Connection {
    /// Literal quoting dialect of this driver.
    fn dialect(&self) -> Dialect;

    /// Run a row-returning statement and return all rows.
    fn query(&mut self, sql: &str) -> ChainResult<Vec<Row>>;

    /// Run a statement and return the number of affected rows.
    fn execute(&mut self, sql: &str) -> ChainResult<u64>;

    /// Identifier generated by the most recent insert, if the driver reports one.
    fn last_insert_id(&mut self) -> Option<String>;

    /// Start a real (outermost) transaction.
    fn begin_transaction(&mut self) -> ChainResult<()>;

    /// Commit the outermost transaction.
    fn commit(&mut self) -> ChainResult<()>;

    /// Roll back the outermost transaction.
    fn rollback(&mut self) -> ChainResult<()>;

    /// Run a statement whose result is ignored (savepoints, session settings).
    fn exec_raw(&mut self, sql: &str) -> ChainResult<()> {
        self.execute(sql).map(|_| ())
    }
}

impl<C: Connection + ?Sized> Connection for Box<C> {
    fn dialect(&self) -> Dialect {
        (**self).dialect()
    }

    fn query(&mut self, sql: &str) -> ChainResult<Vec<Row>> {
        (**self).query(sql)
    }

    fn execute(&mut self, sql: &str) -> ChainResult<u64> {
        (**self).execute(sql)
    }

    fn last_insert_id(&mut self) -> Option<String> {
        (**self).last_insert_id()
    }

    fn begin_transaction(&mut self) -> ChainResult<()> {
        (**self).begin_transaction()
    }

    fn commit(&mut self) -> ChainResult<()> {
        (**self).commit()
    }

    fn rollback(&mut self) -> ChainResult<()> {
        (**self).rollback()
    }

    fn exec_raw(&mut self, sql: &str) -> ChainResult<()> {
        (**self).exec_raw(sql)
    }
}
