//! Hand-written SQL with `?` markers, filled and run later.

use super::execute::{Dispatch, Fetch};
use super::Session;
use crate::connection::Connection;
use crate::error::ChainResult;
use crate::row::{Representation, Row};
use crate::sql::StatementKind;
use crate::value::{fill_placeholders, Value};

/// SQL text with its placeholders already filled. Running it never touches the
/// result cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prepared {
    sql: String,
}

impl Prepared {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Execute as a write and return the affected count, whatever the statement is.
    pub fn exec(&self, session: &mut Session<impl Connection>) -> ChainResult<u64> {
        let opts = Dispatch {
            kind: StatementKind::Write,
            fetch: Fetch::All,
            repr: Representation::Object,
            ttl: None,
        };
        Ok(session.dispatch(&self.sql, opts)?.affected())
    }

    /// Run as a read and return the first row.
    pub fn fetch(&self, session: &mut Session<impl Connection>) -> ChainResult<Option<Row>> {
        Ok(self.read(session, Fetch::One)?.into_iter().next())
    }

    /// Run as a read and return every row.
    pub fn fetch_all(&self, session: &mut Session<impl Connection>) -> ChainResult<Vec<Row>> {
        self.read(session, Fetch::All)
    }

    fn read(&self, session: &mut Session<impl Connection>, fetch: Fetch) -> ChainResult<Vec<Row>> {
        let opts = Dispatch {
            kind: StatementKind::Read,
            fetch,
            repr: Representation::Object,
            ttl: None,
        };
        Ok(session.dispatch(&self.sql, opts)?.into_rows())
    }
}

impl<C: Connection> Session<C> {
    /// Fill `?` markers positionally with escaped `values` without executing.
    /// Markers with no matching value are left as they are.
    ///
    /// ```ignore
    /// let rows = session
    ///     .prepare("SELECT * FROM users WHERE age > ? AND name LIKE ?", &[18.into(), "a%".into()])
    ///     .fetch_all(&mut session)?;
    /// ```
    pub fn prepare(&mut self, sql: &str, values: &[Value]) -> Prepared {
        let sql = fill_placeholders(sql, values, self.dialect);
        self.last_query = Some(sql.clone());
        Prepared { sql }
    }
}
