//! Statement compilation.
//!
//! Every compiler is a pure function of the accumulated [`Query`] state. Calling one
//! of these instead of an executing terminal is the "compile only" mode.

use crate::error::{ChainError, ChainResult};
use crate::qb::expr::{render_clauses, Op};
use crate::qb::query::Query;
use crate::value::{escape, Value};

/// Rows for an INSERT. The column list comes from the first row; later rows
/// contribute their values positionally.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Insert {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Insert {
    /// A single row of column/value pairs.
    pub fn row<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let (columns, values) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self {
            columns,
            rows: vec![values],
        }
    }

    /// Several rows inserted with one statement.
    ///
    /// ```ignore
    /// Insert::rows([[("a", 1), ("b", 2)], [("a", 3), ("b", 4)]])
    /// // (a, b) VALUES (1, 2), (3, 4)
    /// ```
    pub fn rows<R, K, V, I>(rows: R) -> Self
    where
        R: IntoIterator<Item = I>,
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut insert = Self::default();
        for (idx, row) in rows.into_iter().enumerate() {
            let single = Self::row(row);
            if idx == 0 {
                insert.columns = single.columns;
            }
            insert.rows.extend(single.rows);
        }
        insert
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty() || self.columns.is_empty()
    }
}

/// Table maintenance statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Maintenance {
    Analyze,
    Check,
    Checksum,
    Optimize,
    Repair,
}

impl Maintenance {
    pub fn keyword(self) -> &'static str {
        match self {
            Maintenance::Analyze => "ANALYZE",
            Maintenance::Check => "CHECK",
            Maintenance::Checksum => "CHECKSUM",
            Maintenance::Optimize => "OPTIMIZE",
            Maintenance::Repair => "REPAIR",
        }
    }
}

impl Query {
    /// Fail if the accumulated state cannot produce a statement.
    pub fn validate(&self) -> ChainResult<()> {
        if let Some(err) = &self.build_error {
            return Err(ChainError::validation(err.clone()));
        }
        if self.tables.is_empty() {
            return Err(ChainError::validation("no table selected"));
        }
        Ok(())
    }

    /// Prefixed, comma-joined table list.
    pub(crate) fn source(&self) -> String {
        self.tables
            .iter()
            .map(|t| format!("{}{t}", self.prefix))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn where_sql(&self) -> Option<String> {
        (!self.clauses.is_empty()).then(|| render_clauses(&self.clauses, self.dialect))
    }

    /// Append ` WHERE .. ORDER BY .. LIMIT ..` (shared by SELECT/UPDATE/DELETE).
    fn push_tail(&self, sql: &mut String, with_group: bool) {
        if let Some(predicate) = self.where_sql() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate);
        }
        if with_group {
            if let Some(group_by) = &self.group_by {
                sql.push_str(" GROUP BY ");
                sql.push_str(group_by);
            }
            if let Some(having) = &self.having {
                sql.push_str(" HAVING ");
                sql.push_str(&having.render(Op::Gt, false, self.dialect));
            }
        }
        if let Some(order_by) = &self.order_by {
            sql.push_str(" ORDER BY ");
            sql.push_str(order_by);
        }
        if let Some(limit) = &self.limit {
            sql.push_str(" LIMIT ");
            sql.push_str(limit);
        }
    }

    /// `SELECT .. FROM .. [JOIN ..] [WHERE ..] [GROUP BY ..] [HAVING ..] [ORDER BY ..] [LIMIT ..] [OFFSET ..]`
    pub fn to_select_sql(&self) -> ChainResult<String> {
        self.validate()?;
        let select = if self.select_list.is_empty() {
            "*".to_string()
        } else {
            self.select_list.join(", ")
        };

        let mut sql = format!("SELECT {select} FROM {}", self.source());
        for join in &self.joins {
            let mut join = join.clone();
            join.table = format!("{}{}", self.prefix, join.table);
            sql.push_str(&join.render());
        }
        self.push_tail(&mut sql, true);
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }
        Ok(sql)
    }

    /// SELECT with `LIMIT 1`.
    pub fn to_first_sql(&self) -> ChainResult<String> {
        let mut first = self.clone();
        first.limit = Some("1".to_string());
        first.to_select_sql()
    }

    pub fn to_insert_sql(&self, insert: &Insert) -> ChainResult<String> {
        self.validate()?;
        if insert.is_empty() {
            return Err(ChainError::validation("insert without values"));
        }
        let rows = insert
            .rows
            .iter()
            .map(|row| {
                let values = row
                    .iter()
                    .map(|v| escape(v, self.dialect))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("({values})")
            })
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!(
            "INSERT INTO {} ({}) VALUES {rows}",
            self.source(),
            insert.columns.join(", ")
        ))
    }

    /// `UPDATE .. SET col=val, .. [WHERE ..] [ORDER BY ..] [LIMIT ..]`
    pub fn to_update_sql<K: AsRef<str>>(&self, set: &[(K, Value)]) -> ChainResult<String> {
        self.validate()?;
        if set.is_empty() {
            return Err(ChainError::validation("update without assignments"));
        }
        let assignments = set
            .iter()
            .map(|(col, val)| format!("{}={}", col.as_ref(), escape(val, self.dialect)))
            .collect::<Vec<_>>()
            .join(", ");
        let mut sql = format!("UPDATE {} SET {assignments}", self.source());
        self.push_tail(&mut sql, false);
        Ok(sql)
    }

    /// `DELETE FROM ..`; with no WHERE, ORDER BY or LIMIT this becomes `TRUNCATE TABLE ..`.
    pub fn to_delete_sql(&self) -> ChainResult<String> {
        self.validate()?;
        let source = self.source();
        let bare = format!("DELETE FROM {source}");
        let mut sql = bare.clone();
        self.push_tail(&mut sql, false);
        if sql == bare {
            return Ok(format!("TRUNCATE TABLE {source}"));
        }
        Ok(sql)
    }

    /// `ANALYZE TABLE ..` and friends. Only the source table is used.
    pub fn to_maintenance_sql(&self, op: Maintenance) -> ChainResult<String> {
        self.validate()?;
        Ok(format!("{} TABLE {}", op.keyword(), self.source()))
    }
}
