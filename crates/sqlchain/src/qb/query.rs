//! Per-statement clause accumulator.

use crate::qb::expr::{Clause, Connector, Expr, Filter};
use crate::qb::join::{Join, JoinKind, JoinOn};
use crate::value::{Dialect, Value};
use std::time::Duration;

/// Statement under construction.
///
/// A `Query` is an owned value: clause methods consume and return it, and a terminal
/// call (`get_all`, `insert`, `delete`, ...) consumes it for good. Table names are
/// stored bare and prefixed when the statement is compiled.
#[derive(Clone, Debug, Default)]
pub struct Query {
    pub(crate) dialect: Dialect,
    pub(crate) prefix: String,
    pub(crate) tables: Vec<String>,
    /// Empty means `*`.
    pub(crate) select_list: Vec<String>,
    pub(crate) joins: Vec<Join>,
    pub(crate) clauses: Vec<Clause>,
    pub(crate) group_by: Option<String>,
    pub(crate) having: Option<Filter>,
    pub(crate) order_by: Option<String>,
    pub(crate) limit: Option<String>,
    pub(crate) offset: Option<u64>,
    pub(crate) cache_ttl: Option<Duration>,
    pub(crate) build_error: Option<String>,
}

impl Query {
    /// Empty statement using the MySQL dialect and no prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Literal quoting dialect.
    pub fn dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Prefix written before every table and join table.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    // ==================== source ====================

    /// Set the source table. A comma-separated list selects several tables.
    pub fn table(mut self, table: &str) -> Self {
        self.tables = table
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    /// Set several source tables.
    pub fn tables(mut self, tables: &[&str]) -> Self {
        self.tables = tables.iter().map(|t| t.trim().to_string()).collect();
        self
    }

    // ==================== select list ====================

    /// Append select expressions. Replaces the default `*`.
    pub fn select(mut self, fields: &str) -> Self {
        self.select_list.push(fields.to_string());
        self
    }

    pub fn select_cols(mut self, fields: &[&str]) -> Self {
        if !fields.is_empty() {
            self.select_list.push(fields.join(", "));
        }
        self
    }

    fn aggregate(mut self, func: &str, field: &str, alias: Option<&str>) -> Self {
        let column = match alias {
            Some(alias) => format!("{func}({field}) AS {alias}"),
            None => format!("{func}({field})"),
        };
        self.select_list.push(column);
        self
    }

    /// `MAX(field) [AS alias]`
    pub fn max(self, field: &str, alias: Option<&str>) -> Self {
        self.aggregate("MAX", field, alias)
    }

    pub fn min(self, field: &str, alias: Option<&str>) -> Self {
        self.aggregate("MIN", field, alias)
    }

    pub fn sum(self, field: &str, alias: Option<&str>) -> Self {
        self.aggregate("SUM", field, alias)
    }

    pub fn avg(self, field: &str, alias: Option<&str>) -> Self {
        self.aggregate("AVG", field, alias)
    }

    pub fn count(self, field: &str, alias: Option<&str>) -> Self {
        self.aggregate("COUNT", field, alias)
    }

    // ==================== joins ====================

    /// Add a join of any kind.
    pub fn join(mut self, kind: JoinKind, table: &str, on: impl Into<JoinOn>) -> Self {
        self.joins.push(Join {
            kind,
            table: table.trim().to_string(),
            on: on.into(),
        });
        self
    }

    pub fn inner_join(self, table: &str, on: impl Into<JoinOn>) -> Self {
        self.join(JoinKind::Inner, table, on)
    }

    pub fn left_join(self, table: &str, on: impl Into<JoinOn>) -> Self {
        self.join(JoinKind::Left, table, on)
    }

    pub fn right_join(self, table: &str, on: impl Into<JoinOn>) -> Self {
        self.join(JoinKind::Right, table, on)
    }

    pub fn full_outer_join(self, table: &str, on: impl Into<JoinOn>) -> Self {
        self.join(JoinKind::FullOuter, table, on)
    }

    pub fn left_outer_join(self, table: &str, on: impl Into<JoinOn>) -> Self {
        self.join(JoinKind::LeftOuter, table, on)
    }

    pub fn right_outer_join(self, table: &str, on: impl Into<JoinOn>) -> Self {
        self.join(JoinKind::RightOuter, table, on)
    }

    // ==================== WHERE ====================

    fn push(mut self, connector: Connector, negated: bool, expr: Expr) -> Self {
        self.clauses.push(Clause::new(connector, negated, expr));
        self
    }

    fn push_filter(self, connector: Connector, negated: bool, filter: Filter) -> Self {
        // Empty maps and blank fragments add nothing.
        if filter.is_empty() {
            return self;
        }
        self.push(connector, negated, Expr::Filter(filter))
    }

    /// AND a condition.
    ///
    /// ```ignore
    /// q.where_(("status", "active"))               // status = 'active'
    ///  .where_(("age", Op::Ge, 18))                // AND age >= 18
    ///  .where_(Filter::template("a = ? OR b = ?", [1, 2]))
    /// ```
    pub fn where_(self, filter: impl Into<Filter>) -> Self {
        self.push_filter(Connector::And, false, filter.into())
    }

    pub fn or_where(self, filter: impl Into<Filter>) -> Self {
        self.push_filter(Connector::Or, false, filter.into())
    }

    pub fn not_where(self, filter: impl Into<Filter>) -> Self {
        self.push_filter(Connector::And, true, filter.into())
    }

    pub fn or_not_where(self, filter: impl Into<Filter>) -> Self {
        self.push_filter(Connector::Or, true, filter.into())
    }

    fn in_list<V, I>(self, connector: Connector, negated: bool, field: &str, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        let expr = Expr::InList {
            field: field.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        };
        self.push(connector, negated, expr)
    }

    /// AND `field IN (...)`.
    pub fn where_in<V: Into<Value>, I: IntoIterator<Item = V>>(self, field: &str, values: I) -> Self {
        self.in_list(Connector::And, false, field, values)
    }

    pub fn or_where_in<V: Into<Value>, I: IntoIterator<Item = V>>(self, field: &str, values: I) -> Self {
        self.in_list(Connector::Or, false, field, values)
    }

    pub fn where_not_in<V: Into<Value>, I: IntoIterator<Item = V>>(self, field: &str, values: I) -> Self {
        self.in_list(Connector::And, true, field, values)
    }

    pub fn or_where_not_in<V: Into<Value>, I: IntoIterator<Item = V>>(self, field: &str, values: I) -> Self {
        self.in_list(Connector::Or, true, field, values)
    }

    fn between_impl(
        self,
        connector: Connector,
        negated: bool,
        field: &str,
        low: Value,
        high: Value,
    ) -> Self {
        let expr = Expr::Between {
            field: field.to_string(),
            low,
            high,
        };
        self.push(connector, negated, expr)
    }

    /// AND `(field BETWEEN low AND high)`.
    pub fn between(self, field: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.between_impl(Connector::And, false, field, low.into(), high.into())
    }

    pub fn or_between(self, field: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.between_impl(Connector::Or, false, field, low.into(), high.into())
    }

    pub fn not_between(self, field: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.between_impl(Connector::And, true, field, low.into(), high.into())
    }

    pub fn or_not_between(self, field: &str, low: impl Into<Value>, high: impl Into<Value>) -> Self {
        self.between_impl(Connector::Or, true, field, low.into(), high.into())
    }

    fn like_impl(self, connector: Connector, negated: bool, field: &str, pattern: Value) -> Self {
        let expr = Expr::Like {
            field: field.to_string(),
            pattern,
        };
        self.push(connector, negated, expr)
    }

    /// AND `field LIKE pattern`.
    pub fn like(self, field: &str, pattern: impl Into<Value>) -> Self {
        self.like_impl(Connector::And, false, field, pattern.into())
    }

    pub fn or_like(self, field: &str, pattern: impl Into<Value>) -> Self {
        self.like_impl(Connector::Or, false, field, pattern.into())
    }

    pub fn not_like(self, field: &str, pattern: impl Into<Value>) -> Self {
        self.like_impl(Connector::And, true, field, pattern.into())
    }

    pub fn or_not_like(self, field: &str, pattern: impl Into<Value>) -> Self {
        self.like_impl(Connector::Or, true, field, pattern.into())
    }

    /// AND `field IS NULL`.
    pub fn where_null(self, field: &str) -> Self {
        let expr = Expr::NullCheck {
            field: field.to_string(),
        };
        self.push(Connector::And, false, expr)
    }

    /// AND `field IS NOT NULL`.
    pub fn where_not_null(self, field: &str) -> Self {
        let expr = Expr::NullCheck {
            field: field.to_string(),
        };
        self.push(Connector::And, true, expr)
    }

    pub fn or_where_null(self, field: &str) -> Self {
        let expr = Expr::NullCheck {
            field: field.to_string(),
        };
        self.push(Connector::Or, false, expr)
    }

    pub fn or_where_not_null(self, field: &str) -> Self {
        let expr = Expr::NullCheck {
            field: field.to_string(),
        };
        self.push(Connector::Or, true, expr)
    }

    /// Parenthesise the conditions added by `build`.
    ///
    /// The group attaches to the outer predicate with the connector of its first
    /// inner condition, so `or_where` as the first inner call yields `... OR (...)`.
    /// A group with no conditions is recorded as a build error. The closure may only
    /// add conditions; tables, columns, joins, grouping, ordering, paging or caching
    /// set inside it are recorded as a build error too.
    ///
    /// ```ignore
    /// q.where_(("status", "active"))
    ///  .group(|g| g.where_(("role", "admin")).or_where(("role", "owner")))
    /// // status = 'active' AND (role = 'admin' OR role = 'owner')
    /// ```
    pub fn group<F>(mut self, build: F) -> Self
    where
        F: FnOnce(Query) -> Query,
    {
        let inner = build(Query::new().dialect(self.dialect));
        if let Some(err) = inner.build_error {
            self.build_error.get_or_insert(err);
            return self;
        }
        if inner.has_statement_state() {
            self.build_error.get_or_insert_with(|| {
                "condition group may only add conditions".to_string()
            });
            return self;
        }
        let Some(connector) = inner.clauses.first().map(|c| c.connector) else {
            self.build_error
                .get_or_insert_with(|| "empty condition group".to_string());
            return self;
        };
        self.push(connector, false, Expr::Group(inner.clauses))
    }

    fn has_statement_state(&self) -> bool {
        !self.tables.is_empty()
            || !self.select_list.is_empty()
            || !self.joins.is_empty()
            || self.group_by.is_some()
            || self.having.is_some()
            || self.order_by.is_some()
            || self.limit.is_some()
            || self.offset.is_some()
            || self.cache_ttl.is_some()
    }

    // ==================== grouping / ordering / paging ====================

    /// Set GROUP BY (replaces any previous value).
    pub fn group_by(mut self, fields: &str) -> Self {
        self.group_by = Some(fields.to_string());
        self
    }

    pub fn group_by_cols(mut self, fields: &[&str]) -> Self {
        self.group_by = Some(fields.join(", "));
        self
    }

    /// Set HAVING (replaces any previous value). An omitted operator means `>`.
    pub fn having(mut self, filter: impl Into<Filter>) -> Self {
        let filter = filter.into();
        self.having = (!filter.is_empty()).then_some(filter);
        self
    }

    /// Set ORDER BY. `ASC` is appended unless the text already carries a direction
    /// (contains a space) or is `rand()`.
    pub fn order_by(mut self, field: &str) -> Self {
        let field = field.trim();
        self.order_by = if field.contains(' ') || field.eq_ignore_ascii_case("rand()") {
            Some(field.to_string())
        } else {
            Some(format!("{field} ASC"))
        };
        self
    }

    /// Set ORDER BY with an explicit direction.
    pub fn order_by_dir(mut self, field: &str, dir: &str) -> Self {
        self.order_by = Some(format!("{} {}", field.trim(), dir.trim().to_uppercase()));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit.to_string());
        self
    }

    /// `LIMIT offset, count`
    pub fn limit_range(mut self, offset: u64, count: u64) -> Self {
        self.limit = Some(format!("{offset}, {count}"));
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Page through results. Pages are 1-based; a page below 1 is treated as 1.
    /// An offset past `u64::MAX` is clamped.
    pub fn pagination(mut self, per_page: u64, page: i64) -> Self {
        let page = u64::try_from(page.max(1)).unwrap_or(1);
        self.limit = Some(per_page.to_string());
        self.offset = Some((page - 1).saturating_mul(per_page));
        self
    }

    // ==================== cache ====================

    /// Serve this statement from the result cache when a fresh entry exists, and
    /// store the result for `ttl` otherwise. Applies to this statement only.
    pub fn cache(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }
}
