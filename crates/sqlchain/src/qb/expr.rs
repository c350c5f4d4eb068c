//! Condition expression tree for WHERE / HAVING.
//!
//! Conditions are stored as [`Clause`]s in call order and rendered in a single pass
//! by [`render_clauses`]. Column names and operators are written verbatim; every
//! value goes through [`escape`](crate::value::escape).

use crate::error::ChainError;
use crate::value::{escape, fill_placeholders, Dialect, Value};
use std::fmt;
use std::str::FromStr;

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    /// `<>`
    NotEq,
}

impl Op {
    pub fn as_str(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Gt => ">",
            Op::Le => "<=",
            Op::Ge => ">=",
            Op::NotEq => "<>",
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Op {
    type Err = ChainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "=" => Ok(Op::Eq),
            "!=" => Ok(Op::Ne),
            "<" => Ok(Op::Lt),
            ">" => Ok(Op::Gt),
            "<=" => Ok(Op::Le),
            ">=" => Ok(Op::Ge),
            "<>" => Ok(Op::NotEq),
            other => Err(ChainError::validation(format!(
                "unsupported comparison operator: {other:?}"
            ))),
        }
    }
}

/// A single condition in one of its call shapes.
///
/// ```ignore
/// Filter::map([("status", "active"), ("role", "admin")]); // status='active' AND role='admin'
/// Filter::template("age > ? AND age < ?", [18, 65]);        // age > 18 AND age < 65
/// Filter::cmp("age", Op::Ge, 18);                           // age >= 18
/// Filter::from(("id", 5));                                  // id = 5 (WHERE) / id > 5 (HAVING)
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Column/value pairs, AND-joined as `col=val`.
    Map(Vec<(String, Value)>),
    /// SQL fragment with `?` markers filled positionally.
    Template(String, Vec<Value>),
    /// `col op val`
    Compare(String, Op, Value),
    /// Operator omitted: `=` inside WHERE, `>` inside HAVING.
    Implicit(String, Value),
}

impl Filter {
    pub fn map<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Filter::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn template<V, I>(sql: impl Into<String>, values: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Filter::Template(sql.into(), values.into_iter().map(Into::into).collect())
    }

    /// Raw SQL fragment with no values.
    pub fn raw(sql: impl Into<String>) -> Self {
        Filter::Template(sql.into(), Vec::new())
    }

    pub fn cmp(column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Filter::Compare(column.into(), op, value.into())
    }

    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Filter::Compare(column.into(), Op::Eq, value.into())
    }

    pub(crate) fn is_empty(&self) -> bool {
        match self {
            Filter::Map(pairs) => pairs.is_empty(),
            Filter::Template(sql, _) => sql.trim().is_empty(),
            Filter::Compare(..) | Filter::Implicit(..) => false,
        }
    }

    /// Render with `implicit` standing in for an omitted operator.
    pub(crate) fn render(&self, implicit: Op, negated: bool, dialect: Dialect) -> String {
        let not = if negated { "NOT " } else { "" };
        match self {
            Filter::Map(pairs) => pairs
                .iter()
                .map(|(col, val)| format!("{not}{col}={}", escape(val, dialect)))
                .collect::<Vec<_>>()
                .join(" AND "),
            Filter::Template(sql, values) => {
                format!("{not}{}", fill_placeholders(sql, values, dialect))
            }
            Filter::Compare(col, op, val) => {
                format!("{not}{col} {op} {}", escape(val, dialect))
            }
            Filter::Implicit(col, val) => {
                format!("{not}{col} {implicit} {}", escape(val, dialect))
            }
        }
    }
}

impl From<&str> for Filter {
    fn from(sql: &str) -> Self {
        Filter::raw(sql)
    }
}

impl From<String> for Filter {
    fn from(sql: String) -> Self {
        Filter::raw(sql)
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, V)> for Filter {
    fn from((column, value): (K, V)) -> Self {
        Filter::Implicit(column.into(), value.into())
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, Op, V)> for Filter {
    fn from((column, op, value): (K, Op, V)) -> Self {
        Filter::Compare(column.into(), op, value.into())
    }
}

/// How a clause attaches to the clauses before it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    And,
    Or,
}

impl Connector {
    pub fn as_str(self) -> &'static str {
        match self {
            Connector::And => "AND",
            Connector::Or => "OR",
        }
    }
}

/// Predicate node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Filter(Filter),
    /// `field IN (..)`; an empty list renders `1=0`.
    InList { field: String, values: Vec<Value> },
    /// `(field BETWEEN low AND high)`
    Between {
        field: String,
        low: Value,
        high: Value,
    },
    /// `field LIKE pattern`
    Like { field: String, pattern: Value },
    /// `field IS NULL`
    NullCheck { field: String },
    /// Parenthesised sub-list of clauses.
    Group(Vec<Clause>),
}

/// One predicate in call order.
#[derive(Debug, Clone, PartialEq)]
pub struct Clause {
    pub connector: Connector,
    pub negated: bool,
    pub expr: Expr,
}

impl Clause {
    pub fn new(connector: Connector, negated: bool, expr: Expr) -> Self {
        Self {
            connector,
            negated,
            expr,
        }
    }

    fn render(&self, dialect: Dialect) -> String {
        let not = if self.negated { "NOT " } else { "" };
        match &self.expr {
            Expr::Filter(filter) => filter.render(Op::Eq, self.negated, dialect),
            Expr::InList { values, .. } if values.is_empty() => {
                let constant = if self.negated { "1=1" } else { "1=0" };
                constant.to_string()
            }
            Expr::InList { field, values } => {
                let list = values
                    .iter()
                    .map(|v| escape(v, dialect))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("{field} {not}IN ({list})")
            }
            Expr::Between { field, low, high } => format!(
                "({field} {not}BETWEEN {} AND {})",
                escape(low, dialect),
                escape(high, dialect)
            ),
            Expr::Like { field, pattern } => {
                format!("{field} {not}LIKE {}", escape(pattern, dialect))
            }
            Expr::NullCheck { field } => format!("{field} IS {not}NULL"),
            Expr::Group(inner) => format!("{not}({})", render_clauses(inner, dialect)),
        }
    }
}

/// Render clauses joined by their connectors; the first connector is dropped.
pub fn render_clauses(clauses: &[Clause], dialect: Dialect) -> String {
    let mut out = String::new();
    for (idx, clause) in clauses.iter().enumerate() {
        if idx > 0 {
            out.push(' ');
            out.push_str(clause.connector.as_str());
            out.push(' ');
        }
        out.push_str(&clause.render(dialect));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn and(expr: Expr) -> Clause {
        Clause::new(Connector::And, false, expr)
    }

    #[test]
    fn op_parses_all_comparison_tokens() {
        for token in ["=", "!=", "<", ">", "<=", ">=", "<>"] {
            assert_eq!(token.parse::<Op>().unwrap().as_str(), token);
        }
        assert!("LIKE".parse::<Op>().is_err());
    }

    #[test]
    fn implicit_filter_uses_context_operator() {
        let f = Filter::from(("total", 10));
        assert_eq!(f.render(Op::Eq, false, Dialect::Sqlite), "total = 10");
        assert_eq!(f.render(Op::Gt, false, Dialect::Sqlite), "total > 10");
    }

    #[test]
    fn map_filter_is_and_joined_without_spaces() {
        let f = Filter::map([("a", 1), ("b", 2)]);
        assert_eq!(f.render(Op::Eq, false, Dialect::Sqlite), "a=1 AND b=2");
        assert_eq!(f.render(Op::Eq, true, Dialect::Sqlite), "NOT a=1 AND NOT b=2");
    }

    #[test]
    fn template_fills_markers() {
        let f = Filter::template("name = ? OR nick = ?", ["o'neil", "on"]);
        assert_eq!(
            f.render(Op::Eq, false, Dialect::Sqlite),
            "name = 'o''neil' OR nick = 'on'"
        );
    }

    #[test]
    fn first_connector_is_not_rendered() {
        let clauses = vec![
            Clause::new(Connector::Or, false, Expr::NullCheck { field: "a".into() }),
            Clause::new(Connector::Or, true, Expr::NullCheck { field: "b".into() }),
        ];
        assert_eq!(
            render_clauses(&clauses, Dialect::Sqlite),
            "a IS NULL OR b IS NOT NULL"
        );
    }

    #[test]
    fn empty_in_list_is_constant() {
        let expr = Expr::InList {
            field: "id".into(),
            values: vec![],
        };
        assert_eq!(render_clauses(&[and(expr.clone())], Dialect::Sqlite), "1=0");
        let negated = Clause::new(Connector::And, true, expr);
        assert_eq!(render_clauses(&[negated], Dialect::Sqlite), "1=1");
    }

    #[test]
    fn nested_group_renders_parenthesised() {
        let inner = vec![
            and(Expr::Filter(Filter::eq("a", 1))),
            Clause::new(Connector::Or, false, Expr::Filter(Filter::eq("b", 2))),
        ];
        let clauses = vec![
            and(Expr::Filter(Filter::eq("c", 3))),
            and(Expr::Group(inner)),
        ];
        assert_eq!(
            render_clauses(&clauses, Dialect::Sqlite),
            "c = 3 AND (a = 1 OR b = 2)"
        );
    }
}
