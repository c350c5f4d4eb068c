//! JOIN clauses.

use crate::qb::expr::Op;

/// Join flavour; `Plain` renders a bare `JOIN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JoinKind {
    #[default]
    Plain,
    Inner,
    Left,
    Right,
    FullOuter,
    LeftOuter,
    RightOuter,
}

impl JoinKind {
    /// Keyword prefix including its trailing space (empty for `Plain`).
    pub fn prefix(self) -> &'static str {
        match self {
            JoinKind::Plain => "",
            JoinKind::Inner => "INNER ",
            JoinKind::Left => "LEFT ",
            JoinKind::Right => "RIGHT ",
            JoinKind::FullOuter => "FULL OUTER ",
            JoinKind::LeftOuter => "LEFT OUTER ",
            JoinKind::RightOuter => "RIGHT OUTER ",
        }
    }
}

/// ON condition of a join. Both sides are identifiers and are not escaped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOn {
    Raw(String),
    /// `left = right`
    Columns(String, String),
    /// `left op right`
    Compare(String, Op, String),
}

impl JoinOn {
    pub fn render(&self) -> String {
        match self {
            JoinOn::Raw(on) => on.clone(),
            JoinOn::Columns(left, right) => format!("{left} = {right}"),
            JoinOn::Compare(left, op, right) => format!("{left} {op} {right}"),
        }
    }
}

impl From<&str> for JoinOn {
    fn from(on: &str) -> Self {
        JoinOn::Raw(on.to_string())
    }
}

impl From<String> for JoinOn {
    fn from(on: String) -> Self {
        JoinOn::Raw(on)
    }
}

impl<L: Into<String>, R: Into<String>> From<(L, R)> for JoinOn {
    fn from((left, right): (L, R)) -> Self {
        JoinOn::Columns(left.into(), right.into())
    }
}

impl<L: Into<String>, R: Into<String>> From<(L, Op, R)> for JoinOn {
    fn from((left, op, right): (L, Op, R)) -> Self {
        JoinOn::Compare(left.into(), op, right.into())
    }
}

/// One JOIN clause. The table is stored bare; the prefix is added when compiling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub kind: JoinKind,
    pub table: String,
    pub on: JoinOn,
}

impl Join {
    /// ` KIND JOIN table ON cond`, with the leading space.
    pub fn render(&self) -> String {
        format!(
            " {}JOIN {} ON {}",
            self.kind.prefix(),
            self.table,
            self.on.render()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_shapes() {
        let join = Join {
            kind: JoinKind::Left,
            table: "p_posts".into(),
            on: ("p_posts.user_id", "p_users.id").into(),
        };
        assert_eq!(join.render(), " LEFT JOIN p_posts ON p_posts.user_id = p_users.id");

        let join = Join {
            kind: JoinKind::Plain,
            table: "t".into(),
            on: ("t.a", Op::Ge, "u.b").into(),
        };
        assert_eq!(join.render(), " JOIN t ON t.a >= u.b");

        let join = Join {
            kind: JoinKind::FullOuter,
            table: "t".into(),
            on: "t.a = 1".into(),
        };
        assert_eq!(join.render(), " FULL OUTER JOIN t ON t.a = 1");
    }
}
