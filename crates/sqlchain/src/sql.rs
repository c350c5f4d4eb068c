//! Statement text helpers: whitespace normalisation and read/write classification.

use crate::value::Dialect;
use std::sync::OnceLock;

/// Collapse runs of whitespace to one space and trim the ends.
///
/// Quoted literals are copied untouched, so whitespace inside string values survives.
/// `dialect` decides whether a backslash escapes the next character inside quotes.
/// The result is the text that is executed, reported and used as the cache key.
pub fn normalize_sql(sql: &str, dialect: Dialect) -> String {
    static DOUBLED_RE: OnceLock<regex::Regex> = OnceLock::new();
    static BACKSLASH_RE: OnceLock<regex::Regex> = OnceLock::new();
    let re = match dialect {
        Dialect::MySql => BACKSLASH_RE.get_or_init(|| {
            regex::Regex::new(r#"(?s)'(?:[^'\\]|\\.|'')*'|"(?:[^"\\]|\\.|"")*"|\s+"#)
                .expect("invalid built-in whitespace regex")
        }),
        Dialect::Postgres | Dialect::Sqlite | Dialect::Oracle => DOUBLED_RE.get_or_init(|| {
            regex::Regex::new(r#"'(?:[^']|'')*'|"(?:[^"]|"")*"|\s+"#)
                .expect("invalid built-in whitespace regex")
        }),
    };
    re.replace_all(sql.trim(), |caps: &regex::Captures<'_>| {
        let token = &caps[0];
        if token.starts_with(['\'', '"']) {
            token.to_string()
        } else {
            " ".to_string()
        }
    })
    .into_owned()
}

pub(crate) fn starts_with_keyword(s: &str, keyword: &str) -> bool {
    match s.get(0..keyword.len()) {
        Some(prefix) => prefix.eq_ignore_ascii_case(keyword),
        None => false,
    }
}

const READ_KEYWORDS: [&str; 6] = ["SELECT", "ANALYZE", "CHECK", "CHECKSUM", "OPTIMIZE", "REPAIR"];

/// Whether a statement produces rows (fetched) or a write result (executed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Read,
    Write,
}

impl StatementKind {
    /// Classify by leading keyword, case-insensitively. Table maintenance
    /// statements report rows and count as reads.
    pub fn classify(sql: &str) -> Self {
        let sql = sql.trim_start();
        if READ_KEYWORDS.iter().any(|kw| starts_with_keyword(sql, kw)) {
            StatementKind::Read
        } else {
            StatementKind::Write
        }
    }

    pub fn is_read(self) -> bool {
        matches!(self, StatementKind::Read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_whitespace() {
        assert_eq!(
            normalize_sql("  SELECT *\n\tFROM   users \r\n WHERE id = 1  ", Dialect::Sqlite),
            "SELECT * FROM users WHERE id = 1"
        );
    }

    #[test]
    fn normalize_keeps_literals_intact() {
        let sql = "INSERT INTO t (a, b)\n  VALUES ('line1\nline2', 'a  b')";
        assert_eq!(
            normalize_sql(sql, Dialect::Sqlite),
            "INSERT INTO t (a, b) VALUES ('line1\nline2', 'a  b')"
        );

        // doubled quotes do not end the literal
        assert_eq!(
            normalize_sql("SELECT  'it''s   here'  ,  '\t'", Dialect::Postgres),
            "SELECT 'it''s   here' , '\t'"
        );

        // a trailing backslash is plain text outside MySQL
        assert_eq!(
            normalize_sql("SELECT 'a\\'   ,   'x  y'", Dialect::Sqlite),
            "SELECT 'a\\' , 'x  y'"
        );
    }

    #[test]
    fn normalize_honours_mysql_backslash_escapes() {
        assert_eq!(
            normalize_sql("SELECT   'o\\'neil   x'  ,  \"a  b\"", Dialect::MySql),
            "SELECT 'o\\'neil   x' , \"a  b\""
        );
    }

    #[test]
    fn classify_reads() {
        for sql in [
            "SELECT 1",
            "select * from t",
            "  Analyze TABLE t",
            "CHECK TABLE t",
            "checksum table t",
            "OPTIMIZE TABLE t",
            "REPAIR TABLE t",
        ] {
            assert_eq!(StatementKind::classify(sql), StatementKind::Read, "{sql}");
        }
    }

    #[test]
    fn classify_writes() {
        for sql in [
            "INSERT INTO t VALUES (1)",
            "UPDATE t SET a=1",
            "DELETE FROM t",
            "TRUNCATE TABLE t",
            "CREATE TABLE t (a INT)",
            "SEL",
            "",
        ] {
            assert_eq!(StatementKind::classify(sql), StatementKind::Write, "{sql}");
        }
    }
}
