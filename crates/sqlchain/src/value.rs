//! Scalar values and their SQL literal rendering.
//!
//! Every value that ends up in compiled SQL passes through [`escape`]. Column and
//! table identifiers never do: they are written verbatim by the query builder.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A scalar that can be bound into a statement or read back from a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean, rendered as a quoted `'1'` / `'0'` string
    Bool(bool),
    /// 64-bit integer, rendered unquoted
    Int(i64),
    /// 64-bit float, rendered unquoted
    Float(f64),
    /// Text, quoted by the active dialect
    Text(String),
}

impl Value {
    /// Check if this value is NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            Self::Int(0) => Some(false),
            Self::Int(1) => Some(true),
            _ => None,
        }
    }

    /// Convert to a JSON value (used for associative row representations).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(v) => serde_json::Value::Bool(*v),
            Self::Int(v) => serde_json::Value::from(*v),
            Self::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Self::Text(v) => serde_json::Value::String(v.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Bool(v) => write!(f, "{}", u8::from(*v)),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// SQL dialect of the active driver; owns the string quoting primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    /// MySQL / MariaDB: backslash escapes inside single quotes
    #[default]
    MySql,
    /// PostgreSQL: doubled single quotes
    Postgres,
    /// SQLite: doubled single quotes
    Sqlite,
    /// Oracle: doubled single quotes
    Oracle,
}

impl Dialect {
    /// Quote a string as a SQL literal, escaping embedded delimiters.
    pub fn quote(self, raw: &str) -> String {
        let mut out = String::with_capacity(raw.len() + 2);
        out.push('\'');
        match self {
            Dialect::MySql => {
                for ch in raw.chars() {
                    match ch {
                        '\0' => out.push_str("\\0"),
                        '\n' => out.push_str("\\n"),
                        '\r' => out.push_str("\\r"),
                        '\\' => out.push_str("\\\\"),
                        '\'' => out.push_str("\\'"),
                        '"' => out.push_str("\\\""),
                        '\x1a' => out.push_str("\\Z"),
                        other => out.push(other),
                    }
                }
            }
            Dialect::Postgres | Dialect::Sqlite | Dialect::Oracle => {
                for ch in raw.chars() {
                    if ch == '\'' {
                        out.push('\'');
                    }
                    out.push(ch);
                }
            }
        }
        out.push('\'');
        out
    }
}

/// Render a value as a SQL literal token.
///
/// - `Null` renders as `NULL`
/// - integers and finite floats render unquoted
/// - everything else goes through [`Dialect::quote`]
pub fn escape(value: &Value, dialect: Dialect) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Int(v) => v.to_string(),
        Value::Float(v) if v.is_finite() => v.to_string(),
        Value::Float(_) => "NULL".to_string(),
        Value::Bool(v) => dialect.quote(if *v { "1" } else { "0" }),
        Value::Text(v) => dialect.quote(v),
    }
}

/// Fill `?` markers positionally with escaped values.
///
/// Markers beyond the supplied values are kept as-is; surplus values are ignored.
pub fn fill_placeholders(template: &str, values: &[Value], dialect: Dialect) -> String {
    let mut out = String::with_capacity(template.len() + values.len() * 4);
    let mut next = values.iter();
    for ch in template.chars() {
        if ch == '?' {
            match next.next() {
                Some(value) => out.push_str(&escape(value, dialect)),
                None => out.push(ch),
            }
        } else {
            out.push(ch);
        }
    }
    out
}
