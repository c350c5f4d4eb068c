//! Row representations and typed row mapping.

use crate::error::{ChainError, ChainResult};
use crate::value::Value;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

/// Shape requested for fetched rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Representation {
    /// Generic object: [`Row`] with by-name access
    #[default]
    Object,
    /// Associative mapping: `serde_json::Map` keyed by column name
    Assoc,
    /// Typed hydration through [`FromRow`]; never cached
    Typed,
}

impl Representation {
    /// Whether results in this representation may be served from / written to the cache.
    pub fn is_cacheable(self) -> bool {
        !matches!(self, Representation::Typed)
    }
}

/// A fetched row: column names shared across the result set plus the row's values.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Create a row. `values` must be aligned with `columns`.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Column names in select order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values in select order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw value by column name.
    pub fn value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    /// Typed value by column name.
    pub fn get<T: FromValue>(&self, column: &str) -> ChainResult<T> {
        let value = self
            .value(column)
            .ok_or_else(|| ChainError::decode(column, "no such column"))?;
        T::from_value(value).map_err(|message| ChainError::decode(column, message))
    }

    /// Associative representation of this row.
    pub fn to_map(&self) -> Map<String, JsonValue> {
        self.columns
            .iter()
            .zip(self.values.iter())
            .map(|(c, v)| (c.clone(), v.to_json()))
            .collect()
    }
}

/// Trait for types that can be hydrated from a [`Row`].
///
/// ```ignore
/// struct User { id: i64, name: String }
///
/// impl FromRow for User {
///     fn from_row(row: &Row) -> ChainResult<Self> {
///         Ok(Self { id: row.get("id")?, name: row.get("name")? })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> ChainResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> ChainResult<Self> {
        Ok(row.clone())
    }
}

/// Conversion from a single [`Value`] into a Rust type.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, String>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, String> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Int(v) => Ok(*v),
            Value::Text(s) => s
                .parse()
                .map_err(|_| format!("cannot read {s:?} as an integer")),
            other => Err(format!("expected integer, got {other:?}")),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let v = i64::from_value(value)?;
        i32::try_from(v).map_err(|_| format!("{v} is out of range for i32"))
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as f64),
            Value::Text(s) => s
                .parse()
                .map_err(|_| format!("cannot read {s:?} as a float")),
            other => Err(format!("expected float, got {other:?}")),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        value
            .as_bool()
            .ok_or_else(|| format!("expected boolean, got {value:?}"))
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Err("unexpected NULL".to_string()),
            other => Ok(other.to_string()),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}
