//! SQL parameter and column values
//!
//! Only the value shapes the purchase tables use are modelled: text ids and
//! integer amounts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A value bound to a statement parameter or read back from a column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SqlValue {
    /// Null value
    Null,
    /// 64-bit integer
    Integer(i64),
    /// Text value
    Text(String),
}

impl SqlValue {
    /// Get the value as an i64
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(v) => Some(*v),
            SqlValue::Text(s) => s.parse().ok(),
            SqlValue::Null => None,
        }
    }

    /// Get the value as a string slice (zero-copy for Text values)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Integer(_) => "integer",
            SqlValue::Text(_) => "text",
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Integer(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Integer(v as i64)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

/// A row of query results (column name -> value mapping)
pub type SqlRow = HashMap<String, SqlValue>;

/// Multiple rows returned from a query
pub type SqlRows = Vec<SqlRow>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_conversions() {
        let val: SqlValue = 30000i64.into();
        assert_eq!(val.as_integer(), Some(30000));
        assert_eq!(val.as_str(), None);

        let val: SqlValue = "cust01".into();
        assert_eq!(val.as_str(), Some("cust01"));
        assert_eq!(val.type_name(), "text");

        assert!(SqlValue::Null.is_null());
        assert_eq!(SqlValue::Null.as_integer(), None);
    }
}
