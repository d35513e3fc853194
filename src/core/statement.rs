//! Parameterized statement construction
//!
//! Statements are plain data: SQL text with `?` placeholders plus the values
//! to bind, so user input never reaches the SQL string.

use super::value::SqlValue;

/// A ready-to-execute parameterized statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    sql: String,
    params: Vec<SqlValue>,
}

impl Statement {
    /// Create a statement from SQL text and its bound values
    pub fn new(sql: impl Into<String>, params: Vec<SqlValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// SQL text with `?` placeholders
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Values bound to the placeholders, in order
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }
}

/// INSERT statement builder
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    table: String,
    columns: Vec<String>,
    values: Vec<SqlValue>,
}

impl InsertBuilder {
    /// Create a new INSERT builder for `table`
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Add a column-value pair
    #[must_use]
    pub fn value(mut self, column: &str, value: impl Into<SqlValue>) -> Self {
        self.columns.push(column.to_string());
        self.values.push(value.into());
        self
    }

    /// Build the statement
    pub fn build(self) -> Statement {
        let placeholders = vec!["?"; self.values.len()];
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            self.columns.join(", "),
            placeholders.join(", ")
        );
        Statement::new(sql, self.values)
    }
}
