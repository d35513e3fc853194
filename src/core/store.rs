//! Store trait
//!
//! This module defines the relational store contract the purchase executors
//! write through. Backends live in [`crate::backends`].

use super::error::Result;
use super::statement::Statement;
use super::value::{SqlRows, SqlValue};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Relational store with single-connection transaction control
#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name used in log lines
    fn backend_name(&self) -> &'static str;

    /// Connect to the store with the given connection string
    async fn connect(&self, connection_string: &str) -> Result<()>;

    /// Check if connected
    fn is_connected(&self) -> bool;

    /// Disconnect, discarding any open transaction
    async fn disconnect(&self) -> Result<()>;

    /// Execute raw SQL that doesn't return rows (DDL, batch setup)
    ///
    /// Never use this with user input; use `execute_with_params()` instead.
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Execute a parameterized statement that doesn't return rows
    async fn execute_with_params(&self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Execute a parameterized SELECT and return its rows
    async fn query_with_params(&self, sql: &str, params: &[SqlValue]) -> Result<SqlRows>;

    /// Begin a transaction
    ///
    /// Only one transaction can be active at a time per connection.
    async fn begin_transaction(&self) -> Result<()>;

    /// Commit the current transaction
    async fn commit(&self) -> Result<()>;

    /// Rollback the current transaction
    async fn rollback(&self) -> Result<()>;

    /// Check if currently in a transaction
    fn in_transaction(&self) -> bool;

    /// Gate held by a [`TransactionScope`](super::transaction::TransactionScope)
    /// for its whole life
    ///
    /// One gate per connection. Callers that use `begin_transaction()`
    /// directly bypass it.
    fn scope_gate(&self) -> Arc<Mutex<()>>;

    /// Run a prepared [`Statement`]
    async fn run(&self, statement: &Statement) -> Result<u64> {
        self.execute_with_params(statement.sql(), statement.params())
            .await
    }
}
