//! SQLite store implementation
//!
//! rusqlite is blocking, so every call is moved onto tokio's blocking pool.
//! Statements are raced against the operation timeout. Transaction control is
//! not: `BEGIN`, `COMMIT` and `ROLLBACK` always run to completion and report
//! what they did, and SQLite's busy timeout bounds their lock waits.

#[cfg(feature = "sqlite")]
use crate::core::{
    config::PurchaseConfig, error::Result, error::StoreError, statement::Statement, store::Store, value::SqlRow,
    value::SqlRows, value::SqlValue,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[cfg(feature = "sqlite")]
use rusqlite::{params_from_iter, types::ValueRef, Connection, Row};

/// Default timeout for store operations (30 seconds)
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// SQLite store over a single connection
#[cfg(feature = "sqlite")]
pub struct SqliteStore {
    connection: Arc<Mutex<Option<Connection>>>,
    in_transaction: Arc<Mutex<bool>>,
    scope_gate: Arc<Mutex<()>>,
    operation_timeout: Duration,
}

#[cfg(feature = "sqlite")]
impl SqliteStore {
    /// Create a new, unconnected SQLite store
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_OPERATION_TIMEOUT)
    }

    /// Create a store whose operations give up after `operation_timeout`
    pub fn with_timeout(operation_timeout: Duration) -> Self {
        Self {
            connection: Arc::new(Mutex::new(None)),
            in_transaction: Arc::new(Mutex::new(false)),
            scope_gate: Arc::new(Mutex::new(())),
            operation_timeout,
        }
    }

    /// Create a store using the operation timeout from `config`
    pub fn from_config(config: &PurchaseConfig) -> Self {
        Self::with_timeout(config.operation_timeout())
    }

    /// Timeout applied to each statement
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Convert a row, rejecting column types [`SqlValue`] does not carry
    fn row_to_sql_row(row: &Row) -> rusqlite::Result<SqlRow> {
        let mut sql_row = SqlRow::new();
        let column_count = row.as_ref().column_count();

        for i in 0..column_count {
            let column_name = row.as_ref().column_name(i)?.to_string();
            let value = match row.get_ref(i)? {
                ValueRef::Null => SqlValue::Null,
                ValueRef::Integer(v) => SqlValue::Integer(v),
                ValueRef::Text(v) => SqlValue::Text(String::from_utf8_lossy(v).to_string()),
                other @ (ValueRef::Real(_) | ValueRef::Blob(_)) => {
                    return Err(rusqlite::Error::InvalidColumnType(
                        i,
                        column_name,
                        other.data_type(),
                    ));
                }
            };
            sql_row.insert(column_name, value);
        }

        Ok(sql_row)
    }

    fn value_to_param(value: &SqlValue) -> rusqlite::types::Value {
        match value {
            SqlValue::Null => rusqlite::types::Value::Null,
            SqlValue::Integer(v) => rusqlite::types::Value::Integer(*v),
            SqlValue::Text(v) => rusqlite::types::Value::Text(v.clone()),
        }
    }

    /// Run `op` against the open connection on the blocking pool
    async fn with_connection<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let connection_arc = Arc::clone(&self.connection);

        let mut task = tokio::task::spawn_blocking(move || -> Result<T> {
            let connection = connection_arc.blocking_lock();
            let conn = connection
                .as_ref()
                .ok_or_else(|| StoreError::connection("Not connected to database"))?;
            op(conn)
        });

        // Abort the task on timeout instead of leaving it running
        tokio::select! {
            result = &mut task => {
                result.map_err(|e| StoreError::other(format!("Task join error: {}", e)))?
            }
            _ = tokio::time::sleep(self.operation_timeout) => {
                task.abort();
                Err(StoreError::query_timeout(self.operation_timeout.as_millis() as u64))
            }
        }
    }

    /// Issue a transaction-control statement, guarding the flag transition
    ///
    /// Not raced against the operation timeout: the result is what the
    /// connection actually did.
    async fn transaction_control(&self, sql: &'static str, expect_open: bool) -> Result<()> {
        let connection_arc = Arc::clone(&self.connection);
        let in_transaction_arc = Arc::clone(&self.in_transaction);

        let task = tokio::task::spawn_blocking(move || -> Result<()> {
            // Both locks, flag first, to keep flag and connection in step
            let mut in_transaction = in_transaction_arc.blocking_lock();
            let connection = connection_arc.blocking_lock();

            let conn = connection
                .as_ref()
                .ok_or_else(|| StoreError::connection("Not connected to database"))?;

            if *in_transaction != expect_open {
                return Err(StoreError::transaction(if expect_open {
                    "Not in a transaction"
                } else {
                    "Already in a transaction"
                }));
            }

            // Flip the flag only once the SQL succeeded
            conn.execute(sql, [])?;
            *in_transaction = !expect_open;

            Ok(())
        });

        task.await
            .map_err(|e| StoreError::other(format!("Task join error: {}", e)))?
    }
}

#[cfg(feature = "sqlite")]
impl Default for SqliteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "sqlite")]
#[async_trait]
impl Store for SqliteStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn connect(&self, connection_string: &str) -> Result<()> {
        {
            let mut connection = self.connection.lock().await;
            *connection = None;
        }
        {
            let mut in_transaction = self.in_transaction.lock().await;
            *in_transaction = false;
        }

        let connection_string = connection_string.to_string();
        let connection_arc = Arc::clone(&self.connection);
        let busy_timeout = self.operation_timeout;

        let mut task = tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = Connection::open(&connection_string)?;
            conn.execute("PRAGMA foreign_keys = ON", [])?;
            conn.busy_timeout(busy_timeout)?;

            let mut connection = connection_arc.blocking_lock();
            *connection = Some(conn);
            Ok(())
        });

        tokio::select! {
            result = &mut task => {
                result.map_err(|e| StoreError::other(format!("Task join error: {}", e)))??
            }
            _ = tokio::time::sleep(self.operation_timeout) => {
                task.abort();
                return Err(StoreError::connection(format!(
                    "Connection timeout after {}ms",
                    self.operation_timeout.as_millis()
                )));
            }
        }

        tracing::debug!(backend = "sqlite", "connected");
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connection
            .try_lock()
            .map(|conn| conn.is_some())
            .unwrap_or(false)
    }

    async fn disconnect(&self) -> Result<()> {
        {
            let mut in_transaction = self.in_transaction.lock().await;
            *in_transaction = false;
        }

        let mut connection = self.connection.lock().await;
        *connection = None;
        Ok(())
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        let sql = sql.to_string();
        self.with_connection(move |conn| {
            conn.execute_batch(&sql)?;
            Ok(conn.changes() as u64)
        })
        .await
    }

    async fn execute_with_params(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let sql = sql.to_string();
        let params: Vec<rusqlite::types::Value> = params.iter().map(Self::value_to_param).collect();

        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let affected = stmt.execute(params_from_iter(params.iter()))?;
            Ok(affected as u64)
        })
        .await
    }

    async fn query_with_params(&self, sql: &str, params: &[SqlValue]) -> Result<SqlRows> {
        let sql = sql.to_string();
        let params: Vec<rusqlite::types::Value> = params.iter().map(Self::value_to_param).collect();

        self.with_connection(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(params.iter()), Self::row_to_sql_row)?;

            let mut results = Vec::new();
            for row_result in rows {
                results.push(row_result?);
            }
            Ok(results)
        })
        .await
    }

    async fn begin_transaction(&self) -> Result<()> {
        self.transaction_control("BEGIN TRANSACTION", false).await
    }

    async fn commit(&self) -> Result<()> {
        self.transaction_control("COMMIT", true).await
    }

    async fn rollback(&self) -> Result<()> {
        self.transaction_control("ROLLBACK", true).await
    }

    fn in_transaction(&self) -> bool {
        self.in_transaction
            .try_lock()
            .map(|guard| *guard)
            .unwrap_or(false)
    }

    fn scope_gate(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.scope_gate)
    }

    async fn run(&self, statement: &Statement) -> Result<u64> {
        tracing::trace!(sql = statement.sql(), "run statement");
        self.execute_with_params(statement.sql(), statement.params())
            .await
    }
}

#[cfg(feature = "sqlite")]
impl Drop for SqliteStore {
    fn drop(&mut self) {
        // Best effort; Drop cannot be async
        if let Ok(in_trans) = self.in_transaction.try_lock() {
            if *in_trans {
                if let Ok(connection) = self.connection.try_lock() {
                    if let Some(conn) = connection.as_ref() {
                        let _ = conn.execute("ROLLBACK", []);
                    }
                }
            }
        }
    }
}
