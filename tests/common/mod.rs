//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use ticket_transaction::core::{Result, SqlRows, SqlValue, Store, StoreError};
use ticket_transaction::purchase::schema;
use ticket_transaction::SqliteStore;
use tokio::sync::Mutex;

/// Fresh in-memory store with the purchase tables installed
pub async fn purchase_store() -> Arc<SqliteStore> {
    let store = Arc::new(SqliteStore::new());
    store.connect(":memory:").await.expect("Failed to connect");
    schema::install(store.as_ref(), 5)
        .await
        .expect("Failed to install schema");
    store
}

/// All rows of both tables, ordered, as comparable tuples
pub async fn snapshot(store: &impl Store) -> (Vec<(String, i64)>, Vec<(String, i64)>) {
    async fn read(store: &impl Store, sql: &str, column: &str) -> Vec<(String, i64)> {
        store
            .query_with_params(sql, &[])
            .await
            .expect("Query failed")
            .iter()
            .map(|row| {
                (
                    row["customerId"].as_str().unwrap_or_default().to_string(),
                    row[column].as_integer().unwrap_or_default(),
                )
            })
            .collect()
    }

    (
        read(
            store,
            "SELECT customerId, amount FROM payments ORDER BY id",
            "amount",
        )
        .await,
        read(
            store,
            "SELECT customerId, countNum FROM ticket_counts ORDER BY id",
            "countNum",
        )
        .await,
    )
}

/// Which call a [`FailingStore`] breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    /// Every statement whose SQL starts with the prefix
    Statement(&'static str),
    /// `begin_transaction`
    Begin,
    /// `commit`, leaving the wrapped transaction open
    Commit,
}

/// Store that fails one kind of call with a simulated connection loss
///
/// Everything else goes to the wrapped store.
pub struct FailingStore<S: Store> {
    inner: S,
    fail_on: FailOn,
    pub failures: AtomicUsize,
}

impl<S: Store> FailingStore<S> {
    pub fn new(inner: S, fail_on: FailOn) -> Self {
        Self {
            inner,
            fail_on,
            failures: AtomicUsize::new(0),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn fail(&self) -> Result<()> {
        self.failures.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::connection("simulated connection loss"))
    }
}

#[async_trait]
impl<S: Store> Store for FailingStore<S> {
    fn backend_name(&self) -> &'static str {
        "failing"
    }

    async fn connect(&self, connection_string: &str) -> Result<()> {
        self.inner.connect(connection_string).await
    }

    fn is_connected(&self) -> bool {
        self.inner.is_connected()
    }

    async fn disconnect(&self) -> Result<()> {
        self.inner.disconnect().await
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        self.inner.execute(sql).await
    }

    async fn execute_with_params(&self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        if let FailOn::Statement(prefix) = self.fail_on {
            if sql.starts_with(prefix) {
                self.fail()?;
            }
        }
        self.inner.execute_with_params(sql, params).await
    }

    async fn query_with_params(&self, sql: &str, params: &[SqlValue]) -> Result<SqlRows> {
        self.inner.query_with_params(sql, params).await
    }

    async fn begin_transaction(&self) -> Result<()> {
        if self.fail_on == FailOn::Begin {
            return self.fail();
        }
        self.inner.begin_transaction().await
    }

    async fn commit(&self) -> Result<()> {
        if self.fail_on == FailOn::Commit {
            return self.fail();
        }
        self.inner.commit().await
    }

    async fn rollback(&self) -> Result<()> {
        self.inner.rollback().await
    }

    fn in_transaction(&self) -> bool {
        self.inner.in_transaction()
    }

    fn scope_gate(&self) -> Arc<Mutex<()>> {
        self.inner.scope_gate()
    }
}
