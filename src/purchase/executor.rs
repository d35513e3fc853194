//! Atomic ticket purchase
//!
//! A purchase is two inserts, a payment row and a ticket-count row, that must
//! land together or not at all. Two executors implement it:
//!
//! - [`ExplicitScopeExecutor`] opens a [`TransactionScope`] and calls commit or
//!   rollback itself.
//! - [`ManagedScopeExecutor`] hands both writes to [`run_in_transaction`] and
//!   never touches commit or rollback.
//!
//! Both swallow the storage error and report a boolean; the detailed outcome
//! also says whether the store rejected the purchase or failed outright.

use super::model::PurchaseRequest;
use super::schema::{payment_statement, ticket_count_statement};
use crate::core::config::{ExecutionStrategy, DEFAULT_UNIT_PRICE};
use crate::core::error::{Result, StoreError};
use crate::core::statement::Statement;
use crate::core::store::Store;
use crate::core::transaction::{run_in_transaction, TransactionScope};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

/// Why a purchase did not commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// A stored rule (the ticket ceiling) rejected one of the writes
    ConstraintRejected,
    /// Anything else: connection loss, bad SQL, missing table, timeout
    Storage,
}

impl FailureKind {
    /// Classify a store error
    pub fn of(err: &StoreError) -> Self {
        if err.is_constraint_violation() {
            FailureKind::ConstraintRejected
        } else {
            FailureKind::Storage
        }
    }
}

/// Result of one purchase attempt
///
/// `committed` is true exactly when `failure` is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PurchaseOutcome {
    pub committed: bool,
    pub failure: Option<FailureKind>,
}

impl PurchaseOutcome {
    /// Both rows were committed
    pub fn committed() -> Self {
        Self {
            committed: true,
            failure: None,
        }
    }

    /// Nothing was written, for the given reason
    pub fn failed(kind: FailureKind) -> Self {
        Self {
            committed: false,
            failure: Some(kind),
        }
    }

    fn from_result(request: &PurchaseRequest, result: Result<()>) -> Self {
        match result {
            Ok(()) => {
                tracing::info!(
                    customer_id = request.customer_id(),
                    quantity = request.quantity(),
                    "payment and ticket purchase committed"
                );
                Self::committed()
            }
            Err(e) => {
                let kind = FailureKind::of(&e);
                match kind {
                    FailureKind::ConstraintRejected => tracing::warn!(
                        customer_id = request.customer_id(),
                        quantity = request.quantity(),
                        error = %e,
                        "constraint violated, payment and ticket purchase rolled back"
                    ),
                    FailureKind::Storage => tracing::error!(
                        customer_id = request.customer_id(),
                        quantity = request.quantity(),
                        error = %e,
                        "storage failure, payment and ticket purchase rolled back"
                    ),
                }
                Self::failed(kind)
            }
        }
    }
}

/// Runs a purchase as one atomic unit
#[async_trait]
pub trait PurchaseExecutor: Send + Sync {
    /// Strategy this executor implements
    fn strategy(&self) -> ExecutionStrategy;

    /// Attempt the purchase and report how it ended
    async fn execute_detailed(&self, request: &PurchaseRequest) -> PurchaseOutcome;

    /// Attempt the purchase; `true` when both rows were committed
    async fn execute(&self, request: &PurchaseRequest) -> bool {
        self.execute_detailed(request).await.committed
    }
}

/// The two statements of one purchase, in write order
fn purchase_statements(request: &PurchaseRequest, unit_price: i64) -> [Statement; 2] {
    [
        payment_statement(&request.payment(unit_price)),
        ticket_count_statement(&request.ticket_count()),
    ]
}

fn log_attempt(request: &PurchaseRequest, strategy: ExecutionStrategy) {
    tracing::debug!(
        customer_id = request.customer_id(),
        quantity = request.quantity(),
        %strategy,
        "buying tickets"
    );
}

/// Executor that owns the commit and rollback calls
pub struct ExplicitScopeExecutor<S: Store + 'static> {
    store: Arc<S>,
    unit_price: i64,
}

impl<S: Store + 'static> ExplicitScopeExecutor<S> {
    /// Create a new explicit-scope executor charging the default unit price
    pub fn new(store: Arc<S>) -> Self {
        Self::with_unit_price(store, DEFAULT_UNIT_PRICE)
    }

    /// Create a new explicit-scope executor charging `unit_price` per ticket
    pub fn with_unit_price(store: Arc<S>, unit_price: i64) -> Self {
        Self { store, unit_price }
    }

    async fn purchase(&self, request: &PurchaseRequest) -> Result<()> {
        let [payment, ticket_count] = purchase_statements(request, self.unit_price);
        let scope = TransactionScope::begin(Arc::clone(&self.store)).await?;

        let written = async {
            scope.run(&payment).await?;
            scope.run(&ticket_count).await
        }
        .await;

        match written {
            Ok(_) => scope.commit().await,
            Err(e) => {
                if let Err(rollback_err) = scope.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                Err(e)
            }
        }
    }
}

#[async_trait]
impl<S: Store + 'static> PurchaseExecutor for ExplicitScopeExecutor<S> {
    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::Explicit
    }

    async fn execute_detailed(&self, request: &PurchaseRequest) -> PurchaseOutcome {
        log_attempt(request, self.strategy());
        let result = self.purchase(request).await;
        PurchaseOutcome::from_result(request, result)
    }
}

/// Executor that hands its writes to [`run_in_transaction`]
pub struct ManagedScopeExecutor<S: Store + 'static> {
    store: Arc<S>,
    unit_price: i64,
}

impl<S: Store + 'static> ManagedScopeExecutor<S> {
    /// Create a new managed-scope executor charging the default unit price
    pub fn new(store: Arc<S>) -> Self {
        Self::with_unit_price(store, DEFAULT_UNIT_PRICE)
    }

    /// Create a new managed-scope executor charging `unit_price` per ticket
    pub fn with_unit_price(store: Arc<S>, unit_price: i64) -> Self {
        Self { store, unit_price }
    }
}

#[async_trait]
impl<S: Store + 'static> PurchaseExecutor for ManagedScopeExecutor<S> {
    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::Managed
    }

    async fn execute_detailed(&self, request: &PurchaseRequest) -> PurchaseOutcome {
        log_attempt(request, self.strategy());
        let [payment, ticket_count] = purchase_statements(request, self.unit_price);

        let result = run_in_transaction(&self.store, |scope| {
            Box::pin(async move {
                scope.run(&payment).await?;
                scope.run(&ticket_count).await?;
                Ok::<_, StoreError>(())
            })
        })
        .await;

        PurchaseOutcome::from_result(request, result)
    }
}

/// Build the executor named by `strategy`
pub fn build_executor<S: Store + 'static>(
    store: Arc<S>,
    strategy: ExecutionStrategy,
    unit_price: i64,
) -> Box<dyn PurchaseExecutor> {
    match strategy {
        ExecutionStrategy::Explicit => {
            Box::new(ExplicitScopeExecutor::with_unit_price(store, unit_price))
        }
        ExecutionStrategy::Managed => {
            Box::new(ManagedScopeExecutor::with_unit_price(store, unit_price))
        }
    }
}

#[cfg(all(test, feature = "sqlite"))]
mod tests {
    use super::*;
    use crate::backends::SqliteStore;
    use crate::purchase::schema;

    async fn store() -> Arc<SqliteStore> {
        let store = Arc::new(SqliteStore::new());
        store.connect(":memory:").await.unwrap();
        schema::install(store.as_ref(), 5).await.unwrap();
        store
    }

    async fn rows_for(store: &SqliteStore, table: &str, customer: &str) -> usize {
        store
            .query_with_params(
                &format!("SELECT * FROM {} WHERE customerId = ?", table),
                &[customer.into()],
            )
            .await
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn test_explicit_commits_within_limit() {
        let store = store().await;
        let executor = ExplicitScopeExecutor::new(Arc::clone(&store));

        let request = PurchaseRequest::new("cust01", 3).unwrap();
        assert!(executor.execute(&request).await);
        assert_eq!(rows_for(&store, "payments", "cust01").await, 1);
        assert_eq!(rows_for(&store, "ticket_counts", "cust01").await, 1);
    }

    #[tokio::test]
    async fn test_explicit_rolls_back_over_limit() {
        let store = store().await;
        let executor = ExplicitScopeExecutor::new(Arc::clone(&store));

        let request = PurchaseRequest::new("cust02", 6).unwrap();
        let outcome = executor.execute_detailed(&request).await;
        assert_eq!(outcome, PurchaseOutcome::failed(FailureKind::ConstraintRejected));
        assert_eq!(rows_for(&store, "payments", "cust02").await, 0);
        assert_eq!(rows_for(&store, "ticket_counts", "cust02").await, 0);
        assert!(!store.in_transaction());
    }

    #[tokio::test]
    async fn test_managed_rolls_back_over_limit() {
        let store = store().await;
        let executor = ManagedScopeExecutor::new(Arc::clone(&store));

        let request = PurchaseRequest::new("cust02", 6).unwrap();
        assert!(!executor.execute(&request).await);
        assert_eq!(rows_for(&store, "payments", "cust02").await, 0);
        assert!(!store.in_transaction());
    }

    #[tokio::test]
    async fn test_storage_failure_is_classified() {
        let store = store().await;
        store.execute("DROP TABLE ticket_counts").await.unwrap();

        for strategy in [ExecutionStrategy::Explicit, ExecutionStrategy::Managed] {
            let executor = build_executor(Arc::clone(&store), strategy, DEFAULT_UNIT_PRICE);
            assert_eq!(executor.strategy(), strategy);

            let request = PurchaseRequest::new("cust03", 2).unwrap();
            let outcome = executor.execute_detailed(&request).await;
            assert_eq!(outcome.failure, Some(FailureKind::Storage));
            assert_eq!(rows_for(&store, "payments", "cust03").await, 0);
        }
    }

    #[tokio::test]
    async fn test_disconnected_store_reports_false() {
        let store = Arc::new(SqliteStore::new());
        let executor = ManagedScopeExecutor::new(store);

        let request = PurchaseRequest::new("cust04", 1).unwrap();
        let outcome = executor.execute_detailed(&request).await;
        assert_eq!(outcome, PurchaseOutcome::failed(FailureKind::Storage));
    }
}
