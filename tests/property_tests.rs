//! Property-based tests for purchase atomicity using proptest

#![cfg(feature = "sqlite")]

mod common;

use common::{purchase_store, snapshot};
use proptest::prelude::*;
use std::sync::Arc;
use ticket_transaction::prelude::*;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

fn customer_id() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,11}"
}

// ============================================================================
// Commit and Rollback
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Purchases within the ceiling always commit both rows
    #[test]
    fn test_within_limit_commits(customer in customer_id(), quantity in 1i64..=5, managed in any::<bool>()) {
        let (committed, rows) = runtime().block_on(async {
            let store = purchase_store().await;
            let strategy = if managed { ExecutionStrategy::Managed } else { ExecutionStrategy::Explicit };
            let executor = build_executor(Arc::clone(&store), strategy, 10_000);

            let request = PurchaseRequest::new(customer.clone(), quantity).unwrap();
            (executor.execute(&request).await, snapshot(store.as_ref()).await)
        });

        prop_assert!(committed);
        prop_assert_eq!(rows.0, vec![(customer.clone(), quantity * 10_000)]);
        prop_assert_eq!(rows.1, vec![(customer, quantity)]);
    }

    /// Purchases over the ceiling never leave a row behind
    #[test]
    fn test_over_limit_rolls_back(customer in customer_id(), quantity in 6i64..1_000, managed in any::<bool>()) {
        let (outcome, rows) = runtime().block_on(async {
            let store = purchase_store().await;
            let strategy = if managed { ExecutionStrategy::Managed } else { ExecutionStrategy::Explicit };
            let executor = build_executor(Arc::clone(&store), strategy, 10_000);

            let request = PurchaseRequest::new(customer, quantity).unwrap();
            (executor.execute_detailed(&request).await, snapshot(store.as_ref()).await)
        });

        prop_assert_eq!(outcome, PurchaseOutcome::failed(FailureKind::ConstraintRejected));
        prop_assert!(rows.0.is_empty());
        prop_assert!(rows.1.is_empty());
    }
}

// ============================================================================
// Strategy Equivalence
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Both strategies agree on every outcome and on the final tables
    #[test]
    fn test_strategies_agree(
        purchases in prop::collection::vec((customer_id(), 1i64..10), 1..12)
    ) {
        let (explicit, managed) = runtime().block_on(async {
            let explicit_store = purchase_store().await;
            let managed_store = purchase_store().await;
            let explicit = ExplicitScopeExecutor::new(Arc::clone(&explicit_store));
            let managed = ManagedScopeExecutor::new(Arc::clone(&managed_store));

            let mut explicit_outcomes = Vec::new();
            let mut managed_outcomes = Vec::new();
            for (customer, quantity) in &purchases {
                let request = PurchaseRequest::new(customer.clone(), *quantity).unwrap();
                explicit_outcomes.push(explicit.execute(&request).await);
                managed_outcomes.push(managed.execute(&request).await);
            }

            (
                (explicit_outcomes, snapshot(explicit_store.as_ref()).await),
                (managed_outcomes, snapshot(managed_store.as_ref()).await),
            )
        });

        prop_assert_eq!(explicit, managed);
    }
}
