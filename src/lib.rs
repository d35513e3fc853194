//! # Ticket Transaction
//!
//! Atomic ticket purchase over a relational store. A purchase writes a payment
//! row and a ticket-count row inside one transaction; when the store rejects
//! either write (the ticket-count table carries `CHECK (countNum <= 5)`), both
//! are rolled back and the caller gets `false`.
//!
//! ## Features
//!
//! - **Two execution strategies**: an executor that calls commit and rollback
//!   itself, and one that hands its writes to [`run_in_transaction`]. Both leave
//!   identical rows behind for identical input.
//! - **Scoped transactions**: [`TransactionScope`] always ends committed or
//!   rolled back, including when it is dropped mid-flight.
//! - **Parameterized statements only**: customer input is bound, never spliced.
//! - **Outcome classification**: constraint rejection vs. storage failure,
//!   alongside the plain boolean.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ticket_transaction::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let store = Arc::new(SqliteStore::new());
//!     store.connect(":memory:").await?;
//!     schema::install(store.as_ref(), 5).await?;
//!
//!     let executor = ManagedScopeExecutor::new(Arc::clone(&store));
//!     let request = PurchaseRequest::new("cust01", 3).expect("valid request");
//!     assert!(executor.execute(&request).await);
//!     Ok(())
//! }
//! ```
//!
//! ## Project Structure
//!
//! ```text
//! ticket_transaction/
//! ├── src/
//! │   ├── core/              # Store trait, errors, values, statements, scopes, config
//! │   ├── backends/          # SQLite store
//! │   ├── purchase/          # Request model, schema, executors, ledger, controller
//! │   └── lib.rs
//! ├── demos/                 # Runnable walkthrough
//! ├── tests/                 # Integration and property tests
//! └── benches/
//! ```

/// Core store types and traits
pub mod core;

/// Store backend implementations
pub mod backends;

/// Ticket purchase
pub mod purchase;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::core::{
        run_in_transaction, ExecutionStrategy, PurchaseConfig, Result, SqlValue, Statement,
        Store, StoreError, TransactionScope, TransactionState, ValidationError,
    };
    pub use crate::purchase::{
        build_executor, schema, ExplicitScopeExecutor, FailureKind, ManagedScopeExecutor,
        PurchaseController, PurchaseExecutor, PurchaseForm, PurchaseLedger, PurchaseOutcome,
        PurchaseRequest,
    };

    #[cfg(feature = "sqlite")]
    pub use crate::backends::SqliteStore;
}

// Re-export at root level for convenience
pub use crate::core::{
    run_in_transaction, ExecutionStrategy, PurchaseConfig, Result, Store, StoreError,
    TransactionScope, TransactionState,
};
pub use purchase::{
    ExplicitScopeExecutor, ManagedScopeExecutor, PurchaseExecutor, PurchaseOutcome,
    PurchaseRequest,
};

#[cfg(feature = "sqlite")]
pub use backends::SqliteStore;
