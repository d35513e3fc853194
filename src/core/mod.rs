//! Core store types and traits
//!
//! Error types, the store trait, parameter values, statement construction,
//! transaction scopes and configuration.

pub mod config;
pub mod error;
pub mod statement;
pub mod store;
pub mod transaction;
pub mod value;

// Re-export commonly used types
pub use config::{ExecutionStrategy, PurchaseConfig};
pub use error::{Result, StoreError, ValidationError};
pub use statement::{InsertBuilder, Statement};
pub use store::Store;
pub use transaction::{run_in_transaction, TransactionScope, TransactionState, UnitOfWork};
pub use value::{SqlRow, SqlRows, SqlValue};
