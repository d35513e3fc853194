//! Ticket purchase: a payment row and a ticket-count row written atomically

pub mod controller;
pub mod executor;
pub mod ledger;
pub mod model;
pub mod schema;

pub use controller::{PurchaseController, PurchaseForm, PurchaseView};
pub use executor::{
    build_executor, ExplicitScopeExecutor, FailureKind, ManagedScopeExecutor, PurchaseExecutor,
    PurchaseOutcome,
};
pub use ledger::PurchaseLedger;
pub use model::{PaymentRecord, PurchaseRequest, TicketCountRecord};
