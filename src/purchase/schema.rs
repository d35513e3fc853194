//! Purchase tables and the statements that fill them
//!
//! The ticket ceiling lives in the table definition, not in the executors: a
//! purchase over the limit is rejected by SQLite's CHECK constraint.

use super::model::{PaymentRecord, TicketCountRecord};
use crate::core::error::Result;
use crate::core::statement::{InsertBuilder, Statement};
use crate::core::store::Store;

/// Payments table name
pub const PAYMENTS_TABLE: &str = "payments";

/// Ticket-count table name
pub const TICKET_COUNTS_TABLE: &str = "ticket_counts";

/// Create both purchase tables if they do not exist
///
/// `max_tickets` becomes the `CHECK (countNum <= ?)` bound on `ticket_counts`.
pub async fn install<S: Store + ?Sized>(store: &S, max_tickets: i64) -> Result<()> {
    store
        .execute(&format!(
            "CREATE TABLE IF NOT EXISTS {PAYMENTS_TABLE} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customerId TEXT NOT NULL,
                amount INTEGER NOT NULL
            );
            CREATE TABLE IF NOT EXISTS {TICKET_COUNTS_TABLE} (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                customerId TEXT NOT NULL,
                countNum INTEGER NOT NULL CHECK (countNum <= {max_tickets})
            );"
        ))
        .await?;

    tracing::info!(max_tickets, "purchase schema installed");
    Ok(())
}

/// `INSERT INTO payments (customerId, amount) VALUES (?, ?)`
pub fn payment_statement(record: &PaymentRecord) -> Statement {
    InsertBuilder::new(PAYMENTS_TABLE)
        .value("customerId", record.customer_id.as_str())
        .value("amount", record.amount)
        .build()
}

/// `INSERT INTO ticket_counts (customerId, countNum) VALUES (?, ?)`
pub fn ticket_count_statement(record: &TicketCountRecord) -> Statement {
    InsertBuilder::new(TICKET_COUNTS_TABLE)
        .value("customerId", record.customer_id.as_str())
        .value("countNum", record.count_num)
        .build()
}
