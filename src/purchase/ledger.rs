//! Read side of the purchase tables
//!
//! Used to show a customer's history and to check that a failed purchase left
//! nothing behind.

use super::model::{PaymentRecord, TicketCountRecord};
use super::schema::{PAYMENTS_TABLE, TICKET_COUNTS_TABLE};
use crate::core::error::{Result, StoreError};
use crate::core::store::Store;
use crate::core::value::SqlRow;
use std::sync::Arc;

/// Queries over `payments` and `ticket_counts`
pub struct PurchaseLedger<S: Store + 'static> {
    store: Arc<S>,
}

impl<S: Store + 'static> PurchaseLedger<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Payments recorded for `customer_id`, oldest first
    pub async fn payments_for(&self, customer_id: &str) -> Result<Vec<PaymentRecord>> {
        let rows = self
            .store
            .query_with_params(
                &format!(
                    "SELECT customerId, amount FROM {} WHERE customerId = ? ORDER BY id",
                    PAYMENTS_TABLE
                ),
                &[customer_id.into()],
            )
            .await?;

        rows.iter()
            .map(|row| {
                Ok(PaymentRecord {
                    customer_id: text_column(row, "customerId")?,
                    amount: integer_column(row, "amount")?,
                })
            })
            .collect()
    }

    /// Ticket counts recorded for `customer_id`, oldest first
    pub async fn ticket_counts_for(&self, customer_id: &str) -> Result<Vec<TicketCountRecord>> {
        let rows = self
            .store
            .query_with_params(
                &format!(
                    "SELECT customerId, countNum FROM {} WHERE customerId = ? ORDER BY id",
                    TICKET_COUNTS_TABLE
                ),
                &[customer_id.into()],
            )
            .await?;

        rows.iter()
            .map(|row| {
                Ok(TicketCountRecord {
                    customer_id: text_column(row, "customerId")?,
                    count_num: integer_column(row, "countNum")?,
                })
            })
            .collect()
    }

    /// Total rows in one of the purchase tables
    pub async fn count_rows(&self, table: &str) -> Result<i64> {
        if table != PAYMENTS_TABLE && table != TICKET_COUNTS_TABLE {
            return Err(StoreError::query(format!("not a purchase table: {}", table)));
        }

        let rows = self
            .store
            .query_with_params(&format!("SELECT COUNT(*) AS total FROM {}", table), &[])
            .await?;
        rows.first()
            .map(|row| integer_column(row, "total"))
            .unwrap_or(Ok(0))
    }
}

fn text_column(row: &SqlRow, column: &str) -> Result<String> {
    row.get(column)
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .ok_or_else(|| StoreError::query(format!("missing text column {}", column)))
}

fn integer_column(row: &SqlRow, column: &str) -> Result<i64> {
    row.get(column)
        .and_then(|v| v.as_integer())
        .ok_or_else(|| StoreError::query(format!("missing integer column {}", column)))
}
