//! Purchase request and the two records it produces

use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};

/// A validated ticket purchase
///
/// Built once per request by the boundary; executors trust its invariants
/// (non-empty customer id, positive quantity) and do not re-check them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseRequest {
    customer_id: String,
    quantity: i64,
}

impl PurchaseRequest {
    /// Validate and build a request
    pub fn new(customer_id: impl Into<String>, quantity: i64) -> Result<Self, ValidationError> {
        let customer_id = customer_id.into();
        if customer_id.trim().is_empty() {
            return Err(ValidationError::EmptyCustomerId);
        }
        if quantity <= 0 {
            return Err(ValidationError::NonPositiveQuantity(quantity));
        }
        Ok(Self {
            customer_id,
            quantity,
        })
    }

    pub fn customer_id(&self) -> &str {
        &self.customer_id
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    /// Payment row for this request at `unit_price` per ticket
    pub fn payment(&self, unit_price: i64) -> PaymentRecord {
        PaymentRecord {
            customer_id: self.customer_id.clone(),
            amount: self.quantity.saturating_mul(unit_price),
        }
    }

    /// Ticket-count row for this request
    pub fn ticket_count(&self) -> TicketCountRecord {
        TicketCountRecord {
            customer_id: self.customer_id.clone(),
            count_num: self.quantity,
        }
    }
}

/// One row of `payments`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub customer_id: String,
    pub amount: i64,
}

/// One row of `ticket_counts`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketCountRecord {
    pub customer_id: String,
    pub count_num: i64,
}
