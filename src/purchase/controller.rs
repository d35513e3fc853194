//! Purchase boundary
//!
//! Turns a raw form into a validated request, runs the configured executor and
//! builds what a page would show: a success-or-fail message plus the echoed
//! ticket info. No HTTP or HTML here.

use super::executor::{build_executor, PurchaseExecutor, PurchaseOutcome};
use super::model::PurchaseRequest;
use super::schema;
use crate::core::config::PurchaseConfig;
use crate::core::error::{Result, ValidationError};
use crate::core::store::Store;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Message shown when both rows were committed
pub const SUCCESS_MESSAGE: &str = "Ticket purchase completed.";

/// Message shown for any failure; the cause is not exposed
pub const RETRY_MESSAGE: &str = "Ticket purchase was cancelled. Please try again.";

/// Raw form fields as submitted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseForm {
    #[serde(rename = "customerId")]
    pub customer_id: String,
    pub amount: i64,
}

/// What the result page renders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseView {
    pub success_or_fail: &'static str,
    pub ticket_info: PurchaseRequest,
    pub outcome: PurchaseOutcome,
}

/// Validates forms and runs purchases through one executor
pub struct PurchaseController {
    executor: Box<dyn PurchaseExecutor>,
}

impl PurchaseController {
    /// Create a new controller around an already built executor
    pub fn new(executor: Box<dyn PurchaseExecutor>) -> Self {
        Self { executor }
    }

    /// Connect `store`, install the schema and pick the executor from `config`
    ///
    /// `store` arrives built, so `config.operation_timeout_ms` is the
    /// caller's to apply when constructing it, e.g. with
    /// [`SqliteStore::from_config`](crate::backends::SqliteStore::from_config).
    pub async fn from_config<S: Store + 'static>(
        store: Arc<S>,
        config: &PurchaseConfig,
    ) -> Result<Self> {
        config.validate()?;
        store.connect(&config.connection_string).await?;
        schema::install(store.as_ref(), config.max_tickets).await?;

        tracing::info!(
            strategy = %config.strategy,
            unit_price = config.unit_price,
            operation_timeout_ms = config.operation_timeout_ms,
            "purchase controller ready"
        );
        Ok(Self::new(build_executor(
            store,
            config.strategy,
            config.unit_price,
        )))
    }

    /// Executor every purchase runs through
    pub fn executor(&self) -> &dyn PurchaseExecutor {
        self.executor.as_ref()
    }

    /// Validate the form and attempt the purchase
    ///
    /// A form that fails validation never reaches the store.
    pub async fn buy_ticket(
        &self,
        form: &PurchaseForm,
    ) -> std::result::Result<PurchaseView, ValidationError> {
        let request = PurchaseRequest::new(form.customer_id.clone(), form.amount)?;
        let outcome = self.executor.execute_detailed(&request).await;

        Ok(PurchaseView {
            success_or_fail: if outcome.committed {
                SUCCESS_MESSAGE
            } else {
                RETRY_MESSAGE
            },
            ticket_info: request,
            outcome,
        })
    }
}
