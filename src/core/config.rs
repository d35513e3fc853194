//! Purchase configuration
//!
//! Loaded from JSON (string or file) or assembled with the builder methods.
//! Every field has a default, so `{}` is a valid configuration.

use super::error::{Result, StoreError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Price of one ticket
pub const DEFAULT_UNIT_PRICE: i64 = 10_000;

/// Most tickets one purchase may record; enforced by a CHECK constraint
pub const DEFAULT_MAX_TICKETS: i64 = 5;

/// Which executor runs the purchase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStrategy {
    /// Executor opens the scope and calls commit or rollback itself
    Explicit,
    /// Executor hands its writes to `run_in_transaction`
    #[default]
    Managed,
}

impl ExecutionStrategy {
    /// Convert strategy to string representation
    pub fn to_str(&self) -> &'static str {
        match self {
            ExecutionStrategy::Explicit => "explicit",
            ExecutionStrategy::Managed => "managed",
        }
    }
}

impl std::fmt::Display for ExecutionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.to_str())
    }
}

impl std::str::FromStr for ExecutionStrategy {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "explicit" => Ok(ExecutionStrategy::Explicit),
            "managed" => Ok(ExecutionStrategy::Managed),
            other => Err(StoreError::config(format!(
                "unknown execution strategy: {}",
                other
            ))),
        }
    }
}

/// Settings for the purchase store and executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PurchaseConfig {
    /// SQLite path, or `:memory:`
    pub connection_string: String,
    /// Price charged per ticket
    pub unit_price: i64,
    /// Upper bound written into the ticket-count CHECK constraint
    pub max_tickets: i64,
    /// Executor variant
    pub strategy: ExecutionStrategy,
    /// Per-operation timeout for the store, in milliseconds
    pub operation_timeout_ms: u64,
}

impl Default for PurchaseConfig {
    fn default() -> Self {
        Self {
            connection_string: ":memory:".to_string(),
            unit_price: DEFAULT_UNIT_PRICE,
            max_tickets: DEFAULT_MAX_TICKETS,
            strategy: ExecutionStrategy::default(),
            operation_timeout_ms: 30_000,
        }
    }
}

impl PurchaseConfig {
    /// Parse a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Set the connection string
    pub fn connection_string<S: Into<String>>(mut self, connection_string: S) -> Self {
        self.connection_string = connection_string.into();
        self
    }

    /// Set the unit price
    pub fn unit_price(mut self, unit_price: i64) -> Self {
        self.unit_price = unit_price;
        self
    }

    /// Set the ticket ceiling
    pub fn max_tickets(mut self, max_tickets: i64) -> Self {
        self.max_tickets = max_tickets;
        self
    }

    /// Set the execution strategy
    pub fn strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Store operation timeout
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    /// Reject values the store could not honour
    pub fn validate(&self) -> Result<()> {
        if self.connection_string.trim().is_empty() {
            return Err(StoreError::config("connection_string must not be empty"));
        }
        if self.unit_price <= 0 {
            return Err(StoreError::config("unit_price must be positive"));
        }
        if self.max_tickets <= 0 {
            return Err(StoreError::config("max_tickets must be positive"));
        }
        if self.operation_timeout_ms == 0 {
            return Err(StoreError::config("operation_timeout_ms must be positive"));
        }
        Ok(())
    }
}
