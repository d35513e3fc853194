//! Transaction scope with explicit and managed release
//!
//! [`TransactionScope`] is the RAII handle for one transaction on a [`Store`].
//! It holds the store's scope gate for its whole life, so concurrent scopes on
//! the same connection run one after another instead of interleaving.
//! [`run_in_transaction`] is the managed form: it owns commit and rollback
//! around a caller-supplied unit of work.

use super::error::{Result, StoreError};
use super::statement::Statement;
use super::store::Store;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

/// Lifecycle of a transaction scope
///
/// `Committed` and `RolledBack` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TransactionState {
    NotStarted = 0,
    InProgress = 1,
    Committed = 2,
    RolledBack = 3,
}

impl TransactionState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => TransactionState::InProgress,
            2 => TransactionState::Committed,
            3 => TransactionState::RolledBack,
            _ => TransactionState::NotStarted,
        }
    }

    /// True for `Committed` and `RolledBack`
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TransactionState::Committed | TransactionState::RolledBack
        )
    }
}

/// Future returned by a unit of work passed to [`run_in_transaction`]
pub type UnitOfWork<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// An open transaction that rolls back on drop if not released
///
/// # Example
///
/// ```ignore
/// let scope = TransactionScope::begin(Arc::clone(&store)).await?;
/// scope.run(&first).await?;
/// scope.run(&second).await?;
/// scope.commit().await?;
/// ```
pub struct TransactionScope<S: Store + 'static> {
    store: Arc<S>,
    state: AtomicU8,
    permit: Option<OwnedMutexGuard<()>>,
}

impl<S: Store + 'static> TransactionScope<S> {
    /// Wait for the store's scope gate, then begin a transaction
    ///
    /// # Errors
    ///
    /// Returns an error if the store is not connected or `BEGIN` fails. No
    /// transaction is left open in that case.
    pub async fn begin(store: Arc<S>) -> Result<Self> {
        let permit = store.scope_gate().lock_owned().await;

        let scope = Self {
            store,
            state: AtomicU8::new(TransactionState::NotStarted as u8),
            permit: Some(permit),
        };
        if let Err(e) = scope.store.begin_transaction().await {
            if scope.store.in_transaction() {
                if let Err(rollback_err) = scope.store.rollback().await {
                    tracing::error!(error = %rollback_err, "rollback after failed begin also failed");
                }
            }
            return Err(e);
        }
        scope.set_state(TransactionState::InProgress);
        tracing::debug!(backend = scope.store.backend_name(), "transaction started");

        Ok(scope)
    }

    /// Current lifecycle state
    pub fn state(&self) -> TransactionState {
        TransactionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set_state(&self, state: TransactionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn ensure_in_progress(&self, action: &str) -> Result<()> {
        match self.state() {
            TransactionState::InProgress => Ok(()),
            other => Err(StoreError::transaction(format!(
                "Cannot {} in state {:?}",
                action, other
            ))),
        }
    }

    /// Run a statement inside the transaction
    ///
    /// # Errors
    ///
    /// Returns the store's error unchanged; the scope stays open so the caller
    /// decides whether to roll back.
    pub async fn run(&self, statement: &Statement) -> Result<u64> {
        self.ensure_in_progress("execute")?;
        self.store.run(statement).await
    }

    /// Commit the transaction
    ///
    /// If `COMMIT` itself fails and the store still holds the transaction
    /// open, it is rolled back before the error is returned, so the scope
    /// always ends terminal.
    pub async fn commit(self) -> Result<()> {
        self.ensure_in_progress("commit")?;

        match self.store.commit().await {
            Ok(()) => {
                self.set_state(TransactionState::Committed);
                tracing::debug!(backend = self.store.backend_name(), "transaction committed");
                Ok(())
            }
            Err(e) => {
                if self.store.in_transaction() {
                    if let Err(rollback_err) = self.store.rollback().await {
                        tracing::error!(error = %rollback_err, "rollback after failed commit also failed");
                    }
                } else {
                    tracing::error!(error = %e, "commit failed and the store no longer holds the transaction");
                }
                self.set_state(TransactionState::RolledBack);
                Err(e)
            }
        }
    }

    /// Roll the transaction back
    pub async fn rollback(self) -> Result<()> {
        self.ensure_in_progress("rollback")?;

        let result = self.store.rollback().await;
        self.set_state(TransactionState::RolledBack);
        tracing::debug!(backend = self.store.backend_name(), "transaction rolled back");
        result
    }
}

impl<S: Store + 'static> Drop for TransactionScope<S> {
    fn drop(&mut self) {
        if self.state() != TransactionState::InProgress {
            return;
        }
        self.set_state(TransactionState::RolledBack);

        let store = Arc::clone(&self.store);
        // The gate is released only after the rollback has run.
        let permit = self.permit.take();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!("transaction scope dropped while in progress, rolling back");
                handle.spawn(async move {
                    if let Err(e) = store.rollback().await {
                        tracing::error!(error = %e, "rollback of dropped transaction scope failed");
                    }
                    drop(permit);
                });
            }
            Err(_) => {
                tracing::warn!(
                    "transaction scope dropped outside a tokio runtime; \
                     the store discards the transaction when the connection closes"
                );
            }
        }
    }
}

/// Run `work` inside a new transaction on `store`
///
/// Commits when the unit of work returns `Ok`, rolls back when it returns
/// `Err`. The caller never touches commit or rollback.
///
/// ```ignore
/// run_in_transaction(&store, |scope| {
///     Box::pin(async move {
///         scope.run(&first).await?;
///         scope.run(&second).await?;
///         Ok::<_, StoreError>(())
///     })
/// })
/// .await?;
/// ```
pub async fn run_in_transaction<S, F, T>(store: &Arc<S>, work: F) -> Result<T>
where
    S: Store + 'static,
    F: for<'a> FnOnce(&'a TransactionScope<S>) -> UnitOfWork<'a, T>,
    T: Send,
{
    let scope = TransactionScope::begin(Arc::clone(store)).await?;

    let outcome = work(&scope).await;
    match outcome {
        Ok(value) => {
            scope.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = scope.rollback().await {
                tracing::error!(error = %rollback_err, "rollback failed");
            }
            Err(e)
        }
    }
}
