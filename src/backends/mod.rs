//! Store backends
//!
//! Concrete implementations of the [`Store`](crate::core::Store) trait.

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;
