//! Repository layer for database operations.
//!
//! This module provides the `Repository` struct for all database operations.
//! Methods are organized across submodules by domain:
//! - `notes.rs` - Note operations
//! - `tasks.rs` - Task operations
//! - `internal.rs` - Internal record operations
//!
//! Every statement runs on the session handed out by the [`Driver`], so it
//! joins the transaction open under the current id when there is one.

mod internal;
mod notes;
mod tasks;

use std::future::Future;
use std::sync::Arc;

use super::{DbError, Driver};

/// Repository for database operations.
#[derive(Clone)]
pub struct Repository {
    driver: Arc<Driver>,
}

impl Repository {
    /// Create a new repository on top of the given driver.
    pub fn new(driver: Arc<Driver>) -> Self {
        Repository { driver }
    }

    /// Run `f` in a transaction; see [`Driver::transaction`].
    pub async fn transaction<T, E, F, Fut>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<DbError>,
    {
        self.driver.transaction(f).await
    }

    /// Round-trip a trivial statement on a fresh connection.
    ///
    /// # Errors
    /// Returns an error if no connection can be acquired or the query fails.
    pub async fn ping(&self) -> Result<(), DbError> {
        let mut session = self.driver.detached().await?;
        session.ping().await
    }
}
