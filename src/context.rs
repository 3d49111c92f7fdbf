//! Request-scoped transaction id.
//!
//! Every HTTP request and every CLI command runs with a `TxId` bound in a
//! task-local slot. The database driver keys its open transactions by this
//! id, so repository calls made anywhere below the handler join the same
//! transaction without threading a connection through every signature.

use std::fmt;
use std::future::Future;

use uuid::Uuid;

tokio::task_local! {
    static TX_ID: TxId;
}

/// Identifier of one unit of work (a request or a CLI invocation).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TxId(String);

impl TxId {
    /// Generate a fresh id: the simple (hyphen-less) hex form of a v4 UUID.
    pub fn generate() -> Self {
        TxId(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Run `fut` with `id` bound as the current transaction id.
pub async fn scope<F>(id: TxId, fut: F) -> F::Output
where
    F: Future,
{
    TX_ID.scope(id, fut).await
}

/// The transaction id bound to the current task, if any.
pub fn current() -> Option<TxId> {
    TX_ID.try_with(|id| id.clone()).ok()
}
