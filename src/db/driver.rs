//! Transaction-aware session dispatch.
//!
//! The driver keeps a map from [`TxId`] to the session of the transaction
//! opened under that id. Repository code asks for [`Driver::session`] and
//! gets the ambient transaction's session when one is open for the current
//! id, or a fresh autocommit session otherwise.

use std::collections::HashMap;
use std::future::Future;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, MutexGuard, PoisonError};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, warn};

use super::{Backend, DbError, Session};
use crate::context::{self, TxId};

type SharedSession = Arc<Mutex<Box<dyn Session>>>;

pub struct Driver {
    backend: Arc<dyn Backend>,
    open: std::sync::Mutex<HashMap<TxId, SharedSession>>,
}

/// A session borrowed from the driver.
pub enum SessionGuard {
    /// The session of the transaction open under the current id.
    Joined(OwnedMutexGuard<Box<dyn Session>>),
    /// A standalone autocommit session.
    Detached(Box<dyn Session>),
}

impl Deref for SessionGuard {
    type Target = dyn Session;

    fn deref(&self) -> &Self::Target {
        match self {
            SessionGuard::Joined(guard) => &***guard,
            SessionGuard::Detached(session) => &**session,
        }
    }
}

impl DerefMut for SessionGuard {
    fn deref_mut(&mut self) -> &mut Self::Target {
        match self {
            SessionGuard::Joined(guard) => &mut ***guard,
            SessionGuard::Detached(session) => &mut **session,
        }
    }
}

/// Unregisters a transaction when dropped, including when the future that
/// owns it is cancelled mid-flight.
struct Registration<'a> {
    driver: &'a Driver,
    id: TxId,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.driver.open_map().remove(&self.id);
    }
}

impl Driver {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Driver {
            backend,
            open: std::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Session for the next statement: the ambient transaction's when one
    /// is open under the current id, a new autocommit session otherwise.
    ///
    /// The guard serializes access to a shared transaction, so drop it
    /// before calling anything else that needs a session.
    pub async fn session(&self) -> Result<SessionGuard, DbError> {
        let joined = context::current().and_then(|id| self.bound(&id));
        match joined {
            Some(shared) => Ok(SessionGuard::Joined(shared.lock_owned().await)),
            None => Ok(SessionGuard::Detached(self.backend.connect().await?)),
        }
    }

    /// An autocommit session that never joins a transaction.
    pub async fn detached(&self) -> Result<Box<dyn Session>, DbError> {
        self.backend.connect().await
    }

    /// Run `f` inside a transaction bound to the current id.
    ///
    /// Binds a fresh id first when none is in scope. If a transaction is
    /// already open under the id, `f` simply joins it and the outermost
    /// call decides the outcome. Otherwise a transaction is opened, `f` runs,
    /// and the transaction commits on `Ok` and rolls back on `Err`. A failed
    /// rollback is logged and the original error is returned.
    ///
    /// # Errors
    /// Returns the error produced by `f`, or a [`DbError`] from begin/commit.
    pub async fn transaction<T, E, F, Fut>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<DbError>,
    {
        match context::current() {
            Some(id) => self.run_transaction(id, f).await,
            None => {
                let id = TxId::generate();
                context::scope(id.clone(), self.run_transaction(id, f)).await
            }
        }
    }

    /// Number of transactions currently open.
    pub fn open_transactions(&self) -> usize {
        self.open_map().len()
    }

    async fn run_transaction<T, E, F, Fut>(&self, id: TxId, f: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<DbError>,
    {
        if self.bound(&id).is_some() {
            return f().await;
        }

        let shared: SharedSession = Arc::new(Mutex::new(self.backend.begin().await?));
        self.open_map().insert(id.clone(), Arc::clone(&shared));
        let registration = Registration {
            driver: self,
            id: id.clone(),
        };
        debug!(tx_id = %id, "transaction opened");

        let result = f().await;
        drop(registration);

        let session = match Arc::try_unwrap(shared) {
            Ok(mutex) => mutex.into_inner(),
            Err(_) => return Err(DbError::TransactionBusy(id).into()),
        };

        match result {
            Ok(value) => {
                session.commit().await?;
                debug!(tx_id = %id, "transaction committed");
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = session.rollback().await {
                    warn!(tx_id = %id, error = %rollback_err, "rollback failed");
                } else {
                    debug!(tx_id = %id, "transaction rolled back");
                }
                Err(err)
            }
        }
    }

    fn bound(&self, id: &TxId) -> Option<SharedSession> {
        self.open_map().get(id).cloned()
    }

    fn open_map(&self) -> MutexGuard<'_, HashMap<TxId, SharedSession>> {
        self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
