//! Implements a struct that holds the state of the server.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::{Error, transaction::TransactionStore};

/// The state shared by every connection.
///
/// The store reads and rewrites the whole data file on each operation, so all
/// store calls go through one mutex to keep concurrent requests from
/// interleaving their writes.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The transaction store behind a lock.
    pub store: Arc<Mutex<TransactionStore>>,
}

impl AppState {
    /// Create a new [AppState] and make sure the store's data file exists.
    ///
    /// # Errors
    /// Returns [Error::Io] if the data file cannot be created.
    pub fn new(store: TransactionStore) -> Result<Self, Error> {
        store.ensure_initialized()?;

        Ok(Self {
            store: Arc::new(Mutex::new(store)),
        })
    }

    /// Acquire the store lock.
    ///
    /// # Errors
    /// Returns [Error::StoreLockError] if another thread panicked while holding the lock.
    pub fn lock_store(&self) -> Result<MutexGuard<'_, TransactionStore>, Error> {
        self.store.lock().map_err(|error| {
            tracing::error!("Could not acquire the store lock: {error}");
            Error::StoreLockError
        })
    }
}
