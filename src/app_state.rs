//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use crate::{backend::TransactionBackend, transaction::TransactionManager};

/// The state of the REST server.
#[derive(Clone)]
pub struct AppState<B: TransactionBackend> {
    /// The hosted backend that transactions are persisted to.
    pub backend: B,

    /// The server's copy of the transactions.
    pub manager: Arc<Mutex<TransactionManager>>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl<B: TransactionBackend> AppState<B> {
    /// Create a new [AppState].
    ///
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    /// Dates entered in forms are read in this timezone, and the dashboard
    /// shows dates in it.
    pub fn new(backend: B, manager: TransactionManager, local_timezone: &str) -> Self {
        Self {
            backend,
            manager: Arc::new(Mutex::new(manager.with_local_timezone(local_timezone))),
            local_timezone: local_timezone.to_owned(),
        }
    }
}
