//! A backend that keeps transactions in process memory.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use crate::{
    Error,
    backend::TransactionBackend,
    transaction::{Transaction, TransactionId},
};

/// Stores transactions in memory, for local development and tests.
///
/// Clones share the same storage. The backend can be told to fail every
/// request with [InMemoryBackend::set_failing] to simulate the hosted backend
/// being unavailable.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBackend {
    transactions: Arc<Mutex<Vec<Transaction>>>,
    failing: Arc<AtomicBool>,
}

impl InMemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds `transactions`.
    pub fn with_transactions(transactions: Vec<Transaction>) -> Self {
        Self {
            transactions: Arc::new(Mutex::new(transactions)),
            failing: Arc::default(),
        }
    }

    /// Make every subsequent request fail (`true`) or succeed (`false`).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// A copy of the stored transactions.
    pub fn transactions(&self) -> Vec<Transaction> {
        self.transactions
            .lock()
            .map(|transactions| transactions.clone())
            .unwrap_or_default()
    }

    fn with_storage<T>(
        &self,
        operation: impl FnOnce(&mut Vec<Transaction>) -> T,
    ) -> Result<T, Error> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Backend("the in-memory backend is offline".to_owned()));
        }

        let mut transactions = self.transactions.lock().map_err(|error| {
            tracing::error!("could not acquire the in-memory backend lock: {error}");
            Error::Backend("the in-memory backend is unavailable".to_owned())
        })?;

        Ok(operation(&mut transactions))
    }
}

impl TransactionBackend for InMemoryBackend {
    async fn query_transactions(&self) -> Result<Vec<Transaction>, Error> {
        self.with_storage(|transactions| transactions.clone())
    }

    async fn persist_transaction(&self, transaction: &Transaction) -> Result<(), Error> {
        self.with_storage(|transactions| {
            match transactions
                .iter()
                .position(|stored| stored.id == transaction.id)
            {
                Some(index) => transactions[index] = transaction.clone(),
                None => transactions.push(transaction.clone()),
            }
        })
    }

    async fn delete_transaction(&self, id: TransactionId) -> Result<(), Error> {
        self.with_storage(|transactions| transactions.retain(|stored| stored.id != id))
    }

    async fn check_connection(&self) -> Result<(), Error> {
        self.with_storage(|_| ())
    }
}
