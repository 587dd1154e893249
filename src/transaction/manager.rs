//! The in-memory collection of transactions and the operations that change it.

use std::sync::Mutex;

use time::OffsetDateTime;

use crate::{
    Error,
    timezone::UTC_TIMEZONE,
    transaction::{
        Aggregates, IdGenerator, Transaction, TransactionForm, TransactionId, TransactionType,
    },
};

/// Holds the user's transactions in the order they were added.
///
/// Every mutation comes in two halves: `prepare_*` validates the input and
/// builds the new record without touching the collection, and `commit_*`
/// applies it. Callers that persist to a backend do so between the two, so the
/// local collection only changes once the backend has accepted the change.
/// [TransactionManager::add] and [TransactionManager::edit] do both halves at
/// once.
pub struct TransactionManager {
    transactions: Vec<Transaction>,
    id_generator: Box<dyn IdGenerator>,
    clock: fn() -> OffsetDateTime,
    local_timezone: String,
}

impl TransactionManager {
    /// Create an empty manager.
    pub fn new(id_generator: impl IdGenerator + 'static) -> Self {
        Self::from_snapshot(Vec::new(), id_generator)
    }

    /// Create a manager holding `transactions`, e.g. the rows loaded from the backend.
    pub fn from_snapshot(
        transactions: Vec<Transaction>,
        id_generator: impl IdGenerator + 'static,
    ) -> Self {
        Self {
            transactions,
            id_generator: Box::new(id_generator),
            clock: OffsetDateTime::now_utc,
            local_timezone: UTC_TIMEZONE.to_owned(),
        }
    }

    /// Replace the clock used as the fallback for malformed dates.
    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Read form dates without an offset in `local_timezone`, a canonical
    /// timezone name such as "Pacific/Auckland". Defaults to UTC.
    pub fn with_local_timezone(mut self, local_timezone: &str) -> Self {
        self.local_timezone = local_timezone.to_owned();
        self
    }

    /// Validate `form` and build a new transaction with a fresh ID.
    ///
    /// The collection is not changed, pass the result to [TransactionManager::commit_add].
    ///
    /// # Errors
    /// Returns [Error::Validation] if a field is missing or invalid.
    pub fn prepare_add(&mut self, form: &TransactionForm) -> Result<Transaction, Error> {
        let fields = form.validate((self.clock)(), &self.local_timezone)?;

        Ok(fields.into_transaction(self.id_generator.next_id()))
    }

    /// Append a transaction built by [TransactionManager::prepare_add].
    pub fn commit_add(&mut self, transaction: Transaction) -> &Transaction {
        tracing::info!(
            "Added {} transaction {}",
            transaction.type_,
            transaction.id
        );
        self.transactions.push(transaction);
        &self.transactions[self.transactions.len() - 1]
    }

    /// Validate `form` and append it as a new transaction.
    ///
    /// # Errors
    /// Returns [Error::Validation] if a field is missing or invalid, in which
    /// case the collection is unchanged.
    pub fn add(&mut self, form: &TransactionForm) -> Result<&Transaction, Error> {
        let transaction = self.prepare_add(form)?;

        Ok(self.commit_add(transaction))
    }

    /// Validate `form` and build the replacement for the transaction `id`.
    ///
    /// The collection is not changed, pass the result to [TransactionManager::commit_edit].
    ///
    /// # Errors
    /// Returns:
    /// - [Error::UpdateMissingTransaction] if there is no transaction with `id`,
    /// - or [Error::Validation] if a field is missing or invalid.
    pub fn prepare_edit(
        &self,
        id: TransactionId,
        form: &TransactionForm,
    ) -> Result<Transaction, Error> {
        if self.get(id).is_none() {
            return Err(Error::UpdateMissingTransaction);
        }

        let fields = form.validate((self.clock)(), &self.local_timezone)?;

        Ok(fields.into_transaction(id))
    }

    /// Replace the transaction with the same ID as `transaction`.
    ///
    /// # Errors
    /// Returns [Error::UpdateMissingTransaction] if there is no transaction with that ID.
    pub fn commit_edit(&mut self, transaction: Transaction) -> Result<&Transaction, Error> {
        let index = self
            .position(transaction.id)
            .ok_or(Error::UpdateMissingTransaction)?;

        tracing::info!("Updated transaction {}", transaction.id);
        self.transactions[index] = transaction;

        Ok(&self.transactions[index])
    }

    /// Replace the transaction `id` with the contents of `form`.
    ///
    /// Only the matching record changes, all other records keep their
    /// contents and position.
    ///
    /// # Errors
    /// Returns:
    /// - [Error::UpdateMissingTransaction] if there is no transaction with `id`,
    /// - or [Error::Validation] if a field is missing or invalid.
    pub fn edit(
        &mut self,
        id: TransactionId,
        form: &TransactionForm,
    ) -> Result<&Transaction, Error> {
        let transaction = self.prepare_edit(id, form)?;

        self.commit_edit(transaction)
    }

    /// Remove the transaction `id`, returning it if it existed.
    ///
    /// Deleting an ID that does not exist does nothing.
    pub fn delete(&mut self, id: TransactionId) -> Option<Transaction> {
        match self.position(id) {
            Some(index) => {
                tracing::info!("Deleted transaction {id}");
                Some(self.transactions.remove(index))
            }
            None => {
                tracing::debug!("Tried to delete transaction {id}, which does not exist");
                None
            }
        }
    }

    /// The totals over all transactions, recomputed on every call.
    pub fn aggregates(&self) -> Aggregates {
        Aggregates::compute(&self.transactions)
    }

    /// Get the transaction `id`.
    pub fn get(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions
            .iter()
            .find(|transaction| transaction.id == id)
    }

    /// All transactions in the order they were added.
    pub fn all(&self) -> &[Transaction] {
        &self.transactions
    }

    /// The transactions of one type in the order they were added.
    pub fn by_type(&self, type_: TransactionType) -> impl Iterator<Item = &Transaction> {
        self.transactions
            .iter()
            .filter(move |transaction| transaction.type_ == type_)
    }

    /// The number of transactions.
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    /// Whether there are no transactions.
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    fn position(&self, id: TransactionId) -> Option<usize> {
        self.transactions
            .iter()
            .position(|transaction| transaction.id == id)
    }
}

/// Lock `manager` and run `operation` on it.
///
/// The lock is released before this function returns, so it is safe to call
/// from async code as long as the result is not a borrow of the manager.
///
/// # Errors
/// Returns [Error::ManagerLockError] if the lock is poisoned, otherwise the
/// result of `operation`.
pub fn with_locked_manager<T>(
    manager: &Mutex<TransactionManager>,
    operation: impl FnOnce(&mut TransactionManager) -> Result<T, Error>,
) -> Result<T, Error> {
    let mut manager = manager.lock().map_err(|error| {
        tracing::error!("Could not acquire the transaction manager lock: {error}");
        Error::ManagerLockError
    })?;

    operation(&mut manager)
}
