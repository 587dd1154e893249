//! Defines the transaction backend trait and its implementations.
//!
//! The backend is the source of truth for transactions. The dashboard keeps
//! its own copy in a [crate::transaction::TransactionManager] and only changes
//! that copy after the backend has accepted a change.

mod memory;
mod supabase;

pub use memory::InMemoryBackend;
pub use supabase::SupabaseBackend;

use std::future::Future;

use crate::{
    Error,
    transaction::{Transaction, TransactionId},
};

/// Handles the storage and retrieval of transactions on a remote service.
pub trait TransactionBackend: Clone + Send + Sync + 'static {
    /// Fetch every stored transaction.
    fn query_transactions(&self) -> impl Future<Output = Result<Vec<Transaction>, Error>> + Send;

    /// Insert `transaction`, or replace the stored transaction with the same ID.
    fn persist_transaction(
        &self,
        transaction: &Transaction,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Remove the transaction `id`.
    ///
    /// Implementers should treat removing a transaction that does not exist
    /// as a success.
    fn delete_transaction(&self, id: TransactionId)
    -> impl Future<Output = Result<(), Error>> + Send;

    /// Check that the backend can be reached and accepts our credentials.
    fn check_connection(&self) -> impl Future<Output = Result<(), Error>> + Send;
}
