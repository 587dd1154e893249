//! Transaction management for the dashboard.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and its ID and type
//! - The form used to add and edit transactions, and its validation
//! - The `TransactionManager` that holds the dashboard's copy of the transactions
//! - The endpoints that create, edit and delete transactions

mod aggregates;
mod core;
mod create_endpoint;
pub mod date;
mod delete_endpoint;
mod edit_endpoint;
mod form;
mod id;
pub(crate) mod manager;
mod state;

pub use aggregates::Aggregates;
pub use core::{ParseTransactionTypeError, Transaction, TransactionId, TransactionType};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use edit_endpoint::edit_transaction_endpoint;
pub use form::{
    TransactionFields, TransactionForm, TransactionFormDefaults, ValidationError,
    transaction_form_fields,
};
pub use id::{IdGenerator, SequentialIdGenerator, UuidGenerator};
pub use manager::TransactionManager;
pub use state::{RedirectQuery, TransactionEndpointState};
