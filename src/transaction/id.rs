//! Identifier generation for new transactions.

use uuid::Uuid;

use crate::transaction::TransactionId;

/// Produces the IDs for newly added transactions.
pub trait IdGenerator: Send {
    /// Get the next unused ID.
    fn next_id(&mut self) -> TransactionId;
}

/// Generates random (v4) UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&mut self) -> TransactionId {
        TransactionId::from_uuid(Uuid::new_v4())
    }
}

/// Generates the IDs 1, 2, 3, ... encoded as UUIDs.
///
/// Useful wherever the IDs need to be known ahead of time, e.g. in tests.
#[derive(Debug, Default, Clone)]
pub struct SequentialIdGenerator {
    last: u128,
}

impl SequentialIdGenerator {
    /// Create a generator whose first ID is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// The `n`th ID this generator produces, starting at 1.
    pub fn nth(n: u128) -> TransactionId {
        TransactionId::from_uuid(Uuid::from_u128(n))
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> TransactionId {
        self.last += 1;
        Self::nth(self.last)
    }
}
