//! Transaction storage seam.

use crate::error::StorageError;
use crate::models::receipt::{ExtractionResult, TransactionId};

/// Persists confirmed results.
pub trait Ledger {
    /// Store one confirmed result and return its identifier.
    fn persist(&mut self, result: &ExtractionResult) -> Result<TransactionId, StorageError>;
}

impl<L: Ledger + ?Sized> Ledger for &mut L {
    fn persist(&mut self, result: &ExtractionResult) -> Result<TransactionId, StorageError> {
        (**self).persist(result)
    }
}

/// In-process ledger, ids start at 1.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    records: Vec<(TransactionId, ExtractionResult)>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[(TransactionId, ExtractionResult)] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl Ledger for MemoryLedger {
    fn persist(&mut self, result: &ExtractionResult) -> Result<TransactionId, StorageError> {
        if result.amount.value.is_none() {
            return Err(StorageError::Rejected("record has no amount".to_string()));
        }
        let id = TransactionId(self.records.len() as u64 + 1);
        self.records.push((id, result.clone()));
        Ok(id)
    }
}
