//! # Outbound Ports (Driven Ports)
//!
//! Dependencies the registry requires from its host.

use crate::domain::errors::{KVStoreError, LedgerError, RegistryError};
use crate::domain::keys::create_composite_key;
use crate::domain::timestamp::TxTimestamp;

/// Result of a prefix scan: `(key, value)` pairs sorted by key.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for key-value database operations.
///
/// Implementations must keep keys ordered so `prefix_scan` can enumerate a
/// composite key range.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// All entries whose key starts with `prefix`, in key order.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    Put { key: Vec<u8>, value: Vec<u8> },
    Delete { key: Vec<u8> },
}

impl BatchOperation {
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}

/// Deterministic execution context of one ledger transaction.
///
/// Every replica executing the same transaction sees the same state reads
/// and the same timestamp. Writes are buffered until the host commits.
pub trait TransactionContext {
    /// Identifier of the running transaction.
    fn tx_id(&self) -> &str;

    /// Committed value under `key`, if any.
    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Buffer a write of `value` under `key`.
    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError>;

    /// Committed entries under a partial composite key, in key order.
    fn get_state_by_partial_composite_key(
        &mut self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<Vec<(String, Vec<u8>)>, RegistryError>;

    /// Timestamp agreed on for this transaction.
    fn tx_timestamp(&self) -> TxTimestamp;

    /// Build a composite key in the ledger's key scheme.
    fn create_composite_key(
        &self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<String, RegistryError> {
        create_composite_key(object_type, attributes)
    }
}

/// Abstract interface for stamping transactions.
///
/// Hosts call this once per transaction, before execution.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> TxTimestamp;
}
