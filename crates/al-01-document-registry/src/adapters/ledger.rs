//! # Ledger Host
//!
//! Single-node stand-in for the replicated ledger the contract runs on. It
//! provides what the contract assumes from its platform:
//!
//! - committed-state reads with a recorded read set
//! - buffered writes, applied together or not at all
//! - a timestamp fixed when the transaction begins
//! - commit-time read-set validation (optimistic concurrency)
//!
//! ```text
//! begin ──→ get_state / put_state ... ──→ commit
//!                                           │
//!                     read-set versions unchanged? ──no──→ MvccReadConflict
//!                                           │yes
//!                                           ↓
//!                           atomic_batch_write(write set), bump versions
//! ```
//!
//! Reads do not observe the transaction's own pending writes.
//!
//! A key's version is the commit sequence that last wrote it. Versions at or
//! below the oldest open transaction's begin sequence are forgotten, so the
//! version map only covers recent writes.

use crate::domain::errors::{LedgerError, RegistryError};
use crate::domain::keys::create_composite_key;
use crate::domain::timestamp::TxTimestamp;
use crate::ports::outbound::{BatchOperation, KeyValueStore, TransactionContext};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};

/// Version of a key with no tracked write.
const UNVERSIONED: u64 = 0;

/// Tracked versions above which a commit prunes the map.
const VERSION_PRUNE_THRESHOLD: usize = 1024;

struct LedgerState<KV> {
    store: KV,
    /// Commit sequence that last wrote each key, for recent writes only.
    versions: HashMap<Vec<u8>, u64>,
    /// Sequence number of the last commit that wrote anything.
    sequence: u64,
    /// Open transactions, counted by the sequence they began at.
    active: BTreeMap<u64, usize>,
}

impl<KV> LedgerState<KV> {
    fn current_version(&self, key: &[u8]) -> u64 {
        self.versions.get(key).copied().unwrap_or(UNVERSIONED)
    }

    /// Drop versions no open transaction can still conflict with.
    fn prune_versions(&mut self) {
        match self.active.keys().next().copied() {
            None => self.versions.clear(),
            Some(oldest) => self.versions.retain(|_, version| *version > oldest),
        }
    }

    fn finish(&mut self, begin_sequence: u64) {
        if let Some(count) = self.active.get_mut(&begin_sequence) {
            *count -= 1;
            if *count == 0 {
                self.active.remove(&begin_sequence);
            }
        }
        if self.active.is_empty() {
            self.versions.clear();
        }
    }
}

/// Ledger host over an ordered key-value store.
pub struct Ledger<KV: KeyValueStore> {
    state: RwLock<LedgerState<KV>>,
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub tx_id: String,
    /// Commit sequence; unchanged for read-only transactions.
    pub sequence: u64,
    /// Number of keys written.
    pub writes: usize,
}

impl<KV: KeyValueStore> Ledger<KV> {
    pub fn new(store: KV) -> Self {
        Self {
            state: RwLock::new(LedgerState {
                store,
                versions: HashMap::new(),
                sequence: 0,
                active: BTreeMap::new(),
            }),
        }
    }

    /// Begin a transaction with a fresh id.
    pub fn begin(&self, timestamp: TxTimestamp) -> LedgerTransaction<'_, KV> {
        self.begin_with_id(uuid::Uuid::new_v4().to_string(), timestamp)
    }

    /// Begin a transaction with a caller-chosen id.
    pub fn begin_with_id(
        &self,
        tx_id: impl Into<String>,
        timestamp: TxTimestamp,
    ) -> LedgerTransaction<'_, KV> {
        let begin_sequence = {
            let mut state = self.state.write();
            let sequence = state.sequence;
            *state.active.entry(sequence).or_insert(0) += 1;
            sequence
        };
        LedgerTransaction {
            ledger: self,
            tx_id: tx_id.into(),
            begin_sequence,
            timestamp,
            read_set: BTreeMap::new(),
            write_set: BTreeMap::new(),
        }
    }

    /// Sequence number of the last writing commit.
    pub fn sequence(&self) -> u64 {
        self.state.read().sequence
    }

    /// Committed value under `key`, outside any transaction.
    pub fn read_committed(&self, key: &[u8]) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.state.read().store.get(key)?)
    }

    /// Number of committed entries under `prefix`, outside any transaction.
    pub fn count_committed(&self, prefix: &[u8]) -> Result<usize, LedgerError> {
        Ok(self.state.read().store.prefix_scan(prefix)?.len())
    }

    #[cfg(test)]
    fn tracked_versions(&self) -> usize {
        self.state.read().versions.len()
    }
}

/// One running transaction. Implements [`TransactionContext`].
///
/// Dropping it without [`commit`](Self::commit) discards its writes.
pub struct LedgerTransaction<'a, KV: KeyValueStore> {
    ledger: &'a Ledger<KV>,
    tx_id: String,
    /// Ledger sequence when the transaction began.
    begin_sequence: u64,
    timestamp: TxTimestamp,
    read_set: BTreeMap<Vec<u8>, u64>,
    write_set: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl<'a, KV: KeyValueStore> LedgerTransaction<'a, KV> {
    /// Validate the read set and apply the write set.
    ///
    /// A read conflicts when its key was written after it was read. Keys
    /// only move to newer versions, and pruned keys fall back below any
    /// version a transaction could have seen.
    pub fn commit(mut self) -> Result<CommitReceipt, LedgerError> {
        let tx_id = std::mem::take(&mut self.tx_id);
        let read_set = std::mem::take(&mut self.read_set);
        let write_set = std::mem::take(&mut self.write_set);

        let mut state = self.ledger.state.write();

        for (key, seen) in &read_set {
            let current = state.current_version(key);
            if current > *seen {
                let key = String::from_utf8_lossy(key).into_owned();
                tracing::warn!(
                    "[al-01] ⚠️ tx {} rejected: MVCC read conflict on {:?} (read v{}, now v{})",
                    tx_id,
                    key,
                    seen,
                    current
                );
                return Err(LedgerError::MvccReadConflict { key });
            }
        }

        if write_set.is_empty() {
            return Ok(CommitReceipt {
                tx_id,
                sequence: state.sequence,
                writes: 0,
            });
        }

        let sequence = state.sequence + 1;
        let writes = write_set.len();
        let written_keys: Vec<Vec<u8>> = write_set.keys().cloned().collect();
        let operations = write_set
            .into_iter()
            .map(|(key, value)| BatchOperation::put(key, value))
            .collect();

        state.store.atomic_batch_write(operations)?;
        for key in written_keys {
            state.versions.insert(key, sequence);
        }
        state.sequence = sequence;
        if state.versions.len() >= VERSION_PRUNE_THRESHOLD {
            state.prune_versions();
        }

        tracing::debug!(
            "[al-01] tx {} committed at sequence {} ({} writes)",
            tx_id,
            sequence,
            writes
        );

        Ok(CommitReceipt {
            tx_id,
            sequence,
            writes,
        })
    }

    /// Discard the transaction.
    pub fn rollback(self) {
        tracing::debug!(
            "[al-01] tx {} rolled back ({} buffered writes dropped)",
            self.tx_id,
            self.write_set.len()
        );
    }

    /// Number of buffered writes.
    pub fn pending_writes(&self) -> usize {
        self.write_set.len()
    }

    fn record_read(&mut self, key: &[u8], version: u64) {
        self.read_set.entry(key.to_vec()).or_insert(version);
    }
}

impl<'a, KV: KeyValueStore> Drop for LedgerTransaction<'a, KV> {
    fn drop(&mut self) {
        self.ledger.state.write().finish(self.begin_sequence);
    }
}

impl<'a, KV: KeyValueStore> TransactionContext for LedgerTransaction<'a, KV> {
    fn tx_id(&self) -> &str {
        &self.tx_id
    }

    fn get_state(&mut self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        let (value, version) = {
            let state = self.ledger.state.read();
            let value = state.store.get(key.as_bytes())?;
            (value, state.current_version(key.as_bytes()))
        };
        self.record_read(key.as_bytes(), version);
        Ok(value)
    }

    fn put_state(&mut self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        if key.is_empty() {
            return Err(LedgerError::InvalidKey {
                reason: "key must not be empty".to_string(),
            });
        }
        self.write_set.insert(key.as_bytes().to_vec(), value.to_vec());
        Ok(())
    }

    fn get_state_by_partial_composite_key(
        &mut self,
        object_type: &str,
        attributes: &[&str],
    ) -> Result<Vec<(String, Vec<u8>)>, RegistryError> {
        let prefix = create_composite_key(object_type, attributes)?;

        let entries: Vec<(Vec<u8>, Vec<u8>, u64)> = {
            let state = self.ledger.state.read();
            let scanned = state
                .store
                .prefix_scan(prefix.as_bytes())
                .map_err(LedgerError::from)?;
            scanned
                .into_iter()
                .map(|(key, value)| {
                    let version = state.current_version(&key);
                    (key, value, version)
                })
                .collect()
        };

        let mut results = Vec::with_capacity(entries.len());
        for (key, value, version) in entries {
            self.record_read(&key, version);
            let key = String::from_utf8(key).map_err(|e| LedgerError::InvalidKey {
                reason: e.to_string(),
            })?;
            results.push((key, value));
        }
        Ok(results)
    }

    fn tx_timestamp(&self) -> TxTimestamp {
        self.timestamp
    }
}
