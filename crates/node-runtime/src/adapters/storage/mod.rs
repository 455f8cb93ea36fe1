//! # Storage Backends
//!
//! [`NodeStore`] picks the ledger's key-value store at startup and forwards
//! every [`KeyValueStore`] call to it.
//!
//! Enable the `rocksdb` feature for the RocksDB backend:
//!
//! ```toml
//! node-runtime = { path = "...", features = ["rocksdb"] }
//! ```

#[cfg(feature = "rocksdb")]
pub mod rocksdb_store;

#[cfg(feature = "rocksdb")]
pub use rocksdb_store::{RocksDbConfig, RocksDbStore};

use al_01_document_registry::{
    BatchOperation, FileBackedKVStore, InMemoryKVStore, KVStoreError, KeyValueStore, ScanResult,
};
use tracing::info;

use crate::container::config::{StorageBackend, StorageConfig};

/// Runtime-selected ledger store.
pub enum NodeStore {
    Memory(InMemoryKVStore),
    File(FileBackedKVStore),
    #[cfg(feature = "rocksdb")]
    RocksDb(RocksDbStore),
}

impl NodeStore {
    /// Open the backend named by the configuration.
    pub fn open(config: &StorageConfig) -> Result<Self, KVStoreError> {
        let store = match config.backend {
            StorageBackend::Memory => NodeStore::Memory(InMemoryKVStore::new()),
            StorageBackend::File => {
                let store = FileBackedKVStore::open(config.ledger_file())?;
                info!("[al-01] Ledger file: {}", store.path().display());
                NodeStore::File(store)
            }
            #[cfg(feature = "rocksdb")]
            StorageBackend::RocksDb => {
                NodeStore::RocksDb(RocksDbStore::open(RocksDbConfig::new(config.rocksdb_dir()))?)
            }
            #[cfg(not(feature = "rocksdb"))]
            StorageBackend::RocksDb => {
                return Err(KVStoreError::IOError {
                    message: "rocksdb backend not compiled in".to_string(),
                })
            }
        };
        info!("[al-01] Storage backend: {}", store.backend());
        Ok(store)
    }

    /// Backend this store was opened with.
    pub fn backend(&self) -> StorageBackend {
        match self {
            NodeStore::Memory(_) => StorageBackend::Memory,
            NodeStore::File(_) => StorageBackend::File,
            #[cfg(feature = "rocksdb")]
            NodeStore::RocksDb(_) => StorageBackend::RocksDb,
        }
    }

    fn inner(&self) -> &dyn KeyValueStore {
        match self {
            NodeStore::Memory(s) => s,
            NodeStore::File(s) => s,
            #[cfg(feature = "rocksdb")]
            NodeStore::RocksDb(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn KeyValueStore {
        match self {
            NodeStore::Memory(s) => s,
            NodeStore::File(s) => s,
            #[cfg(feature = "rocksdb")]
            NodeStore::RocksDb(s) => s,
        }
    }
}

impl KeyValueStore for NodeStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.inner().get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError> {
        self.inner_mut().put(key, value)
    }

    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError> {
        self.inner_mut().atomic_batch_write(operations)
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<ScanResult, KVStoreError> {
        self.inner().prefix_scan(prefix)
    }
}
