//! # Registry Container
//!
//! Opens the configured store and wires it to the document registry.
//!
//! ```text
//! NodeConfig ──→ NodeStore ──→ Ledger ──→ DocumentRegistryService
//!                                  ↑
//!                          SystemTimeSource
//! ```

use std::sync::Arc;

use al_01_document_registry::{DocumentRegistryService, KVStoreError, SystemTimeSource};
use tracing::{info, instrument};

use crate::adapters::NodeStore;
use crate::container::config::NodeConfig;

/// Registry service over the runtime-selected store.
pub type NodeRegistry = DocumentRegistryService<NodeStore, SystemTimeSource>;

/// Holds the registry service and the configuration it was built from.
pub struct RegistryContainer {
    pub registry: Arc<NodeRegistry>,
    /// Node configuration (immutable after initialization).
    pub config: NodeConfig,
}

impl RegistryContainer {
    #[instrument(name = "registry_init", skip(config))]
    pub fn new(config: NodeConfig) -> Result<Self, KVStoreError> {
        info!("[al-01] Initializing document registry");
        let store = NodeStore::open(&config.storage)?;
        let registry = Arc::new(DocumentRegistryService::new(store, SystemTimeSource));
        info!(
            "[al-01] Registry ready (backend={}, data_dir={:?})",
            config.storage.backend, config.storage.data_dir
        );
        Ok(Self { registry, config })
    }

    /// Container over an in-memory store.
    pub fn new_for_testing() -> Self {
        let registry = Arc::new(DocumentRegistryService::new(
            NodeStore::Memory(al_01_document_registry::InMemoryKVStore::new()),
            SystemTimeSource,
        ));
        Self {
            registry,
            config: NodeConfig::default(),
        }
    }

    pub fn registry(&self) -> Arc<NodeRegistry> {
        Arc::clone(&self.registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::config::{StorageBackend, StorageConfig};
    use al_01_document_registry::{DocumentRegistryApi, RegisterDocumentRequest};
    use tempfile::TempDir;

    #[test]
    fn test_container_initialization() {
        let container = RegistryContainer::new(NodeConfig::default()).unwrap();
        assert_eq!(container.config.storage.backend, StorageBackend::Memory);
        assert_eq!(container.registry().ledger().sequence(), 0);
    }

    #[test]
    fn test_file_backed_registry_persists_across_containers() {
        let dir = TempDir::new().unwrap();
        let config = NodeConfig {
            storage: StorageConfig {
                backend: StorageBackend::File,
                data_dir: dir.path().to_path_buf(),
            },
            ..NodeConfig::default()
        };

        {
            let container = RegistryContainer::new(config.clone()).unwrap();
            container
                .registry()
                .register_document(RegisterDocumentRequest::new(
                    "DOC-1", "OWNER-A", "ISSUER-1", "PASSPORT",
                ))
                .unwrap();
        }

        let container = RegistryContainer::new(config).unwrap();
        assert!(container.registry().document_exists("DOC-1").unwrap());
        assert_eq!(
            container
                .registry()
                .list_documents_by_owner("OWNER-A")
                .unwrap()
                .len(),
            1
        );
    }
}
