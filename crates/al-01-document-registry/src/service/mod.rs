//! # Document Registry Service
//!
//! Application service implementing [`DocumentRegistryApi`]. Each call opens
//! one ledger transaction stamped by the `TimeSource`, runs the contract
//! inside it, and commits only if the contract succeeded.

pub mod contract;
#[cfg(test)]
mod tests;

use crate::adapters::ledger::Ledger;
use crate::domain::entities::Document;
use crate::domain::errors::RegistryError;
use crate::domain::value_objects::RegisterDocumentRequest;
use crate::ports::inbound::DocumentRegistryApi;
use crate::ports::outbound::{KeyValueStore, TimeSource, TransactionContext};
use contract::DocumentContract;

/// The Document Registry Service.
pub struct DocumentRegistryService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    ledger: Ledger<KV>,
    time_source: TS,
    contract: DocumentContract,
}

impl<KV, TS> DocumentRegistryService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    pub fn new(store: KV, time_source: TS) -> Self {
        Self::with_ledger(Ledger::new(store), time_source)
    }

    pub fn with_ledger(ledger: Ledger<KV>, time_source: TS) -> Self {
        Self {
            ledger,
            time_source,
            contract: DocumentContract::new(),
        }
    }

    pub fn ledger(&self) -> &Ledger<KV> {
        &self.ledger
    }

    /// Run a read-only query in its own transaction.
    fn query<T>(
        &self,
        run: impl FnOnce(&DocumentContract, &mut dyn TransactionContext) -> Result<T, RegistryError>,
    ) -> Result<T, RegistryError> {
        let mut tx = self.ledger.begin(self.time_source.now());
        let result = run(&self.contract, &mut tx);
        tx.rollback();
        result
    }
}

impl<KV, TS> DocumentRegistryApi for DocumentRegistryService<KV, TS>
where
    KV: KeyValueStore,
    TS: TimeSource,
{
    fn register_document(
        &self,
        request: RegisterDocumentRequest,
    ) -> Result<Document, RegistryError> {
        let mut tx = self.ledger.begin(self.time_source.now());
        let tx_id = tx.tx_id().to_string();

        let document = match self.contract.register_document(&mut tx, request) {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("[al-01] ✗ tx {} rejected: {}", tx_id, e);
                tx.rollback();
                return Err(e);
            }
        };

        let receipt = tx.commit().map_err(|e| {
            let err = RegistryError::from(e);
            tracing::warn!(
                "[al-01] ✗ tx {} failed to commit: {} (retryable: {})",
                tx_id,
                err,
                err.is_retryable()
            );
            err
        })?;

        tracing::info!(
            "[al-01] ✓ Document {} committed at sequence {}",
            document.document_id,
            receipt.sequence
        );
        Ok(document)
    }

    fn read_document(&self, document_id: &str) -> Result<Document, RegistryError> {
        self.query(|contract, ctx| contract.read_document(ctx, document_id))
    }

    fn document_exists(&self, document_id: &str) -> Result<bool, RegistryError> {
        self.query(|contract, ctx| contract.document_exists(ctx, document_id))
    }

    fn list_documents_by_owner(&self, owner_id: &str) -> Result<Vec<Document>, RegistryError> {
        self.query(|contract, ctx| contract.list_documents_by_owner(ctx, owner_id))
    }
}
