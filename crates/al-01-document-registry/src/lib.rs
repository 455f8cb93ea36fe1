//! # Document Registry (al-01)
//!
//! Ledger-state contract that creates and indexes document records for the
//! translation / legalization / apostille pipeline.
//!
//! ## Registration Flow
//!
//! ```text
//! DocumentRegistryService::register_document
//!         │
//!         ↓
//!   Ledger::begin(tx_id, timestamp) ──→ LedgerTransaction (TransactionContext)
//!         │
//!         ↓
//!   DocumentContract::register_document
//!         │  check documentID → get_state(documentID) → validate args
//!         │  → parse metadata → normalize tx timestamp
//!         │  → put_state(documentID, record)
//!         │  → put_state(owner~document index key, 0x00)
//!         ↓
//!   LedgerTransaction::commit ──→ read-set validation + atomic batch write
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | `documentID` unique for the ledger lifetime | existence check + MVCC read set |
//! | `submissionTimestamp` from tx context only | `TransactionContext::tx_timestamp` |
//! | Owner index entry iff document exists | both writes in one commit batch |
//! | `encryptionMetadata` parses | checked before any write |
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Document entity, state codec, key builder, timestamps, errors
//! - `ports/` - Inbound API, outbound store / transaction context / time SPIs
//! - `adapters/` - Ordered KV stores, MVCC ledger host, time sources
//! - `service/` - The contract and the application service wrapping it

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::ledger::{CommitReceipt, Ledger, LedgerTransaction};
pub use adapters::storage::{FileBackedKVStore, InMemoryKVStore};
pub use adapters::time::{FixedTimeSource, SystemTimeSource};
pub use domain::codec::{decode_document, encode_document};
pub use domain::entities::{Document, DocumentStatus, RECORD_KIND};
pub use domain::errors::{
    KVStoreError, LedgerError, RegistryError, RegistryErrorKind, RegistryErrorPayload,
};
pub use domain::keys::{
    build_owner_index_key, create_composite_key, split_composite_key, OWNER_DOCUMENT_INDEX,
    OWNER_INDEX_SENTINEL,
};
pub use domain::timestamp::{normalize_timestamp, TxTimestamp, WideInt};
pub use domain::value_objects::RegisterDocumentRequest;
pub use ports::inbound::DocumentRegistryApi;
pub use ports::outbound::{
    BatchOperation, KeyValueStore, ScanResult, TimeSource, TransactionContext,
};
pub use service::contract::DocumentContract;
pub use service::DocumentRegistryService;
