//! # Domain Errors
//!
//! Error types for the Document Registry subsystem.
//!
//! Every failure of `registerDocument` is detected before the first write;
//! `MalformedRecord` only ever surfaces on the read path.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the registry contract and service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A record already exists under this `documentID`.
    #[error("Document already registered: {document_id}")]
    DuplicateDocument { document_id: String },

    /// The encryption metadata payload is not valid JSON.
    #[error("Invalid encryption metadata: {reason}")]
    InvalidEncryptionMetadata { reason: String },

    /// A required identifier is empty or contains a reserved character.
    #[error("Invalid argument `{field}`: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// Stored bytes could not be decoded.
    #[error("Malformed record at {key:?}: {reason}")]
    MalformedRecord { key: String, reason: String },

    /// No record exists under this `documentID`.
    #[error("Document not found: {document_id}")]
    DocumentNotFound { document_id: String },

    /// The transaction timestamp cannot be represented as an ISO-8601 instant.
    #[error("Invalid transaction timestamp: {reason}")]
    InvalidTimestamp { reason: String },

    /// Ledger host failure (storage I/O, commit conflict).
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl RegistryError {
    pub fn kind(&self) -> RegistryErrorKind {
        match self {
            RegistryError::DuplicateDocument { .. } => RegistryErrorKind::DuplicateDocument,
            RegistryError::InvalidEncryptionMetadata { .. } => {
                RegistryErrorKind::InvalidEncryptionMetadata
            }
            RegistryError::InvalidArgument { .. } => RegistryErrorKind::InvalidArgument,
            RegistryError::MalformedRecord { .. } => RegistryErrorKind::MalformedRecord,
            RegistryError::DocumentNotFound { .. } => RegistryErrorKind::DocumentNotFound,
            RegistryError::InvalidTimestamp { .. } => RegistryErrorKind::InvalidTimestamp,
            RegistryError::Ledger(_) => RegistryErrorKind::LedgerError,
        }
    }

    /// Whether resubmitting the same request can succeed.
    ///
    /// Only commit conflicts qualify; the retry re-reads the key and will
    /// then usually fail with `DuplicateDocument`.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RegistryError::Ledger(LedgerError::MvccReadConflict { .. })
        )
    }
}

/// Errors raised by the ledger host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Store(#[from] KVStoreError),

    /// A key read by the transaction was committed by another transaction
    /// before this one.
    #[error("MVCC read conflict on key {key:?}")]
    MvccReadConflict { key: String },

    /// A stored key is not valid UTF-8.
    #[error("Invalid ledger key: {reason}")]
    InvalidKey { reason: String },
}

/// Key-value store errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KVStoreError {
    #[error("KV store I/O error: {message}")]
    IOError { message: String },

    #[error("KV store corruption: {message}")]
    CorruptionError { message: String },
}

/// Serializable error returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryErrorPayload {
    pub kind: RegistryErrorKind,
    pub message: String,
}

impl From<&RegistryError> for RegistryErrorPayload {
    fn from(err: &RegistryError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<RegistryError> for RegistryErrorPayload {
    fn from(err: RegistryError) -> Self {
        Self::from(&err)
    }
}

/// Error kind enumeration for serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegistryErrorKind {
    DuplicateDocument,
    InvalidEncryptionMetadata,
    InvalidArgument,
    MalformedRecord,
    DocumentNotFound,
    InvalidTimestamp,
    LedgerError,
}

impl RegistryErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RegistryErrorKind::DuplicateDocument => "DuplicateDocument",
            RegistryErrorKind::InvalidEncryptionMetadata => "InvalidEncryptionMetadata",
            RegistryErrorKind::InvalidArgument => "InvalidArgument",
            RegistryErrorKind::MalformedRecord => "MalformedRecord",
            RegistryErrorKind::DocumentNotFound => "DocumentNotFound",
            RegistryErrorKind::InvalidTimestamp => "InvalidTimestamp",
            RegistryErrorKind::LedgerError => "LedgerError",
        }
    }
}
