//! # Inbound Ports (Driving Ports)

use crate::domain::entities::Document;
use crate::domain::errors::RegistryError;
use crate::domain::value_objects::RegisterDocumentRequest;

/// Primary API of the Document Registry.
///
/// Each call runs as one ledger transaction.
pub trait DocumentRegistryApi {
    /// Create a document record and its owner index entry.
    ///
    /// ## Errors
    ///
    /// - `InvalidArgument`: empty identifier or reserved character
    /// - `InvalidEncryptionMetadata`: payload is not JSON
    /// - `DuplicateDocument`: `documentID` already registered
    /// - `Ledger(MvccReadConflict)`: a concurrent registration committed first
    ///
    /// No write is visible after any error.
    fn register_document(&self, request: RegisterDocumentRequest)
        -> Result<Document, RegistryError>;

    /// Read a document by its id.
    fn read_document(&self, document_id: &str) -> Result<Document, RegistryError>;

    /// Check whether a document id is registered.
    fn document_exists(&self, document_id: &str) -> Result<bool, RegistryError>;

    /// All documents of one owner, ordered by document id.
    fn list_documents_by_owner(&self, owner_id: &str) -> Result<Vec<Document>, RegistryError>;
}
