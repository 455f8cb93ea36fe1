//! # Document Contract
//!
//! The ledger-state contract. Every method runs inside a
//! [`TransactionContext`] supplied by the host and never reads a clock.
//!
//! ## registerDocument
//!
//! 1. `documentID` must be a usable primary key
//! 2. `get_state(documentID)` must be empty, else `DuplicateDocument`
//! 3. remaining identifiers non-empty, metadata parses
//! 4. timestamp from the transaction context
//! 5. `put_state(documentID, record)`, `put_state(owner index key, 0x00)`
//!
//! All checks precede the first write, so a failed call leaves an empty
//! write set.

use crate::domain::codec::{decode_document, encode_document};
use crate::domain::entities::Document;
use crate::domain::errors::RegistryError;
use crate::domain::keys::{split_composite_key, OWNER_DOCUMENT_INDEX, OWNER_INDEX_SENTINEL};
use crate::domain::value_objects::{
    require_non_empty, validate_document_id, RegisterDocumentRequest,
};
use crate::ports::outbound::TransactionContext;

#[derive(Debug, Default, Clone, Copy)]
pub struct DocumentContract;

impl DocumentContract {
    pub fn new() -> Self {
        Self
    }

    /// Create a document record and its owner index entry.
    pub fn register_document<C>(
        &self,
        ctx: &mut C,
        request: RegisterDocumentRequest,
    ) -> Result<Document, RegistryError>
    where
        C: TransactionContext + ?Sized,
    {
        validate_document_id(&request.document_id)?;

        if has_value(ctx.get_state(&request.document_id)?) {
            return Err(RegistryError::DuplicateDocument {
                document_id: request.document_id,
            });
        }

        request.validate()?;
        let encryption_metadata = request.parsed_encryption_metadata()?;
        let submission_timestamp = ctx.tx_timestamp().to_iso8601()?;
        let index_key = ctx.create_composite_key(
            OWNER_DOCUMENT_INDEX,
            &[request.owner_id.as_str(), request.document_id.as_str()],
        )?;

        let RegisterDocumentRequest {
            document_id,
            owner_id,
            issuer,
            document_type,
            ..
        } = request;
        let document = Document::submitted(
            document_id,
            owner_id,
            issuer,
            document_type,
            submission_timestamp,
            encryption_metadata,
        );
        let record = encode_document(&document)?;

        ctx.put_state(&document.document_id, &record)?;
        ctx.put_state(&index_key, OWNER_INDEX_SENTINEL)?;

        tracing::info!(
            "[al-01] 📄 Document {} registered for owner {} (tx {}, submitted {})",
            document.document_id,
            document.owner_id,
            ctx.tx_id(),
            document.submission_timestamp
        );

        Ok(document)
    }

    /// Read a document by id.
    pub fn read_document<C>(&self, ctx: &mut C, document_id: &str) -> Result<Document, RegistryError>
    where
        C: TransactionContext + ?Sized,
    {
        validate_document_id(document_id)?;

        match ctx.get_state(document_id)? {
            Some(bytes) if !bytes.is_empty() => decode_document(document_id, &bytes),
            _ => Err(RegistryError::DocumentNotFound {
                document_id: document_id.to_string(),
            }),
        }
    }

    pub fn document_exists<C>(&self, ctx: &mut C, document_id: &str) -> Result<bool, RegistryError>
    where
        C: TransactionContext + ?Sized,
    {
        validate_document_id(document_id)?;
        Ok(has_value(ctx.get_state(document_id)?))
    }

    /// Documents of one owner, found through the owner index.
    ///
    /// An index entry without its document breaks the pairing invariant and
    /// is reported as `MalformedRecord`.
    pub fn list_documents_by_owner<C>(
        &self,
        ctx: &mut C,
        owner_id: &str,
    ) -> Result<Vec<Document>, RegistryError>
    where
        C: TransactionContext + ?Sized,
    {
        require_non_empty("ownerID", owner_id)?;

        let entries = ctx.get_state_by_partial_composite_key(OWNER_DOCUMENT_INDEX, &[owner_id])?;

        let mut documents = Vec::with_capacity(entries.len());
        for (index_key, _) in entries {
            let (_, attributes) = split_composite_key(&index_key)?;
            let document_id = match attributes.as_slice() {
                [owner, document_id] if owner == owner_id => document_id,
                _ => {
                    return Err(RegistryError::MalformedRecord {
                        key: index_key,
                        reason: "owner index key must be (ownerID, documentID)".to_string(),
                    })
                }
            };

            match self.read_document(ctx, document_id) {
                Ok(document) => documents.push(document),
                Err(RegistryError::DocumentNotFound { .. }) => {
                    return Err(RegistryError::MalformedRecord {
                        key: index_key,
                        reason: "owner index entry without document".to_string(),
                    })
                }
                Err(e) => return Err(e),
            }
        }

        Ok(documents)
    }
}

/// The ledger reports a deleted key as an empty value.
fn has_value(value: Option<Vec<u8>>) -> bool {
    value.is_some_and(|bytes| !bytes.is_empty())
}
