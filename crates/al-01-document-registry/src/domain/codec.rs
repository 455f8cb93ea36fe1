//! # State Codec
//!
//! Documents are stored as JSON objects. Field order follows the struct and
//! object keys inside `encryptionMetadata` are sorted, so one logical value
//! always encodes to the same bytes.

use crate::domain::entities::{Document, RECORD_KIND};
use crate::domain::errors::RegistryError;

/// Encode a document for the ledger.
pub fn encode_document(document: &Document) -> Result<Vec<u8>, RegistryError> {
    serde_json::to_vec(document).map_err(|e| RegistryError::MalformedRecord {
        key: document.document_id.clone(),
        reason: format!("encode failed: {}", e),
    })
}

/// Decode a document read from the ledger.
///
/// `key` is only used for error reporting.
pub fn decode_document(key: &str, bytes: &[u8]) -> Result<Document, RegistryError> {
    let document: Document =
        serde_json::from_slice(bytes).map_err(|e| RegistryError::MalformedRecord {
            key: key.to_string(),
            reason: e.to_string(),
        })?;

    if document.record_kind != RECORD_KIND {
        return Err(RegistryError::MalformedRecord {
            key: key.to_string(),
            reason: format!(
                "record kind {:?}, expected {:?}",
                document.record_kind, RECORD_KIND
            ),
        });
    }

    Ok(document)
}
