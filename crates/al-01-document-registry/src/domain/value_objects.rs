//! # Value Objects
//!
//! Input of the registration transaction.

use crate::domain::errors::RegistryError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Arguments of `registerDocument`, as they arrive from the submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterDocumentRequest {
    #[serde(rename = "documentID")]
    pub document_id: String,
    #[serde(rename = "ownerID")]
    pub owner_id: String,
    pub issuer: String,
    #[serde(rename = "documentType")]
    pub document_type: String,
    /// JSON payload; absent or empty means `{}`.
    #[serde(rename = "encryptionMetadata", default)]
    pub encryption_metadata: Option<String>,
}

impl RegisterDocumentRequest {
    pub fn new(
        document_id: impl Into<String>,
        owner_id: impl Into<String>,
        issuer: impl Into<String>,
        document_type: impl Into<String>,
    ) -> Self {
        Self {
            document_id: document_id.into(),
            owner_id: owner_id.into(),
            issuer: issuer.into(),
            document_type: document_type.into(),
            encryption_metadata: None,
        }
    }

    pub fn with_encryption_metadata(mut self, metadata: impl Into<String>) -> Self {
        self.encryption_metadata = Some(metadata.into());
        self
    }

    /// Reject empty identifiers and primary keys that would alias the
    /// composite key range.
    pub fn validate(&self) -> Result<(), RegistryError> {
        validate_document_id(&self.document_id)?;

        let required = [
            ("ownerID", &self.owner_id),
            ("issuer", &self.issuer),
            ("documentType", &self.document_type),
        ];
        for (field, value) in required {
            require_non_empty(field, value)?;
        }
        Ok(())
    }

    /// Parse the encryption metadata payload.
    pub fn parsed_encryption_metadata(&self) -> Result<Value, RegistryError> {
        match self.encryption_metadata.as_deref() {
            None | Some("") => Ok(Value::Object(serde_json::Map::new())),
            Some(raw) => serde_json::from_str(raw).map_err(|e| {
                RegistryError::InvalidEncryptionMetadata {
                    reason: e.to_string(),
                }
            }),
        }
    }
}

/// A primary key must be non-empty and must not start with U+0000, the
/// first byte of every composite key.
pub fn validate_document_id(document_id: &str) -> Result<(), RegistryError> {
    require_non_empty("documentID", document_id)?;
    if document_id.starts_with('\u{0000}') {
        return Err(RegistryError::InvalidArgument {
            field: "documentID",
            reason: "must not start with U+0000".to_string(),
        });
    }
    Ok(())
}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), RegistryError> {
    if value.is_empty() {
        return Err(RegistryError::InvalidArgument {
            field,
            reason: "must not be empty".to_string(),
        });
    }
    Ok(())
}
