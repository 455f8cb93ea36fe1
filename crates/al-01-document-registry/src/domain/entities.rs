//! # Document Entity
//!
//! The ledger-resident record of one physical document undergoing
//! translation, legalization and apostille.

use serde::{Deserialize, Serialize};

/// Record kind tag stored in every document record.
///
/// Entity types share one key space; the tag tells them apart.
pub const RECORD_KIND: &str = "document";

/// Lifecycle status of a document.
///
/// Only `Submitted` is produced by registration; the remaining states belong
/// to follow-on transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Submitted,
    Assigned,
    Translated,
    QaApproved,
    Legalized,
    Apostilled,
}

impl DocumentStatus {
    /// Wire name, as persisted.
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentStatus::Submitted => "SUBMITTED",
            DocumentStatus::Assigned => "ASSIGNED",
            DocumentStatus::Translated => "TRANSLATED",
            DocumentStatus::QaApproved => "QA_APPROVED",
            DocumentStatus::Legalized => "LEGALIZED",
            DocumentStatus::Apostilled => "APOSTILLED",
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document record as stored under its `documentID`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Always [`RECORD_KIND`].
    #[serde(rename = "recordKind")]
    pub record_kind: String,
    /// Primary key. Caller supplied, unique for the ledger lifetime.
    #[serde(rename = "documentID")]
    pub document_id: String,
    /// Owner (citizen) of the document.
    #[serde(rename = "ownerID")]
    pub owner_id: String,
    /// Issuing authority.
    pub issuer: String,
    /// Free-form category (diploma, birth certificate, ...).
    #[serde(rename = "documentType")]
    pub document_type: String,
    pub status: DocumentStatus,
    /// ISO-8601 UTC with millisecond precision, taken from the tx context.
    #[serde(rename = "submissionTimestamp")]
    pub submission_timestamp: String,
    /// Translation record ids, in submission order.
    pub translations: Vec<String>,
    /// Opaque structured data supplied by the caller.
    #[serde(rename = "encryptionMetadata")]
    pub encryption_metadata: serde_json::Value,
    #[serde(rename = "legalizationID")]
    pub legalization_id: Option<String>,
    #[serde(rename = "apostilleID")]
    pub apostille_id: Option<String>,
    #[serde(rename = "finalizedAt")]
    pub finalized_at: Option<String>,
}

impl Document {
    /// Build a freshly submitted document.
    pub fn submitted(
        document_id: impl Into<String>,
        owner_id: impl Into<String>,
        issuer: impl Into<String>,
        document_type: impl Into<String>,
        submission_timestamp: impl Into<String>,
        encryption_metadata: serde_json::Value,
    ) -> Self {
        Self {
            record_kind: RECORD_KIND.to_string(),
            document_id: document_id.into(),
            owner_id: owner_id.into(),
            issuer: issuer.into(),
            document_type: document_type.into(),
            status: DocumentStatus::Submitted,
            submission_timestamp: submission_timestamp.into(),
            translations: Vec::new(),
            encryption_metadata,
            legalization_id: None,
            apostille_id: None,
            finalized_at: None,
        }
    }
}
