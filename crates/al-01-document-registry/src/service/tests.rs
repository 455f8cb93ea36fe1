//! # Document Registry Service Tests

use super::*;
use crate::adapters::storage::InMemoryKVStore;
use crate::adapters::time::FixedTimeSource;
use crate::domain::codec::decode_document;
use crate::domain::entities::DocumentStatus;
use crate::domain::errors::LedgerError;
use crate::domain::keys::{build_owner_index_key, OWNER_INDEX_SENTINEL};
use crate::domain::timestamp::{TxTimestamp, WideInt};
use serde_json::json;

type TestService = DocumentRegistryService<InMemoryKVStore, FixedTimeSource>;

const SUBMITTED_AT: &str = "2023-11-14T22:13:20.500Z";

fn make_test_service() -> TestService {
    let ts = TxTimestamp::from_wide(
        WideInt::Plain(1_700_000_000),
        WideInt::Split {
            low: 500_000_000,
            high: 0,
        },
    );
    DocumentRegistryService::new(InMemoryKVStore::new(), FixedTimeSource(ts))
}

fn diploma() -> RegisterDocumentRequest {
    RegisterDocumentRequest::new("DOC-001", "CITIZEN-123", "Ministry of Education", "diploma")
}

/// Total number of committed keys.
fn committed_keys(service: &TestService) -> usize {
    service.ledger().count_committed(b"").unwrap()
}

fn stored(service: &TestService, document_id: &str) -> Document {
    let bytes = service
        .ledger()
        .read_committed(document_id.as_bytes())
        .unwrap()
        .expect("document should be stored");
    decode_document(document_id, &bytes).unwrap()
}

#[test]
fn test_register_without_metadata() {
    let service = make_test_service();

    let doc = service.register_document(diploma()).unwrap();

    assert_eq!(doc.document_id, "DOC-001");
    assert_eq!(doc.owner_id, "CITIZEN-123");
    assert_eq!(doc.issuer, "Ministry of Education");
    assert_eq!(doc.document_type, "diploma");
    assert_eq!(doc.status, DocumentStatus::Submitted);
    assert!(doc.translations.is_empty());
    assert_eq!(doc.encryption_metadata, json!({}));
    assert_eq!(doc.legalization_id, None);
    assert_eq!(doc.apostille_id, None);
    assert_eq!(doc.finalized_at, None);
    assert_eq!(doc.submission_timestamp, SUBMITTED_AT);

    assert_eq!(stored(&service, "DOC-001"), doc);
}

#[test]
fn test_owner_index_written_with_sentinel() {
    let service = make_test_service();
    service.register_document(diploma()).unwrap();

    let key = build_owner_index_key("CITIZEN-123", "DOC-001").unwrap();
    let value = service.ledger().read_committed(key.as_bytes()).unwrap();

    assert_eq!(value.as_deref(), Some(OWNER_INDEX_SENTINEL));
    assert_eq!(committed_keys(&service), 2);
}

#[test]
fn test_duplicate_rejected_and_first_record_kept() {
    let service = make_test_service();
    let first = service.register_document(diploma()).unwrap();

    let again = RegisterDocumentRequest::new("DOC-001", "CITIZEN-999", "Other", "certificate");
    let result = service.register_document(again);

    assert!(matches!(
        result,
        Err(RegistryError::DuplicateDocument { ref document_id }) if document_id == "DOC-001"
    ));
    assert_eq!(stored(&service, "DOC-001"), first);
    assert_eq!(committed_keys(&service), 2);
}

#[test]
fn test_duplicate_wins_over_bad_arguments() {
    let service = make_test_service();
    service.register_document(diploma()).unwrap();

    let mut again = diploma().with_encryption_metadata("not-json");
    again.issuer.clear();

    assert!(matches!(
        service.register_document(again),
        Err(RegistryError::DuplicateDocument { .. })
    ));
}

#[test]
fn test_metadata_stored_structured() {
    let service = make_test_service();

    let doc = service
        .register_document(diploma().with_encryption_metadata(r#"{"alg":"AES-256"}"#))
        .unwrap();

    assert_eq!(doc.encryption_metadata, json!({"alg": "AES-256"}));
    assert_eq!(
        stored(&service, "DOC-001").encryption_metadata,
        json!({"alg": "AES-256"})
    );
}

#[test]
fn test_empty_metadata_defaults_to_object() {
    let service = make_test_service();
    let doc = service
        .register_document(diploma().with_encryption_metadata(""))
        .unwrap();
    assert_eq!(doc.encryption_metadata, json!({}));
}

#[test]
fn test_malformed_metadata_writes_nothing() {
    let service = make_test_service();

    let result = service.register_document(diploma().with_encryption_metadata("not-json"));

    assert!(matches!(
        result,
        Err(RegistryError::InvalidEncryptionMetadata { .. })
    ));
    assert_eq!(committed_keys(&service), 0);
    assert!(!service.document_exists("DOC-001").unwrap());
}

#[test]
fn test_empty_identifiers_rejected() {
    let service = make_test_service();

    let cases = [
        ("documentID", RegisterDocumentRequest::new("", "O", "I", "T")),
        ("ownerID", RegisterDocumentRequest::new("D", "", "I", "T")),
        ("issuer", RegisterDocumentRequest::new("D", "O", "", "T")),
        ("documentType", RegisterDocumentRequest::new("D", "O", "I", "")),
    ];

    for (expected, request) in cases {
        match service.register_document(request) {
            Err(RegistryError::InvalidArgument { field, .. }) => assert_eq!(field, expected),
            other => panic!("Expected InvalidArgument for {}, got {:?}", expected, other),
        }
    }
    assert_eq!(committed_keys(&service), 0);
}

#[test]
fn test_reserved_character_in_owner_writes_nothing() {
    let service = make_test_service();
    let request = RegisterDocumentRequest::new("DOC-001", "CIT\u{0}IZEN", "I", "T");

    assert!(matches!(
        service.register_document(request),
        Err(RegistryError::InvalidArgument { .. })
    ));
    assert_eq!(committed_keys(&service), 0);
}

#[test]
fn test_unrepresentable_timestamp_writes_nothing() {
    let ts = TxTimestamp::from_wide(WideInt::Plain(i64::MAX / 1000), WideInt::Plain(0));
    let service = DocumentRegistryService::new(InMemoryKVStore::new(), FixedTimeSource(ts));

    assert!(matches!(
        service.register_document(diploma()),
        Err(RegistryError::InvalidTimestamp { .. })
    ));
    assert_eq!(service.ledger().count_committed(b"").unwrap(), 0);
}

#[test]
fn test_read_and_exists() {
    let service = make_test_service();
    assert!(!service.document_exists("DOC-001").unwrap());
    assert!(matches!(
        service.read_document("DOC-001"),
        Err(RegistryError::DocumentNotFound { .. })
    ));

    let doc = service.register_document(diploma()).unwrap();

    assert!(service.document_exists("DOC-001").unwrap());
    assert_eq!(service.read_document("DOC-001").unwrap(), doc);
}

#[test]
fn test_corrupted_record_surfaces_on_read() {
    let service = make_test_service();

    let mut tx = service.ledger().begin(TxTimestamp::new(0, 0));
    tx.put_state("DOC-001", b"{not a document").unwrap();
    tx.commit().unwrap();

    assert!(matches!(
        service.read_document("DOC-001"),
        Err(RegistryError::MalformedRecord { .. })
    ));
    // Still occupied: registration must not overwrite it
    assert!(matches!(
        service.register_document(diploma()),
        Err(RegistryError::DuplicateDocument { .. })
    ));
}

#[test]
fn test_list_documents_by_owner() {
    let service = make_test_service();
    for (doc, owner) in [("DOC-3", "A"), ("DOC-1", "A"), ("DOC-2", "AB"), ("DOC-0", "B")] {
        service
            .register_document(RegisterDocumentRequest::new(doc, owner, "Issuer", "diploma"))
            .unwrap();
    }

    let ids = |owner: &str| -> Vec<String> {
        service
            .list_documents_by_owner(owner)
            .unwrap()
            .into_iter()
            .map(|d| d.document_id)
            .collect()
    };

    assert_eq!(ids("A"), vec!["DOC-1", "DOC-3"]);
    assert_eq!(ids("AB"), vec!["DOC-2"]);
    assert_eq!(ids("B"), vec!["DOC-0"]);
    assert!(ids("C").is_empty());
}

#[test]
fn test_dangling_index_entry_is_malformed() {
    let service = make_test_service();
    let key = build_owner_index_key("A", "GHOST").unwrap();

    let mut tx = service.ledger().begin(TxTimestamp::new(0, 0));
    tx.put_state(&key, OWNER_INDEX_SENTINEL).unwrap();
    tx.commit().unwrap();

    assert!(matches!(
        service.list_documents_by_owner("A"),
        Err(RegistryError::MalformedRecord { .. })
    ));
}

#[test]
fn test_concurrent_registration_single_winner() {
    let service = make_test_service();
    let contract = DocumentContract::new();
    let ts = TxTimestamp::new(1_700_000_000, 0);

    // Both transactions observe DOC-001 absent before either commits
    let mut first = service.ledger().begin_with_id("tx-a", ts);
    let mut second = service.ledger().begin_with_id("tx-b", ts);
    contract.register_document(&mut first, diploma()).unwrap();
    contract
        .register_document(
            &mut second,
            RegisterDocumentRequest::new("DOC-001", "CITIZEN-456", "Other", "certificate"),
        )
        .unwrap();

    first.commit().unwrap();
    let loser = second.commit();

    assert!(matches!(loser, Err(LedgerError::MvccReadConflict { .. })));
    assert_eq!(stored(&service, "DOC-001").owner_id, "CITIZEN-123");
    assert!(service.list_documents_by_owner("CITIZEN-456").unwrap().is_empty());
    assert_eq!(committed_keys(&service), 2);
}

#[test]
fn test_timestamp_identical_across_replicas() {
    // Same logical transaction, timestamp reported in both integer shapes
    let plain = TxTimestamp::from_wide(WideInt::Plain(1_700_000_000), WideInt::Plain(500_000_000));
    let split = TxTimestamp::from_wide(WideInt::split(1_700_000_000), WideInt::split(500_000_000));

    let replica_a = DocumentRegistryService::new(InMemoryKVStore::new(), FixedTimeSource(plain));
    let replica_b = DocumentRegistryService::new(InMemoryKVStore::new(), FixedTimeSource(split));

    let a = replica_a.register_document(diploma()).unwrap();
    let b = replica_b.register_document(diploma()).unwrap();

    assert_eq!(a, b);
    assert_eq!(
        replica_a.ledger().read_committed(b"DOC-001").unwrap(),
        replica_b.ledger().read_committed(b"DOC-001").unwrap()
    );
}
