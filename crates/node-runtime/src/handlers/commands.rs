//! # Registry Command Protocol
//!
//! One JSON object per input line, one JSON object per output line.
//!
//! ```text
//! {"op":"registerDocument","documentID":"D1","ownerID":"O1","issuer":"I","documentType":"T"}
//!   → {"ok":true,"result":{"recordKind":"document","documentID":"D1",...}}
//! {"op":"readDocument","documentID":"missing"}
//!   → {"ok":false,"error":{"kind":"DocumentNotFound","message":"..."}}
//! ```

use al_01_document_registry::{
    DocumentRegistryApi, RegisterDocumentRequest, RegistryError, RegistryErrorPayload,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

/// Error kind reported for lines that do not parse as a [`Command`].
pub const INVALID_COMMAND: &str = "InvalidCommand";

/// A request line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op")]
pub enum Command {
    #[serde(rename = "registerDocument")]
    RegisterDocument(RegisterDocumentRequest),

    #[serde(rename = "readDocument")]
    ReadDocument {
        #[serde(rename = "documentID")]
        document_id: String,
    },

    #[serde(rename = "documentExists")]
    DocumentExists {
        #[serde(rename = "documentID")]
        document_id: String,
    },

    #[serde(rename = "listDocumentsByOwner")]
    ListDocumentsByOwner {
        #[serde(rename = "ownerID")]
        owner_id: String,
    },
}

impl Command {
    /// Wire name of the operation.
    pub fn op(&self) -> &'static str {
        match self {
            Command::RegisterDocument(_) => "registerDocument",
            Command::ReadDocument { .. } => "readDocument",
            Command::DocumentExists { .. } => "documentExists",
            Command::ListDocumentsByOwner { .. } => "listDocumentsByOwner",
        }
    }
}

/// A response line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    /// Set when resubmitting the same command may succeed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub retryable: bool,
}

impl Response {
    pub fn success<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(result) => Self {
                ok: true,
                result: Some(result),
                error: None,
            },
            Err(e) => Self::failure("SerializationError", e.to_string()),
        }
    }

    pub fn failure(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(ErrorBody {
                kind: kind.into(),
                message: message.into(),
                retryable: false,
            }),
        }
    }
}

impl From<RegistryError> for Response {
    fn from(err: RegistryError) -> Self {
        let retryable = err.is_retryable();
        let payload = RegistryErrorPayload::from(err);
        let mut response = Self::failure(payload.kind.as_str(), payload.message);
        if let Some(body) = response.error.as_mut() {
            body.retryable = retryable;
        }
        response
    }
}

fn respond<T: Serialize>(result: Result<T, RegistryError>) -> Response {
    match result {
        Ok(value) => Response::success(&value),
        Err(err) => err.into(),
    }
}

/// Execute one parsed command.
pub fn execute<A: DocumentRegistryApi + ?Sized>(api: &A, command: Command) -> Response {
    debug!("[al-01] ⚙️ {}", command.op());
    match command {
        Command::RegisterDocument(request) => respond(api.register_document(request)),
        Command::ReadDocument { document_id } => respond(api.read_document(&document_id)),
        Command::DocumentExists { document_id } => respond(api.document_exists(&document_id)),
        Command::ListDocumentsByOwner { owner_id } => {
            respond(api.list_documents_by_owner(&owner_id))
        }
    }
}

/// Parse and execute one input line.
pub fn handle_line<A: DocumentRegistryApi + ?Sized>(api: &A, line: &str) -> Response {
    match serde_json::from_str::<Command>(line) {
        Ok(command) => execute(api, command),
        Err(e) => {
            warn!("[al-01] Rejected command line: {}", e);
            Response::failure(INVALID_COMMAND, e.to_string())
        }
    }
}

/// Serve commands until the reader reaches EOF.
///
/// Blank lines are skipped. Returns the number of commands answered.
pub async fn serve<A, R, W>(api: &A, reader: R, mut writer: W) -> anyhow::Result<u64>
where
    A: DocumentRegistryApi + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut answered = 0u64;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = handle_line(api, line);
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        writer.write_all(&encoded).await?;
        writer.flush().await?;
        answered += 1;
    }

    Ok(answered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::RegistryContainer;
    use al_01_document_registry::LedgerError;
    use serde_json::json;

    const REGISTER_D1: &str = r#"{"op":"registerDocument","documentID":"D1","ownerID":"O1","issuer":"MINISTRY","documentType":"DIPLOMA","encryptionMetadata":"{\"alg\":\"AES-256-GCM\"}"}"#;

    #[test]
    fn test_parse_commands() {
        let cmd: Command =
            serde_json::from_str(r#"{"op":"readDocument","documentID":"D1"}"#).unwrap();
        assert_eq!(
            cmd,
            Command::ReadDocument {
                document_id: "D1".to_string()
            }
        );

        let cmd: Command = serde_json::from_str(REGISTER_D1).unwrap();
        match cmd {
            Command::RegisterDocument(request) => {
                assert_eq!(request.document_id, "D1");
                assert_eq!(
                    request.encryption_metadata.as_deref(),
                    Some(r#"{"alg":"AES-256-GCM"}"#)
                );
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_register_then_read() {
        let container = RegistryContainer::new_for_testing();
        let registry = container.registry();

        let created = handle_line(registry.as_ref(), REGISTER_D1);
        assert!(created.ok, "{:?}", created.error);
        let doc = created.result.unwrap();
        assert_eq!(doc["status"], json!("SUBMITTED"));
        assert_eq!(doc["encryptionMetadata"], json!({"alg": "AES-256-GCM"}));

        let read = handle_line(
            registry.as_ref(),
            r#"{"op":"readDocument","documentID":"D1"}"#,
        );
        assert_eq!(read.result, Some(doc));

        let exists = handle_line(
            registry.as_ref(),
            r#"{"op":"documentExists","documentID":"D1"}"#,
        );
        assert_eq!(exists.result, Some(json!(true)));

        let listed = handle_line(
            registry.as_ref(),
            r#"{"op":"listDocumentsByOwner","ownerID":"O1"}"#,
        );
        assert_eq!(listed.result.unwrap().as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_reports_kind() {
        let container = RegistryContainer::new_for_testing();
        let registry = container.registry();

        assert!(handle_line(registry.as_ref(), REGISTER_D1).ok);
        let second = handle_line(registry.as_ref(), REGISTER_D1);

        assert!(!second.ok);
        assert!(second.result.is_none());
        assert_eq!(second.error.unwrap().kind, "DuplicateDocument");
    }

    #[test]
    fn test_missing_document_reports_not_found() {
        let container = RegistryContainer::new_for_testing();
        let response = handle_line(
            container.registry().as_ref(),
            r#"{"op":"readDocument","documentID":"nope"}"#,
        );
        assert_eq!(response.error.unwrap().kind, "DocumentNotFound");
    }

    #[test]
    fn test_invalid_lines() {
        let container = RegistryContainer::new_for_testing();
        let registry = container.registry();

        for line in [
            "not json",
            r#"{"op":"deleteDocument","documentID":"D1"}"#,
            r#"{"documentID":"D1"}"#,
            r#"{"op":"readDocument"}"#,
        ] {
            let response = handle_line(registry.as_ref(), line);
            assert!(!response.ok, "line {:?} accepted", line);
            assert_eq!(response.error.unwrap().kind, INVALID_COMMAND);
        }
    }

    #[test]
    fn test_response_wire_shape() {
        let ok = serde_json::to_value(Response::success(&true)).unwrap();
        assert_eq!(ok, json!({"ok": true, "result": true}));

        let err = serde_json::to_value(Response::failure("InvalidArgument", "ownerID is empty"))
            .unwrap();
        assert_eq!(
            err,
            json!({"ok": false, "error": {"kind": "InvalidArgument", "message": "ownerID is empty"}})
        );
    }

    #[test]
    fn test_commit_conflict_is_marked_retryable() {
        let conflict = RegistryError::Ledger(LedgerError::MvccReadConflict {
            key: "D1".to_string(),
        });
        let response = Response::from(conflict);
        let body = response.error.as_ref().unwrap();
        assert_eq!(body.kind, "LedgerError");
        assert!(body.retryable);
        assert_eq!(serde_json::to_value(&response).unwrap()["error"]["retryable"], json!(true));

        let duplicate = Response::from(RegistryError::DuplicateDocument {
            document_id: "D1".to_string(),
        });
        assert!(!duplicate.error.unwrap().retryable);
    }

    #[tokio::test]
    async fn test_serve_answers_each_line() {
        let container = RegistryContainer::new_for_testing();
        let registry = container.registry();

        let input = format!(
            "{}\n\n{}\n{}\n",
            REGISTER_D1, REGISTER_D1, r#"{"op":"documentExists","documentID":"D1"}"#
        );
        let mut output = Vec::new();

        let answered = serve(registry.as_ref(), input.as_bytes(), &mut output)
            .await
            .unwrap();
        assert_eq!(answered, 3);

        let responses: Vec<Response> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert!(responses[0].ok);
        assert_eq!(responses[1].error.as_ref().unwrap().kind, "DuplicateDocument");
        assert_eq!(responses[2].result, Some(json!(true)));
    }
}
