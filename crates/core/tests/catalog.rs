//! End-to-end catalog scenarios against an in-memory service double.

use ns::{
    Attachment, CatalogClient, ClientConfig, ContentHash, Credential, Error, Note, Transport,
    default_notebook, media_tag,
};
use ns_protocol::{ServiceReply, ops};
use ns_runtime::{TransportError, TransportFuture};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Records every (operation, decoded payload) pair and answers from a
/// fixed script.
struct ServiceDouble {
    log: Mutex<Vec<(String, Value)>>,
    notebooks: Value,
}

impl ServiceDouble {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            log: Mutex::new(Vec::new()),
            notebooks: json!([
                {"id": "nb1", "name": "Personal", "isDefault": true},
                {"id": "nb2", "name": "Work", "isDefault": false},
            ]),
        })
    }

    fn operations(&self) -> Vec<String> {
        self.log.lock().unwrap().iter().map(|(op, _)| op.clone()).collect()
    }

    fn payload_of(&self, operation: &str) -> Option<Value> {
        self.log
            .lock()
            .unwrap()
            .iter()
            .find(|(op, _)| op == operation)
            .map(|(_, payload)| payload.clone())
    }

    fn reply_for(&self, operation: &str, payload: &Value) -> ServiceReply {
        match operation {
            ops::CHECK_VERSION => ServiceReply::success(true),
            ops::GET_NOTE_STORE_URL => {
                ServiceReply::success("https://shard1.example/notes")
            }
            ops::AUTHENTICATE => ServiceReply::success(json!({
                "authToken": "tok-auth",
                "noteStoreUrl": "https://shard1.example/notes",
            })),
            ops::LIST_NOTEBOOKS => ServiceReply::success(self.notebooks.clone()),
            ops::FIND_NOTES => ServiceReply::success(json!({
                "startIndex": payload["offset"],
                "totalNotes": 2,
                "notes": [
                    {"id": "n1", "notebookId": "nb1", "title": "first"},
                    {"id": "n2", "notebookId": "nb1", "title": "second"},
                ],
            })),
            ops::CREATE_NOTE => {
                // Echo the submitted note back with a server-assigned id.
                let mut note = payload["note"].clone();
                note["id"] = json!("note-123");
                ServiceReply::success(note)
            }
            _ => ServiceReply::success(Value::Null),
        }
    }
}

impl Transport for ServiceDouble {
    fn send(
        &self,
        _endpoint: &str,
        operation: &str,
        payload: Vec<u8>,
        _timeout: Duration,
    ) -> TransportFuture<'_> {
        let operation = operation.to_string();
        Box::pin(async move {
            let decoded: Value = serde_json::from_slice(&payload)
                .map_err(|e| TransportError::Io(e.to_string()))?;
            let reply = self.reply_for(&operation, &decoded);
            self.log.lock().unwrap().push((operation, decoded));
            Ok(serde_json::to_vec(&reply).unwrap())
        })
    }
}

fn token_client(service: Arc<ServiceDouble>) -> CatalogClient {
    let config = ClientConfig::new(
        "https://svc.example/user",
        Credential::Token("tok".into()),
    );
    CatalogClient::new(config, service)
}

#[tokio::test]
async fn token_scenario_identifies_default_notebook() {
    let service = ServiceDouble::new();
    let client = token_client(service.clone());

    let notebooks = client.list_notebooks().await.unwrap();
    assert_eq!(notebooks.len(), 2);
    assert_eq!(notebooks[0].id, "nb1");
    assert_eq!(notebooks[1].id, "nb2");
    assert_eq!(default_notebook(&notebooks).unwrap().id, "nb1");

    // The authenticated call targeted the discovered endpoint with the
    // configured token.
    let payload = service.payload_of(ops::LIST_NOTEBOOKS).unwrap();
    assert_eq!(payload["authToken"], "tok");
}

#[tokio::test]
async fn find_notes_zero_limit_fails_without_any_remote_call() {
    let service = ServiceDouble::new();
    let client = token_client(service.clone());

    let err = client.find_notes("nb1", 0, 0).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert!(service.operations().is_empty());
}

#[tokio::test]
async fn find_notes_passes_pagination_through() {
    let service = ServiceDouble::new();
    let client = token_client(service.clone());

    let notes = client.find_notes("nb1", 10, 25).await.unwrap();
    assert_eq!(notes.len(), 2);
    assert_eq!(notes[0].title, "first");
    assert_eq!(notes[1].title, "second");

    let payload = service.payload_of(ops::FIND_NOTES).unwrap();
    assert_eq!(payload["offset"], 10);
    assert_eq!(payload["maxNotes"], 25);
    assert_eq!(payload["filter"]["notebookId"], "nb1");
}

#[tokio::test]
async fn find_notes_oversized_limit_rejected_locally() {
    let service = ServiceDouble::new();
    let client = token_client(service.clone());

    let err = client.find_notes("nb1", 0, 251).await.unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert!(service.operations().is_empty());
}

#[tokio::test]
async fn create_note_recomputes_untrusted_attachment_hash() {
    let service = ServiceDouble::new();
    let client = token_client(service.clone());

    let bytes = b"png bytes".to_vec();
    let mut attachment = Attachment::new("image/png", bytes.clone());
    // Caller hands us a bogus declared hash; the client must correct it,
    // not merely reject it.
    attachment.content_hash = ContentHash::of(b"something else entirely");

    let expected = ContentHash::of(&bytes);
    let mut note = Note::new("nb1", "logo note", String::new());
    note.content = format!("<note>logo:{}</note>", media_tag("image/png", &expected));
    note.attachments.push(attachment);

    let created = client.create_note(note).await.unwrap();
    assert_eq!(created.id.as_deref(), Some("note-123"));

    let payload = service.payload_of(ops::CREATE_NOTE).unwrap();
    let sent_hash = payload["note"]["attachments"][0]["contentHash"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(sent_hash, expected.to_hex());
}

#[tokio::test]
async fn create_note_dangling_reference_fails_before_any_remote_call() {
    let service = ServiceDouble::new();
    let client = token_client(service.clone());

    let orphan = ContentHash::of(b"attachment that was never added");
    let mut note = Note::new("nb1", "broken note", String::new());
    note.content = format!("<note>{}</note>", media_tag("image/png", &orphan));

    let err = client.create_note(note).await.unwrap_err();
    match err {
        Error::DanglingAttachmentReference { hash } => {
            assert_eq!(hash, orphan.to_hex());
        }
        other => panic!("expected dangling reference error, got {other:?}"),
    }
    assert!(service.operations().is_empty());
}

#[tokio::test]
async fn create_note_empty_title_rejected_locally() {
    let service = ServiceDouble::new();
    let client = token_client(service.clone());

    let err = client
        .create_note(Note::new("nb1", "   ", "body"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
    assert!(service.operations().is_empty());
}

#[tokio::test]
async fn password_flow_authenticates_then_lists() {
    let service = ServiceDouble::new();
    let config = ClientConfig::new(
        "https://svc.example/user",
        Credential::Password {
            username: "alice".into(),
            password: "hunter2".into(),
            consumer_key: "ckey".into(),
            consumer_secret: "csecret".into(),
        },
    );
    let client = CatalogClient::new(config, service.clone());

    let notebooks = client.list_notebooks().await.unwrap();
    assert_eq!(notebooks.len(), 2);

    let operations = service.operations();
    assert_eq!(
        operations,
        vec![
            ops::CHECK_VERSION.to_string(),
            ops::AUTHENTICATE.to_string(),
            ops::LIST_NOTEBOOKS.to_string(),
        ]
    );
    let payload = service.payload_of(ops::LIST_NOTEBOOKS).unwrap();
    assert_eq!(payload["authToken"], "tok-auth");
}
