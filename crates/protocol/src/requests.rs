//! Request parameter objects and operation names.
//!
//! Each remote operation has a params struct serialized as the request
//! payload, and a dotted operation name identifying it to the transport.

use crate::types::Note;
use serde::{Deserialize, Serialize};

/// Operation names, grouped by the service that owns them.
///
/// Account/authentication operations live on the bootstrap endpoint; note
/// operations target the endpoint the service hands back at authentication.
pub mod ops {
    pub const CHECK_VERSION: &str = "UserStore.checkVersion";
    pub const AUTHENTICATE: &str = "UserStore.authenticate";
    pub const GET_NOTE_STORE_URL: &str = "UserStore.getNoteStoreUrl";
    pub const LIST_NOTEBOOKS: &str = "NoteStore.listNotebooks";
    pub const FIND_NOTES: &str = "NoteStore.findNotes";
    pub const CREATE_NOTE: &str = "NoteStore.createNote";
}

/// Params for `UserStore.checkVersion`. Returns a bare boolean.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckVersionParams {
    pub client_name: String,
    pub major: u16,
    pub minor: u16,
}

/// Params for `UserStore.authenticate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticateParams {
    pub username: String,
    pub password: String,
    pub consumer_key: String,
    pub consumer_secret: String,
}

/// Params for `UserStore.getNoteStoreUrl`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetNoteStoreUrlParams {
    pub auth_token: String,
}

/// Successful authentication payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSuccess {
    /// Token to present on every subsequent call.
    pub auth_token: String,
    /// Service-directed endpoint for note operations.
    pub note_store_url: String,
    /// Token expiry as epoch milliseconds, when the service declares one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
}

/// Params for `NoteStore.listNotebooks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListNotebooksParams {
    pub auth_token: String,
}

/// Server-side note filter for `findNotes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notebook_id: Option<String>,
}

/// Params for `NoteStore.findNotes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindNotesParams {
    pub auth_token: String,
    pub filter: NoteFilter,
    pub offset: u32,
    pub max_notes: u32,
}

/// One page of `findNotes` results, in service order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotePage {
    pub start_index: u32,
    pub total_notes: u32,
    pub notes: Vec<Note>,
}

/// Params for `NoteStore.createNote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteParams {
    pub auth_token: String,
    pub note: Note,
}
