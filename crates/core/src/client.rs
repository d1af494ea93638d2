//! Catalog operations over the runtime resilience layer.

use crate::config::ClientConfig;
use ns_protocol::{
    CreateNoteParams, FindNotesParams, ListNotebooksParams, Note, NoteFilter, NotePage, Notebook,
    media_references, ops,
};
use ns_runtime::{
    CancellationToken, Error, RequestExecutor, Result, SessionManager, Transport, decode,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Largest page `find_notes` may request, matching the service bound.
pub const MAX_PAGE_SIZE: u32 = 250;

/// Identifies the default notebook in a catalog listing.
///
/// The service marks at most one notebook as default. If none is flagged
/// the first entry is treated as the default - an explicit policy, not an
/// arbitrary pick. An empty catalog has no default notebook.
pub fn default_notebook(notebooks: &[Notebook]) -> Option<&Notebook> {
    notebooks
        .iter()
        .find(|nb| nb.is_default)
        .or_else(|| notebooks.first())
}

/// Typed catalog client: list notebooks, find notes, create notes.
///
/// Safe to share across concurrent logical calls; the underlying session
/// refresh is coalesced, and request execution is per-call policy with no
/// shared state. Cancelling the client's [`CancellationToken`] aborts
/// in-flight calls and pending backoff promptly.
pub struct CatalogClient {
    sessions: Arc<SessionManager>,
    executor: RequestExecutor,
    cancel: CancellationToken,
}

impl CatalogClient {
    /// Builds a client from configuration and an environment-supplied
    /// transport.
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let executor = RequestExecutor::new(transport, config.policy);
        let sessions = Arc::new(SessionManager::new(
            config.endpoint,
            config.credential,
            config.client_name,
            executor.clone(),
        ));
        Self {
            sessions,
            executor,
            cancel: CancellationToken::new(),
        }
    }

    /// Token the caller can use to cancel this client's operations.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Lists the account's notebooks in service order.
    pub async fn list_notebooks(&self) -> Result<Vec<Notebook>> {
        tracing::debug!("listing notebooks");
        let value = self
            .executor
            .execute_authed(
                &self.sessions,
                ops::LIST_NOTEBOOKS,
                |session| ListNotebooksParams {
                    auth_token: session.auth_token.clone(),
                },
                &self.cancel,
            )
            .await?;
        decode(value)
    }

    /// Returns one page of note metadata from `notebook_id`, in service
    /// order. `limit` must be in `1..=MAX_PAGE_SIZE`.
    pub async fn find_notes(
        &self,
        notebook_id: &str,
        offset: u32,
        limit: u32,
    ) -> Result<Vec<Note>> {
        if notebook_id.is_empty() {
            return Err(Error::invalid_argument(
                "notebook_id",
                "must be non-empty",
            ));
        }
        if limit == 0 {
            return Err(Error::invalid_argument("limit", "must be positive"));
        }
        if limit > MAX_PAGE_SIZE {
            return Err(Error::invalid_argument(
                "limit",
                format!("must be at most {MAX_PAGE_SIZE}"),
            ));
        }

        tracing::debug!(notebook_id, offset, limit, "finding notes");
        let value = self
            .executor
            .execute_authed(
                &self.sessions,
                ops::FIND_NOTES,
                |session| FindNotesParams {
                    auth_token: session.auth_token.clone(),
                    filter: NoteFilter {
                        notebook_id: Some(notebook_id.to_string()),
                    },
                    offset,
                    max_notes: limit,
                },
                &self.cancel,
            )
            .await?;
        let page: NotePage = decode(value)?;
        Ok(page.notes)
    }

    /// Creates `note` and returns it with the server-assigned id.
    ///
    /// Before submission every attachment's content hash is recomputed
    /// from its bytes (caller-supplied hashes are overwritten, not
    /// trusted), and every media reference in the markup must resolve to
    /// an attachment digest or the call fails locally with
    /// [`Error::DanglingAttachmentReference`].
    pub async fn create_note(&self, mut note: Note) -> Result<Note> {
        if note.title.trim().is_empty() {
            return Err(Error::invalid_argument("note.title", "must be non-empty"));
        }
        if note.notebook_id.is_empty() {
            return Err(Error::invalid_argument(
                "note.notebook_id",
                "must be non-empty",
            ));
        }

        for attachment in &mut note.attachments {
            if attachment.refresh_hash() {
                tracing::debug!(
                    mime_type = %attachment.mime_type,
                    "recomputed stale attachment hash"
                );
            }
        }

        let digests: HashSet<_> = note
            .attachments
            .iter()
            .map(|attachment| attachment.content_hash)
            .collect();
        for reference in media_references(&note.content) {
            if !digests.contains(&reference) {
                return Err(Error::DanglingAttachmentReference {
                    hash: reference.to_hex(),
                });
            }
        }

        tracing::debug!(notebook_id = %note.notebook_id, title = %note.title, "creating note");
        let value = self
            .executor
            .execute_authed(
                &self.sessions,
                ops::CREATE_NOTE,
                |session| CreateNoteParams {
                    auth_token: session.auth_token.clone(),
                    note: note.clone(),
                },
                &self.cancel,
            )
            .await?;
        decode(value)
    }

    /// Drops the current session; the next operation re-authenticates.
    pub async fn logout(&self) {
        self.sessions.logout().await;
    }
}
