//! Typed client for remote note-storage services.
//!
//! This crate is the caller-facing surface: catalog operations (list
//! notebooks, find notes, create notes) over the resilience layer in
//! `ns-runtime`. Construct a [`CatalogClient`] from a [`ClientConfig`] and
//! whatever [`Transport`] the environment supplies:
//!
//! ```ignore
//! let config = ClientConfig::new("https://svc.example/user", Credential::Token(token));
//! let client = CatalogClient::new(config, transport);
//! let notebooks = client.list_notebooks().await?;
//! ```
//!
//! Sessions, tokens, and retry state never leak through this API; every
//! operation returns either its typed payload or one error from the
//! runtime taxonomy.

pub mod client;
pub mod config;

pub use client::{CatalogClient, MAX_PAGE_SIZE, default_notebook};
pub use config::ClientConfig;

// The seam types callers need to construct and drive a client.
pub use ns_protocol::{Attachment, ContentHash, Note, Notebook, media_tag};
pub use ns_runtime::{
    AuthError, AuthErrorKind, CancellationToken, Credential, Error, Result, RetryPolicy,
    Transport, TransportError, TransportFuture,
};
