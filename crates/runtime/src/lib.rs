//! Note-storage client runtime - session lifecycle, request execution, and
//! the transport seam.
//!
//! This crate provides the resilience layer between the typed catalog API
//! and whatever RPC transport the environment supplies:
//!
//! - **Transport**: the abstract request/response channel to a named
//!   service endpoint (consumed, never implemented here)
//! - **Executor**: per-call retry/backoff, timeout, and fault classification
//! - **Session**: authentication state, service-directed endpoint
//!   discovery, and coalesced re-authentication
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │     ns      │  Catalog operations (notebooks, notes)
//! └──────┬──────┘
//! ┌──────▼──────┐
//! │  ns-runtime │  This crate
//! │  ┌────────┐ │
//! │  │Session │ │  Auth state + coalesced refresh
//! │  └────────┘ │
//! │  ┌────────┐ │
//! │  │ Exec   │ │  Retry/backoff + classification
//! │  └────────┘ │
//! │  ┌────────┐ │
//! │  │ Trans  │ │  Opaque RPC seam (external)
//! │  └────────┘ │
//! └─────────────┘
//! ```
//!
//! The executor is pure per-call policy with no state of its own; the
//! session manager is the only component that mutates shared state, and it
//! does so behind a single-writer refresh gate.

pub mod error;
pub mod executor;
pub mod session;
pub mod transport;

// Re-export key types at crate root
pub use error::{AuthError, AuthErrorKind, Error, Result};
pub use executor::{RequestExecutor, RequestOutcome, RetryPolicy, decode};
pub use session::{Credential, Session, SessionManager};
pub use transport::{Transport, TransportError, TransportFuture};

// Cancellation token re-exported so callers don't need a direct
// tokio-util dependency for the common path.
pub use tokio_util::sync::CancellationToken;
