//! Transport - the opaque RPC seam.
//!
//! The runtime treats the wire as an external collaborator: a transport
//! carries an encoded request payload to a named operation on an endpoint
//! and returns the encoded response. Framing, serialization format, and
//! connection pooling are the transport's business; the runtime only
//! classifies its failures.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Boxed future returned by [`Transport::send`].
pub type TransportFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<Vec<u8>, TransportError>> + Send + 'a>>;

/// Failure of a single transport exchange.
///
/// All variants are connectivity-shaped: the request may never have
/// reached the service, so the executor treats them as retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Could not reach the endpoint at all.
    #[error("connection failed: {0}")]
    ConnectFailed(String),

    /// No response within the per-attempt deadline.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The exchange started but broke partway through.
    #[error("i/o failure: {0}")]
    Io(String),
}

/// Abstract request/response channel to the note-storage service.
///
/// Implementations are supplied by the environment (the bundled CLI ships
/// an HTTP one); the core crates only consume the trait. `timeout` is the
/// per-attempt deadline the implementation should enforce on its own
/// socket; the executor additionally guards the whole call, so a transport
/// that ignores it still cannot hang an operation.
pub trait Transport: Send + Sync {
    /// Sends one encoded request to `operation` on `endpoint` and resolves
    /// with the encoded response.
    fn send(
        &self,
        endpoint: &str,
        operation: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> TransportFuture<'_>;
}
