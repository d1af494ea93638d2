//! Request execution with retry, backoff, and fault classification.
//!
//! The executor wraps a single remote operation in the resilience policy:
//! per-attempt timeout, exponential backoff between connectivity failures,
//! and mapping of structured service faults onto the error taxonomy. It
//! holds no state of its own - it is pure policy applied per call.
//!
//! # Classification
//!
//! Evaluated after each attempt:
//! - transport failure or timeout: retry with backoff, up to max attempts
//! - `AUTH_EXPIRED` fault: fatal `AuthError::Expired`; the auth-aware path
//!   in [`RequestExecutor::execute_authed`] refreshes the session once and
//!   issues a single extra attempt
//! - `INVALID_AUTH` fault with a recognized parameter: fatal `AuthError`
//! - bad-input faults: fatal `InvalidArgument`, never retried
//! - anything else: fatal, surfaced verbatim

use crate::error::{AuthError, AuthErrorKind, Error, Result};
use crate::session::{Session, SessionManager};
use crate::transport::{Transport, TransportError};
use ns_protocol::{FaultCode, ServiceFault, ServiceReply};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Retry and timeout policy applied to every executed call.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first (minimum 1).
    pub max_attempts: u32,
    /// Delay before the first re-attempt.
    pub base_backoff: Duration,
    /// Growth factor between consecutive delays.
    pub backoff_multiplier: f64,
    /// Upper bound on any single delay.
    pub backoff_cap: Duration,
    /// Per-attempt deadline.
    pub request_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(250),
            backoff_multiplier: 2.0,
            backoff_cap: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after `completed_attempts` failed attempts.
    fn backoff_for(&self, completed_attempts: u32) -> Duration {
        let exp = completed_attempts.saturating_sub(1).min(16);
        let delay = self
            .base_backoff
            .mul_f64(self.backoff_multiplier.powi(exp as i32));
        delay.min(self.backoff_cap)
    }
}

/// Classified result of one executed call.
#[derive(Debug)]
pub enum RequestOutcome {
    /// The service accepted the call; payload decoded from the reply.
    Success(Value),
    /// Connectivity failed on every attempt; `cause` is the last failure.
    Retryable { cause: TransportError, attempts: u32 },
    /// The call cannot succeed by re-attempting.
    Fatal(Error),
}

impl RequestOutcome {
    /// Collapses the outcome into a `Result`, turning retry exhaustion
    /// into `ServiceUnavailable`.
    pub fn into_result(self) -> Result<Value> {
        match self {
            RequestOutcome::Success(value) => Ok(value),
            RequestOutcome::Retryable { cause, attempts } => {
                Err(Error::ServiceUnavailable { attempts, cause })
            }
            RequestOutcome::Fatal(err) => Err(err),
        }
    }
}

/// Per-attempt verdict, before retry policy applies.
enum Disposition {
    Done(Value),
    Retry(TransportError),
    Fatal(Error),
}

/// Executes remote operations through the transport under a retry policy.
#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    policy: RetryPolicy,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Executes one operation with the full retry policy.
    pub async fn execute<P: Serialize>(
        &self,
        endpoint: &str,
        operation: &str,
        params: &P,
        cancel: &CancellationToken,
    ) -> RequestOutcome {
        let payload = match serde_json::to_vec(params) {
            Ok(payload) => payload,
            Err(err) => return RequestOutcome::Fatal(err.into()),
        };

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.attempt(endpoint, operation, payload.clone(), cancel).await {
                Disposition::Done(value) => {
                    if attempts > 1 {
                        tracing::debug!(operation, attempts, "call recovered after retry");
                    }
                    return RequestOutcome::Success(value);
                }
                Disposition::Fatal(err) => return RequestOutcome::Fatal(err),
                Disposition::Retry(cause) => {
                    if attempts >= self.policy.max_attempts.max(1) {
                        return RequestOutcome::Retryable { cause, attempts };
                    }
                    let delay = self.policy.backoff_for(attempts);
                    tracing::warn!(
                        operation,
                        attempt = attempts,
                        delay_ms = delay.as_millis() as u64,
                        %cause,
                        "attempt failed, backing off"
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return RequestOutcome::Fatal(Error::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
            }
        }
    }

    /// Executes one operation with a single attempt, no backoff. Used for
    /// the one extra try a session refresh buys.
    pub async fn execute_once<P: Serialize>(
        &self,
        endpoint: &str,
        operation: &str,
        params: &P,
        cancel: &CancellationToken,
    ) -> RequestOutcome {
        let payload = match serde_json::to_vec(params) {
            Ok(payload) => payload,
            Err(err) => return RequestOutcome::Fatal(err.into()),
        };
        match self.attempt(endpoint, operation, payload, cancel).await {
            Disposition::Done(value) => RequestOutcome::Success(value),
            Disposition::Retry(cause) => RequestOutcome::Retryable { cause, attempts: 1 },
            Disposition::Fatal(err) => RequestOutcome::Fatal(err),
        }
    }

    /// Executes an operation that requires a valid session.
    ///
    /// Ensures a session, builds the params against it, and executes. If
    /// the service reports the token expired mid-flight, the session is
    /// invalidated and re-ensured exactly once, then the call gets a
    /// single additional attempt with the fresh token. No unbounded loop:
    /// a second expiry surfaces as the auth error it is.
    pub async fn execute_authed<P, F>(
        &self,
        sessions: &SessionManager,
        operation: &str,
        build: F,
        cancel: &CancellationToken,
    ) -> Result<Value>
    where
        P: Serialize,
        F: Fn(&Session) -> P,
    {
        let session = sessions.ensure_session(cancel).await?;
        let outcome = self
            .execute(&session.endpoint_url, operation, &build(&session), cancel)
            .await;

        let outcome = match outcome {
            RequestOutcome::Fatal(Error::Auth(AuthError {
                kind: AuthErrorKind::Expired,
                ..
            })) => {
                tracing::debug!(operation, "token expired mid-flight, refreshing session");
                sessions.invalidate(&session.auth_token).await;
                let fresh = sessions.ensure_session(cancel).await?;
                self.execute_once(&fresh.endpoint_url, operation, &build(&fresh), cancel)
                    .await
            }
            other => other,
        };

        outcome.into_result()
    }

    /// One transport exchange plus reply decoding and classification.
    async fn attempt(
        &self,
        endpoint: &str,
        operation: &str,
        payload: Vec<u8>,
        cancel: &CancellationToken,
    ) -> Disposition {
        let send = self
            .transport
            .send(endpoint, operation, payload, self.policy.request_timeout);

        let raw = tokio::select! {
            _ = cancel.cancelled() => return Disposition::Fatal(Error::Cancelled),
            outcome = tokio::time::timeout(self.policy.request_timeout, send) => match outcome {
                Err(_) => {
                    return Disposition::Retry(TransportError::Timeout(
                        self.policy.request_timeout,
                    ));
                }
                Ok(Err(err)) => return Disposition::Retry(err),
                Ok(Ok(raw)) => raw,
            },
        };

        let reply: ServiceReply = match serde_json::from_slice(&raw) {
            Ok(reply) => reply,
            Err(err) => return Disposition::Fatal(err.into()),
        };

        match reply.into_result() {
            Ok(value) => Disposition::Done(value),
            Err(fault) => classify_fault(fault),
        }
    }
}

/// Maps a structured service fault onto the error taxonomy.
fn classify_fault(fault: ServiceFault) -> Disposition {
    match fault.code {
        FaultCode::AuthExpired => Disposition::Fatal(Error::Auth(AuthError::expired())),
        FaultCode::InvalidAuth => {
            match AuthError::from_invalid_auth_parameter(fault.parameter.clone()) {
                Some(auth) => Disposition::Fatal(Error::Auth(auth)),
                None => Disposition::Fatal(Error::Fault(fault)),
            }
        }
        FaultCode::BadDataFormat | FaultCode::DataRequired => {
            Disposition::Fatal(Error::InvalidArgument {
                name: fault.parameter.unwrap_or_else(|| "request".to_string()),
                reason: fault.message,
            })
        }
        _ => Disposition::Fatal(Error::Fault(fault)),
    }
}

/// Decodes a reply value into a typed result.
pub fn decode<R: DeserializeOwned>(value: Value) -> Result<R> {
    serde_json::from_value(value).map_err(Into::into)
}
