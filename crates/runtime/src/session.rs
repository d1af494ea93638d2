//! Session lifecycle - authentication state and coalesced refresh.
//!
//! The session manager owns the only piece of shared mutable state in the
//! client: the current [`Session`]. Reads see either the old or the new
//! session atomically; refresh is serialized behind a gate so concurrent
//! callers racing on an expired session produce exactly one in-flight
//! authentication and all share its result.

use crate::error::{Error, Result};
use crate::executor::{RequestExecutor, decode};
use ns_protocol::{
    AuthSuccess, AuthenticateParams, CheckVersionParams, GetNoteStoreUrlParams,
    PROTOCOL_VERSION_MAJOR, PROTOCOL_VERSION_MINOR, ops,
};
use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;

/// Caller-supplied authentication material. Immutable for the life of the
/// manager.
#[derive(Clone)]
pub enum Credential {
    /// Consumer identity plus account username/password.
    Password {
        username: String,
        password: String,
        consumer_key: String,
        consumer_secret: String,
    },
    /// Pre-issued opaque token.
    Token(String),
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Password {
                username,
                consumer_key,
                ..
            } => f
                .debug_struct("Password")
                .field("username", username)
                .field("consumer_key", consumer_key)
                .field("password", &"<redacted>")
                .field("consumer_secret", &"<redacted>")
                .finish(),
            Credential::Token(token) => {
                let tail = &token[token.len().saturating_sub(4)..];
                write!(f, "Token(..{tail})")
            }
        }
    }
}

/// Live authenticated connection context.
#[derive(Debug, Clone)]
pub struct Session {
    /// Service-directed endpoint for note operations.
    pub endpoint_url: String,
    /// Token presented on every authenticated call.
    pub auth_token: String,
    /// When this session was established.
    pub issued_at: SystemTime,
    /// Declared token expiry, when the service provides one.
    pub expires_at: Option<SystemTime>,
    /// Set once the executor reports the token expired mid-flight.
    pub exhausted: bool,
}

/// Sessions this close to their declared expiry refresh eagerly rather
/// than burning a round-trip on a guaranteed rejection.
const EXPIRY_SKEW: Duration = Duration::from_secs(60);

impl Session {
    fn is_usable(&self) -> bool {
        if self.exhausted {
            return false;
        }
        match self.expires_at {
            Some(expiry) => SystemTime::now() + EXPIRY_SKEW < expiry,
            None => true,
        }
    }
}

/// Owns authentication state and re-authenticates on demand.
pub struct SessionManager {
    credential: Credential,
    /// Well-known endpoint used only to bootstrap; authenticated note
    /// operations target the endpoint the service hands back.
    bootstrap_endpoint: String,
    client_name: String,
    executor: RequestExecutor,
    state: RwLock<Option<Session>>,
    /// Serializes refresh. Held only while authenticating.
    refresh_gate: Mutex<()>,
}

impl SessionManager {
    pub fn new(
        bootstrap_endpoint: impl Into<String>,
        credential: Credential,
        client_name: impl Into<String>,
        executor: RequestExecutor,
    ) -> Self {
        Self {
            credential,
            bootstrap_endpoint: bootstrap_endpoint.into(),
            client_name: client_name.into(),
            executor,
            state: RwLock::new(None),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Returns a usable session, authenticating if none is held or the
    /// held one is exhausted or about to expire.
    ///
    /// Idempotent on the fast path: a still-valid session is returned
    /// without any remote call. Concurrent callers needing a refresh
    /// coalesce into one authentication.
    pub async fn ensure_session(&self, cancel: &CancellationToken) -> Result<Session> {
        if let Some(session) = self.state.read().await.as_ref() {
            if session.is_usable() {
                return Ok(session.clone());
            }
        }

        let _gate = self.refresh_gate.lock().await;

        // A racer may have refreshed while we waited on the gate.
        if let Some(session) = self.state.read().await.as_ref() {
            if session.is_usable() {
                return Ok(session.clone());
            }
        }

        let session = self.authenticate(cancel).await?;
        tracing::debug!(endpoint = %session.endpoint_url, "session established");
        *self.state.write().await = Some(session.clone());
        Ok(session)
    }

    /// Marks the held session exhausted, but only if `token` still matches
    /// it; a refresh that already happened is left alone.
    pub async fn invalidate(&self, token: &str) {
        let mut guard = self.state.write().await;
        if let Some(session) = guard.as_mut() {
            if session.auth_token == token && !session.exhausted {
                tracing::debug!("session marked exhausted");
                session.exhausted = true;
            }
        }
    }

    /// Drops the held session entirely. The next operation re-authenticates.
    pub async fn logout(&self) {
        *self.state.write().await = None;
    }

    /// Full authentication cycle: local credential checks, version gate,
    /// then the credential-specific exchange.
    async fn authenticate(&self, cancel: &CancellationToken) -> Result<Session> {
        if let Credential::Token(token) = &self.credential {
            if token.trim().is_empty() {
                return Err(Error::invalid_argument(
                    "credential.token",
                    "token must be non-empty",
                ));
            }
        }

        self.check_version(cancel).await?;

        let (auth_token, endpoint_url, expires_at) = match &self.credential {
            Credential::Password {
                username,
                password,
                consumer_key,
                consumer_secret,
            } => {
                let params = AuthenticateParams {
                    username: username.clone(),
                    password: password.clone(),
                    consumer_key: consumer_key.clone(),
                    consumer_secret: consumer_secret.clone(),
                };
                let auth: AuthSuccess =
                    decode(self.run(ops::AUTHENTICATE, &params, cancel).await?)?;
                (
                    auth.auth_token,
                    auth.note_store_url,
                    auth.expiration.and_then(epoch_millis_to_time),
                )
            }
            Credential::Token(token) => {
                let params = GetNoteStoreUrlParams {
                    auth_token: token.clone(),
                };
                let endpoint: String =
                    decode(self.run(ops::GET_NOTE_STORE_URL, &params, cancel).await?)?;
                (token.clone(), endpoint, None)
            }
        };

        Ok(Session {
            endpoint_url,
            auth_token,
            issued_at: SystemTime::now(),
            expires_at,
            exhausted: false,
        })
    }

    /// Version gate: runs before any authentication attempt, both paths.
    async fn check_version(&self, cancel: &CancellationToken) -> Result<()> {
        let params = CheckVersionParams {
            client_name: self.client_name.clone(),
            major: PROTOCOL_VERSION_MAJOR,
            minor: PROTOCOL_VERSION_MINOR,
        };
        let compatible: bool = decode(self.run(ops::CHECK_VERSION, &params, cancel).await?)?;
        if !compatible {
            return Err(Error::VersionMismatch {
                major: PROTOCOL_VERSION_MAJOR,
                minor: PROTOCOL_VERSION_MINOR,
            });
        }
        Ok(())
    }

    /// Runs a user-store operation against the bootstrap endpoint.
    async fn run(
        &self,
        operation: &str,
        params: &impl serde::Serialize,
        cancel: &CancellationToken,
    ) -> Result<serde_json::Value> {
        self.executor
            .execute(&self.bootstrap_endpoint, operation, params, cancel)
            .await
            .into_result()
    }
}

impl fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionManager")
            .field("credential", &self.credential)
            .field("bootstrap_endpoint", &self.bootstrap_endpoint)
            .field("client_name", &self.client_name)
            .finish_non_exhaustive()
    }
}

fn epoch_millis_to_time(millis: i64) -> Option<SystemTime> {
    u64::try_from(millis)
        .ok()
        .map(|ms| UNIX_EPOCH + Duration::from_millis(ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AuthErrorKind, Error};
    use crate::executor::{RequestExecutor, RetryPolicy};
    use crate::transport::{Transport, TransportFuture};
    use ns_protocol::{FaultCode, ServiceFault, ServiceReply};
    use std::sync::Arc;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory service double: answers user-store and note-store
    /// operations from a small script and logs every operation name.
    struct ServiceMock {
        op_log: StdMutex<Vec<String>>,
        version_ok: bool,
        auth_fault: Option<ServiceFault>,
        note_store_url: String,
        auth_calls: AtomicUsize,
        create_calls: AtomicUsize,
        expire_first_create: bool,
    }

    impl ServiceMock {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                op_log: StdMutex::new(Vec::new()),
                version_ok: true,
                auth_fault: None,
                note_store_url: "https://shard1.example/notes".into(),
                auth_calls: AtomicUsize::new(0),
                create_calls: AtomicUsize::new(0),
                expire_first_create: false,
            })
        }

        fn with(f: impl FnOnce(&mut Self)) -> Arc<Self> {
            let mut mock = Self {
                op_log: StdMutex::new(Vec::new()),
                version_ok: true,
                auth_fault: None,
                note_store_url: "https://shard1.example/notes".into(),
                auth_calls: AtomicUsize::new(0),
                create_calls: AtomicUsize::new(0),
                expire_first_create: false,
            };
            f(&mut mock);
            Arc::new(mock)
        }

        fn ops(&self) -> Vec<String> {
            self.op_log.lock().unwrap().clone()
        }

        fn auth_calls(&self) -> usize {
            self.auth_calls.load(Ordering::SeqCst)
        }

        fn reply_for(&self, operation: &str) -> ServiceReply {
            match operation {
                ops::CHECK_VERSION => ServiceReply::success(self.version_ok),
                ops::AUTHENTICATE => {
                    let n = self.auth_calls.fetch_add(1, Ordering::SeqCst);
                    match &self.auth_fault {
                        Some(fault) => ServiceReply::fault(fault.clone()),
                        None => ServiceReply::success(AuthSuccess {
                            auth_token: format!("tok-{n}"),
                            note_store_url: self.note_store_url.clone(),
                            expiration: None,
                        }),
                    }
                }
                ops::GET_NOTE_STORE_URL => {
                    self.auth_calls.fetch_add(1, Ordering::SeqCst);
                    ServiceReply::success(self.note_store_url.clone())
                }
                ops::CREATE_NOTE => {
                    let n = self.create_calls.fetch_add(1, Ordering::SeqCst);
                    if self.expire_first_create && n == 0 {
                        ServiceReply::fault(ServiceFault::new(
                            FaultCode::AuthExpired,
                            "token lapsed",
                        ))
                    } else {
                        ServiceReply::success(serde_json::json!({
                            "id": "note-1",
                            "notebookId": "nb1",
                            "title": "created",
                        }))
                    }
                }
                _ => ServiceReply::success(serde_json::Value::Null),
            }
        }
    }

    impl Transport for ServiceMock {
        fn send(
            &self,
            _endpoint: &str,
            operation: &str,
            _payload: Vec<u8>,
            _timeout: Duration,
        ) -> TransportFuture<'_> {
            let operation = operation.to_string();
            Box::pin(async move {
                self.op_log.lock().unwrap().push(operation.clone());
                if operation == ops::AUTHENTICATE {
                    // Widen the race window so coalescing is actually exercised.
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
                Ok(serde_json::to_vec(&self.reply_for(&operation)).unwrap())
            })
        }
    }

    fn password_credential() -> Credential {
        Credential::Password {
            username: "alice".into(),
            password: "hunter2".into(),
            consumer_key: "ckey".into(),
            consumer_secret: "csecret".into(),
        }
    }

    fn manager(mock: Arc<ServiceMock>, credential: Credential) -> SessionManager {
        let executor = RequestExecutor::new(mock, RetryPolicy::default());
        SessionManager::new("https://svc.example/user", credential, "ns-test", executor)
    }

    #[tokio::test]
    async fn ensure_session_is_idempotent() {
        let mock = ServiceMock::new();
        let sessions = manager(mock.clone(), password_credential());
        let cancel = CancellationToken::new();

        let first = sessions.ensure_session(&cancel).await.unwrap();
        assert_eq!(first.auth_token, "tok-0");
        assert_eq!(first.endpoint_url, "https://shard1.example/notes");
        let calls_after_first = mock.ops().len();

        let second = sessions.ensure_session(&cancel).await.unwrap();
        assert_eq!(second.auth_token, first.auth_token);
        // Fast path: zero additional remote calls.
        assert_eq!(mock.ops().len(), calls_after_first);
    }

    #[tokio::test]
    async fn concurrent_refresh_coalesces_into_one_authentication() {
        let mock = ServiceMock::new();
        let sessions = Arc::new(manager(mock.clone(), password_credential()));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let sessions = Arc::clone(&sessions);
            handles.push(tokio::spawn(async move {
                sessions.ensure_session(&CancellationToken::new()).await
            }));
        }
        for handle in handles {
            let session = handle.await.unwrap().unwrap();
            assert_eq!(session.auth_token, "tok-0");
        }

        assert_eq!(mock.auth_calls(), 1);
    }

    #[tokio::test]
    async fn invalid_password_maps_to_distinct_kind_without_retry() {
        let mock = ServiceMock::with(|m| {
            m.auth_fault = Some(
                ServiceFault::new(FaultCode::InvalidAuth, "bad password")
                    .with_parameter("password"),
            );
        });
        let sessions = manager(mock.clone(), password_credential());

        let err = sessions
            .ensure_session(&CancellationToken::new())
            .await
            .unwrap_err();
        match err {
            Error::Auth(auth) => assert_eq!(auth.kind, AuthErrorKind::InvalidPassword),
            other => panic!("expected auth error, got {other:?}"),
        }
        assert_eq!(mock.auth_calls(), 1);
    }

    #[tokio::test]
    async fn version_mismatch_precedes_authentication() {
        let mock = ServiceMock::with(|m| m.version_ok = false);
        let sessions = manager(mock.clone(), Credential::Token("tok".into()));

        let err = sessions
            .ensure_session(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::VersionMismatch { .. }));

        let ops_seen = mock.ops();
        assert!(ops_seen.contains(&ops::CHECK_VERSION.to_string()));
        assert!(!ops_seen.contains(&ops::AUTHENTICATE.to_string()));
        assert!(!ops_seen.contains(&ops::GET_NOTE_STORE_URL.to_string()));
    }

    #[tokio::test]
    async fn empty_token_is_rejected_before_any_remote_call() {
        let mock = ServiceMock::new();
        let sessions = manager(mock.clone(), Credential::Token("  ".into()));

        let err = sessions
            .ensure_session(&CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
        assert!(mock.ops().is_empty());
    }

    #[tokio::test]
    async fn token_path_discovers_service_endpoint() {
        let mock = ServiceMock::new();
        let sessions = manager(mock.clone(), Credential::Token("tok".into()));

        let session = sessions
            .ensure_session(&CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(session.auth_token, "tok");
        assert_eq!(session.endpoint_url, "https://shard1.example/notes");
        assert!(session.expires_at.is_none());
    }

    #[tokio::test]
    async fn stale_invalidate_does_not_exhaust_fresh_session() {
        let mock = ServiceMock::new();
        let sessions = manager(mock.clone(), password_credential());
        let cancel = CancellationToken::new();

        let session = sessions.ensure_session(&cancel).await.unwrap();
        sessions.invalidate("some-older-token").await;

        let again = sessions.ensure_session(&cancel).await.unwrap();
        assert_eq!(again.auth_token, session.auth_token);
        assert_eq!(mock.auth_calls(), 1);
    }

    #[tokio::test]
    async fn mid_flight_expiry_refreshes_once_and_retries_once() {
        let mock = ServiceMock::with(|m| m.expire_first_create = true);
        let executor = RequestExecutor::new(mock.clone(), RetryPolicy::default());
        let sessions = SessionManager::new(
            "https://svc.example/user",
            password_credential(),
            "ns-test",
            executor.clone(),
        );
        let cancel = CancellationToken::new();

        let value = executor
            .execute_authed(
                &sessions,
                ops::CREATE_NOTE,
                |session| {
                    serde_json::json!({ "authToken": session.auth_token, "note": {} })
                },
                &cancel,
            )
            .await
            .unwrap();

        assert_eq!(value["id"], "note-1");
        // One initial authentication plus exactly one refresh.
        assert_eq!(mock.auth_calls(), 2);
        assert_eq!(mock.create_calls.load(Ordering::SeqCst), 2);
    }
}
