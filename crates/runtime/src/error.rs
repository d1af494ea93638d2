//! Error types for the note-storage client runtime.

use crate::transport::TransportError;
use ns_protocol::ServiceFault;
use std::fmt;
use thiserror::Error;

/// Result type alias for runtime operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the note-storage client runtime.
///
/// Every failure path in the client yields exactly one of these kinds;
/// nothing is swallowed or downgraded to a log line.
#[derive(Debug, Error)]
pub enum Error {
    /// The service rejected this client's protocol version before
    /// authentication was attempted.
    #[error("service rejected client protocol version {major}.{minor}")]
    VersionMismatch { major: u16, minor: u16 },

    /// Authentication failed and will keep failing until the caller fixes
    /// the credential (or, for `Expired`, until re-authentication).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A single transport-level failure, before retry policy applies.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Retries exhausted; `cause` is the failure of the final attempt.
    #[error("service unavailable after {attempts} attempts: {cause}")]
    ServiceUnavailable {
        attempts: u32,
        #[source]
        cause: TransportError,
    },

    /// Caller-side input error, detected before any remote call.
    #[error("invalid argument {name}: {reason}")]
    InvalidArgument { name: String, reason: String },

    /// Note markup references an attachment digest that no attachment in
    /// the note carries.
    #[error("markup references attachment {hash} not present in the note")]
    DanglingAttachmentReference { hash: String },

    /// Structured service rejection this client does not classify;
    /// surfaced verbatim.
    #[error("service fault: {0}")]
    Fault(#[from] ServiceFault),

    /// The caller cancelled the operation.
    #[error("operation cancelled")]
    Cancelled,

    /// Payload encoding or response decoding failed.
    #[error("codec error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Convenience constructor for caller-input errors.
    pub fn invalid_argument(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidArgument {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this is an authentication failure of any kind.
    pub fn is_auth(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Returns true for failures where a later identical call could
    /// succeed (service unreachable, not caller bugs).
    pub fn is_unavailability(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::ServiceUnavailable { .. })
    }

    /// Number of attempts issued, when retry exhaustion produced this error.
    pub fn attempts(&self) -> Option<u32> {
        match self {
            Error::ServiceUnavailable { attempts, .. } => Some(*attempts),
            _ => None,
        }
    }
}

/// Which piece of authentication material the service rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    InvalidConsumerKey,
    InvalidUsername,
    InvalidPassword,
    /// The session token is no longer accepted; re-authentication applies.
    Expired,
}

impl fmt::Display for AuthErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthErrorKind::InvalidConsumerKey => "invalid consumer key",
            AuthErrorKind::InvalidUsername => "invalid username",
            AuthErrorKind::InvalidPassword => "invalid password",
            AuthErrorKind::Expired => "session expired",
        };
        f.write_str(s)
    }
}

/// Authentication failure with the offending parameter, when the service
/// names one.
#[derive(Debug, Clone, Error)]
#[error("authentication failed: {kind}{}", parameter.as_ref().map(|p| format!(" (parameter: {p})")).unwrap_or_default())]
pub struct AuthError {
    pub kind: AuthErrorKind,
    pub parameter: Option<String>,
}

impl AuthError {
    /// An expired-session failure with no parameter context.
    pub fn expired() -> Self {
        Self {
            kind: AuthErrorKind::Expired,
            parameter: None,
        }
    }

    /// Maps the service's `parameter` field on an invalid-auth fault to a
    /// kind. A rejected token is operationally an expired one. Returns
    /// `None` for parameters this client does not recognize; those faults
    /// stay unclassified.
    pub fn from_invalid_auth_parameter(parameter: Option<String>) -> Option<Self> {
        let kind = match parameter.as_deref() {
            Some("consumerKey") => AuthErrorKind::InvalidConsumerKey,
            Some("username") => AuthErrorKind::InvalidUsername,
            Some("password") => AuthErrorKind::InvalidPassword,
            Some("authenticationToken") => AuthErrorKind::Expired,
            _ => return None,
        };
        Some(Self { kind, parameter })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_auth_parameter_mapping() {
        let err = AuthError::from_invalid_auth_parameter(Some("password".into())).unwrap();
        assert_eq!(err.kind, AuthErrorKind::InvalidPassword);
        assert_eq!(err.parameter.as_deref(), Some("password"));

        let err = AuthError::from_invalid_auth_parameter(Some("authenticationToken".into()))
            .unwrap();
        assert_eq!(err.kind, AuthErrorKind::Expired);

        assert!(AuthError::from_invalid_auth_parameter(Some("shard".into())).is_none());
        assert!(AuthError::from_invalid_auth_parameter(None).is_none());
    }

    #[test]
    fn auth_error_message_carries_parameter() {
        let err = AuthError::from_invalid_auth_parameter(Some("username".into())).unwrap();
        let msg = err.to_string();
        assert!(msg.contains("invalid username"));
        assert!(msg.contains("parameter: username"));
    }

    #[test]
    fn attempts_exposed_for_exhaustion_only() {
        let err = Error::ServiceUnavailable {
            attempts: 3,
            cause: TransportError::ConnectFailed("refused".into()),
        };
        assert_eq!(err.attempts(), Some(3));
        assert!(Error::Cancelled.attempts().is_none());
    }
}
