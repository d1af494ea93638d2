//! Decoded response envelope and structured service faults.
//!
//! Every response payload decodes to a [`ServiceReply`]: either a `result`
//! value or a structured [`ServiceFault`]. The byte encoding around this
//! envelope is owned by the transport and never appears here.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Structured rejection codes the service can return.
///
/// Unrecognized codes deserialize to [`FaultCode::Unknown`] so that new
/// server-side codes never break decoding (forward-compatible catch-all).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FaultCode {
    /// Malformed field content in the request.
    BadDataFormat,
    /// A required field was missing.
    DataRequired,
    /// Caller lacks permission for the target object.
    PermissionDenied,
    /// Service-side failure processing an otherwise valid request.
    InternalError,
    /// Authentication material was rejected; `parameter` names the
    /// offending field (`consumerKey`, `username`, `password`,
    /// `authenticationToken`).
    InvalidAuth,
    /// The presented authentication token has expired.
    AuthExpired,
    /// Account quota would be exceeded by this request.
    QuotaReached,
    /// Too many requests; `retry_after_secs` carries the suggested wait.
    RateLimitReached,
    /// Referenced object does not exist.
    NotFound,
    /// Any code this client does not recognize.
    #[serde(other)]
    Unknown,
}

/// A structured rejection returned by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("{code:?}: {message}")]
pub struct ServiceFault {
    /// Rejection category.
    pub code: FaultCode,
    /// Human-readable explanation from the service.
    pub message: String,
    /// Name of the offending request field, when the service identifies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    /// Suggested wait before retrying, for rate-limit faults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u32>,
}

impl ServiceFault {
    /// Creates a fault with just a code and message.
    pub fn new(code: FaultCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            parameter: None,
            retry_after_secs: None,
        }
    }

    /// Attaches the offending parameter name.
    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameter = Some(parameter.into());
        self
    }
}

/// Decoded response envelope: a result value or a fault, never both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceReply {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ServiceFault>,
}

impl ServiceReply {
    /// Wraps a successful result value.
    pub fn success(result: impl Serialize) -> Self {
        Self {
            result: Some(serde_json::to_value(result).expect("result serializes")),
            error: None,
        }
    }

    /// Wraps a fault.
    pub fn fault(fault: ServiceFault) -> Self {
        Self {
            result: None,
            error: Some(fault),
        }
    }

    /// Splits the envelope. A reply carrying both keeps the fault; a reply
    /// carrying neither yields `Null`, matching services that return void.
    pub fn into_result(self) -> Result<Value, ServiceFault> {
        match self.error {
            Some(fault) => Err(fault),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}
