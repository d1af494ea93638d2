//! Client configuration.
//!
//! Everything the client needs is injected here at construction; there is
//! no process-wide state. The endpoint is the well-known bootstrap URL -
//! authenticated note operations target whatever endpoint the service
//! hands back at authentication.

use ns_runtime::{Credential, RetryPolicy};
use std::time::Duration;

/// Constructor-injected configuration for [`crate::CatalogClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Well-known service root used to bootstrap authentication.
    pub endpoint: String,
    /// Authentication material.
    pub credential: Credential,
    /// Client name reported to the service's version check.
    pub client_name: String,
    /// Retry/timeout policy applied to every call.
    pub policy: RetryPolicy,
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, credential: Credential) -> Self {
        Self {
            endpoint: endpoint.into(),
            credential,
            client_name: concat!("ns-rs/", env!("CARGO_PKG_VERSION")).to_string(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = name.into();
        self
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Overrides the retry bound, leaving the rest of the policy alone.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.policy.max_attempts = max_attempts;
        self
    }

    /// Overrides the per-attempt deadline, leaving the rest of the policy
    /// alone.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.policy.request_timeout = timeout;
        self
    }
}
