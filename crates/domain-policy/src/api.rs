//! Wire types shared by the backend and the frontend.

use serde::{Deserialize, Serialize};

/// Protected ping endpoint.
pub const PING_PATH: &str = "/api/test/ping";

/// Body of every domain rejection. Existing clients match on this literal.
pub const FORBIDDEN_INVALID_DOMAIN: &str = "Forbidden: Invalid domain";

/// JSON error body for authentication and server failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainPolicyStatus {
    Configured,
    Unconfigured,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub domain_policy: DomainPolicyStatus,
}
