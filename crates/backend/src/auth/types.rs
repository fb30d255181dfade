//! Auth-related types.

use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};
use domain_policy::IdentityClaims;
use thiserror::Error;

use crate::error::ApiError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,

    #[error("no signing key for kid {0:?}")]
    UnknownKey(Option<String>),

    #[error("failed to fetch signing keys: {0}")]
    KeyFetch(#[source] anyhow::Error),

    #[error("token rejected: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

/// Claims of a request whose bearer token passed validation.
///
/// Only [`super::TokenValidator`] can build one, so any handler or middleware
/// that extracts `Authenticated` is guaranteed to run after `require_auth`.
#[derive(Debug, Clone)]
pub struct Authenticated {
    claims: Arc<IdentityClaims>,
}

impl Authenticated {
    pub(super) fn new(claims: IdentityClaims) -> Self {
        Self {
            claims: Arc::new(claims),
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(claims: IdentityClaims) -> Self {
        Self::new(claims)
    }

    pub fn claims(&self) -> &IdentityClaims {
        &self.claims
    }

    /// Display name as issued by the identity provider.
    pub fn name(&self) -> Option<&str> {
        self.claims.find_first("name").filter(|n| !n.is_empty())
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Authenticated>()
            .cloned()
            .ok_or_else(|| ApiError::Unauthorized("Missing authentication".to_string()))
    }
}
