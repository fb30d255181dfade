//! Bearer-token authentication.
//!
//! This module provides:
//! - JWKS key retrieval with a per-`kid` cache
//! - JWT validation (signature, expiry, issuer, audience)
//! - `require_auth` middleware that attaches an [`Authenticated`] identity
//!
//! Authorization decisions live in `crate::gate`; nothing here looks at the
//! user's domain.

mod jwks;
mod middleware;
mod types;
mod validator;

pub use middleware::require_auth;
pub use types::{AuthError, Authenticated};
pub use validator::TokenValidator;
