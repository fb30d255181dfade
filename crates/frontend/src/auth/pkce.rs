//! Proof Key for Code Exchange (RFC 7636), S256 method.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PkcePair {
    pub verifier: String,
    pub challenge: String,
}

impl PkcePair {
    /// Fresh verifier: two random UUIDs, 64 unreserved characters.
    pub fn generate() -> Self {
        let verifier = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        Self {
            challenge: challenge_for(&verifier),
            verifier,
        }
    }
}

pub fn challenge_for(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Opaque value echoed back by the provider to tie the redirect to this tab.
pub fn new_state() -> String {
    Uuid::new_v4().simple().to_string()
}
