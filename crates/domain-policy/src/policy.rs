//! Authoritative domain decision.

use thiserror::Error;

use crate::resolver::CanonicalIdentifier;

/// Configured domain marker, e.g. `@domain.com`.
///
/// Stored lowercased; set once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedDomainSuffix(String);

impl AllowedDomainSuffix {
    pub fn new(suffix: impl AsRef<str>) -> Self {
        Self(suffix.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty suffix is a misconfiguration and denies everyone.
    pub fn is_configured(&self) -> bool {
        !self.0.is_empty()
    }
}

/// Why a request was denied. Only ever logged, never sent to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("no identifier claim found")]
    NoIdentifierFound,

    #[error("identifier does not belong to the allowed domain")]
    DomainMismatch,

    #[error("allowed domain is not configured")]
    SuffixNotConfigured,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Allow,
    Deny(DenyReason),
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

#[derive(Debug, Clone)]
pub struct DomainPolicy {
    allowed: AllowedDomainSuffix,
}

impl DomainPolicy {
    pub fn new(allowed: AllowedDomainSuffix) -> Self {
        Self { allowed }
    }

    pub fn allowed_suffix(&self) -> &AllowedDomainSuffix {
        &self.allowed
    }

    /// Case-insensitive *containment* check.
    ///
    /// The suffix may appear anywhere in the identifier, so
    /// `user@domain.com.attacker.io` passes for `@domain.com`. This matches
    /// the deployed behavior that existing clients depend on.
    pub fn evaluate(&self, identifier: Option<&CanonicalIdentifier>) -> Verdict {
        let Some(identifier) = identifier else {
            return Verdict::Deny(DenyReason::NoIdentifierFound);
        };

        if !self.allowed.is_configured() {
            return Verdict::Deny(DenyReason::SuffixNotConfigured);
        }

        if identifier
            .as_str()
            .to_lowercase()
            .contains(self.allowed.as_str())
        {
            Verdict::Allow
        } else {
            Verdict::Deny(DenyReason::DomainMismatch)
        }
    }
}
