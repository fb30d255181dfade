//! Claim-to-identifier resolution.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::claims::IdentityClaims;

/// Claim names probed for the user's email-like identifier, highest priority first.
pub const DEFAULT_CLAIM_PROBES: [&str; 5] = [
    "preferred_username",
    "email",
    "upn",
    "unique_name",
    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/emailaddress",
];

/// Separator some providers put between a directory prefix and the real
/// mailbox (guest and federated accounts, e.g. `live.com#alice@domain.com`).
const PROVIDER_PREFIX_SEPARATOR: char = '#';

/// The user's effective email-like identifier.
///
/// Computed fresh for every decision and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalIdentifier(String);

impl CanonicalIdentifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered list of claim probes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimResolver {
    probes: Vec<String>,
}

impl Default for ClaimResolver {
    fn default() -> Self {
        Self::with_probes(DEFAULT_CLAIM_PROBES)
    }
}

impl ClaimResolver {
    /// Replace the probe list entirely.
    pub fn with_probes<I, S>(probes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            probes: probes.into_iter().map(Into::into).collect(),
        }
    }

    /// Append lower-priority probes, skipping names already present.
    pub fn extend<I, S>(mut self, probes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for probe in probes {
            let probe = probe.into();
            if !probe.is_empty() && !self.probes.contains(&probe) {
                self.probes.push(probe);
            }
        }
        self
    }

    pub fn probes(&self) -> &[String] {
        &self.probes
    }

    /// Resolve the canonical identifier.
    ///
    /// The first probe with a non-empty value wins, whether or not it would
    /// pass any policy. Text up to and including the last `#` is dropped.
    /// Case is preserved.
    pub fn resolve(&self, claims: &IdentityClaims) -> Option<CanonicalIdentifier> {
        let (probe, raw) = self.probes.iter().find_map(|probe| {
            claims
                .find_first(probe)
                .filter(|value| !value.is_empty())
                .map(|value| (probe, value))
        })?;

        let identifier = match raw.rfind(PROVIDER_PREFIX_SEPARATOR) {
            Some(idx) => &raw[idx + PROVIDER_PREFIX_SEPARATOR.len_utf8()..],
            None => raw,
        };

        if identifier.is_empty() {
            tracing::trace!(claim = %probe, "claim value is only a provider prefix");
            return None;
        }

        tracing::trace!(claim = %probe, "resolved identifier");
        Some(CanonicalIdentifier(identifier.to_string()))
    }
}
