//! Client-side advisory check.
//!
//! Runs in the browser whenever the cached account list changes. It is not a
//! security boundary; the backend gate is. Unlike [`crate::policy`] this is a
//! strict, case-sensitive suffix match.

use std::sync::atomic::{AtomicU64, Ordering};

/// Anything with an email-like username, e.g. a cached IdP account.
pub trait AuthenticatedAccount {
    fn username(&self) -> &str;
}

impl AuthenticatedAccount for String {
    fn username(&self) -> &str {
        self
    }
}

impl AuthenticatedAccount for &str {
    fn username(&self) -> &str {
        self
    }
}

/// Strict suffix match used by the browser.
pub fn username_has_domain(username: &str, required_domain: &str) -> bool {
    username.ends_with(required_domain)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvisoryOutcome {
    /// No cached account; nothing to check.
    NoSession,
    Allowed,
    /// The signed-in account is outside the domain and should be signed out.
    SignOut { username: String },
}

/// Outcome tagged with the account-list generation it was computed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evaluation {
    pub generation: u64,
    pub outcome: AdvisoryOutcome,
}

#[derive(Debug)]
pub struct AdvisoryCheck {
    required_domain: String,
    generation: AtomicU64,
}

impl AdvisoryCheck {
    pub fn new(required_domain: impl Into<String>) -> Self {
        Self {
            required_domain: required_domain.into(),
            generation: AtomicU64::new(0),
        }
    }

    /// Evaluate a new snapshot of the account list.
    ///
    /// Only the first account is inspected. Every call supersedes the
    /// evaluations returned before it.
    pub fn observe<A: AuthenticatedAccount>(&self, accounts: &[A]) -> Evaluation {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let outcome = match accounts.first().map(AuthenticatedAccount::username) {
            None => AdvisoryOutcome::NoSession,
            Some("") => AdvisoryOutcome::Allowed,
            Some(username) if username_has_domain(username, &self.required_domain) => {
                AdvisoryOutcome::Allowed
            }
            Some(username) => AdvisoryOutcome::SignOut {
                username: username.to_string(),
            },
        };

        Evaluation {
            generation,
            outcome,
        }
    }

    /// Whether `evaluation` still reflects the latest observed account list.
    pub fn is_current(&self, evaluation: &Evaluation) -> bool {
        self.generation.load(Ordering::SeqCst) == evaluation.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::{AllowedDomainSuffix, DomainPolicy};
    use crate::resolver::ClaimResolver;
    use crate::IdentityClaims;

    #[test]
    fn test_no_accounts() {
        let check = AdvisoryCheck::new("@domain.com");
        let accounts: Vec<String> = Vec::new();
        assert_eq!(check.observe(&accounts).outcome, AdvisoryOutcome::NoSession);
    }

    #[test]
    fn test_allowed_account() {
        let check = AdvisoryCheck::new("@domain.com");
        assert_eq!(
            check.observe(&["alice@domain.com"]).outcome,
            AdvisoryOutcome::Allowed
        );
    }

    #[test]
    fn test_only_first_account_inspected() {
        let check = AdvisoryCheck::new("@domain.com");
        assert_eq!(
            check.observe(&["alice@domain.com", "mallory@other.org"]).outcome,
            AdvisoryOutcome::Allowed
        );
        assert_eq!(
            check.observe(&["mallory@other.org", "alice@domain.com"]).outcome,
            AdvisoryOutcome::SignOut {
                username: "mallory@other.org".to_string()
            }
        );
    }

    #[test]
    fn test_suffix_match_is_case_sensitive() {
        assert!(!username_has_domain("USER@DOMAIN.COM", "@domain.com"));
        assert!(username_has_domain("user@domain.com", "@domain.com"));
    }

    #[test]
    fn test_stricter_than_server_policy() {
        // The browser signs this user out while the backend would let them in.
        // Both behaviors are deliberate; this test pins the asymmetry.
        let username = "user@domain.com.attacker.io";

        let check = AdvisoryCheck::new("@domain.com");
        assert_eq!(
            check.observe(&[username]).outcome,
            AdvisoryOutcome::SignOut {
                username: username.to_string()
            }
        );

        let identifier = ClaimResolver::default()
            .resolve(&IdentityClaims::from_pairs([("preferred_username", username)]));
        let server = DomainPolicy::new(AllowedDomainSuffix::new("@domain.com"));
        assert!(server.evaluate(identifier.as_ref()).is_allowed());
    }

    #[test]
    fn test_stale_evaluation_not_current() {
        let check = AdvisoryCheck::new("@domain.com");
        let stale = check.observe(&["mallory@other.org"]);
        assert!(check.is_current(&stale));

        let fresh = check.observe(&["alice@domain.com"]);
        assert!(!check.is_current(&stale));
        assert!(check.is_current(&fresh));
        assert_eq!(fresh.outcome, AdvisoryOutcome::Allowed);
    }

    #[test]
    fn test_empty_username_not_signed_out() {
        let check = AdvisoryCheck::new("@domain.com");
        assert_eq!(check.observe(&[""]).outcome, AdvisoryOutcome::Allowed);
    }
}
