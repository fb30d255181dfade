//! Domain restriction gate.
//!
//! Runs after `auth::require_auth` and before any protected handler. It turns
//! the authenticated claims into a canonical identifier and lets the request
//! through only when the domain policy allows it.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain_policy::api::FORBIDDEN_INVALID_DOMAIN;
use domain_policy::{AllowedDomainSuffix, CanonicalIdentifier, ClaimResolver, DomainPolicy, Verdict};

use crate::auth::Authenticated;
use crate::config::AppConfig;
use crate::AppState;

#[derive(Debug, Clone)]
pub struct DomainGate {
    resolver: ClaimResolver,
    policy: DomainPolicy,
}

impl DomainGate {
    pub fn new(resolver: ClaimResolver, policy: DomainPolicy) -> Self {
        Self { resolver, policy }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let resolver = ClaimResolver::default().extend(config.claim_probes());
        let suffix = AllowedDomainSuffix::new(&config.allowed_domain);

        if suffix.is_configured() {
            tracing::info!(
                allowed_domain = suffix.as_str(),
                probes = ?resolver.probes(),
                "Domain restriction enabled"
            );
        } else {
            tracing::error!("ALLOWED_DOMAIN is empty; every protected request will be rejected");
        }

        Self::new(resolver, DomainPolicy::new(suffix))
    }

    pub fn policy(&self) -> &DomainPolicy {
        &self.policy
    }

    pub fn identify(&self, identity: &Authenticated) -> Option<CanonicalIdentifier> {
        self.resolver.resolve(identity.claims())
    }

    pub fn decide(&self, identity: &Authenticated) -> Verdict {
        self.policy.evaluate(self.identify(identity).as_ref())
    }
}

/// Middleware rejecting identities outside the allowed domain.
///
/// Taking [`Authenticated`] as an extractor means this cannot run on a
/// request that skipped authentication: the extractor answers 401 first.
pub async fn restrict_domain(
    State(state): State<AppState>,
    identity: Authenticated,
    request: Request<Body>,
    next: Next,
) -> Response {
    match state.gate.decide(&identity) {
        Verdict::Allow => next.run(request).await,
        Verdict::Deny(reason) => {
            tracing::warn!(uri = %request.uri(), %reason, "Request rejected by domain restriction");
            forbidden_response()
        }
    }
}

fn forbidden_response() -> Response {
    (
        StatusCode::FORBIDDEN,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        FORBIDDEN_INVALID_DOMAIN,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_policy::{DenyReason, IdentityClaims};

    fn gate(suffix: &str) -> DomainGate {
        DomainGate::new(
            ClaimResolver::default(),
            DomainPolicy::new(AllowedDomainSuffix::new(suffix)),
        )
    }

    fn identity<const N: usize>(pairs: [(&str, &str); N]) -> Authenticated {
        Authenticated::for_tests(IdentityClaims::from_pairs(pairs))
    }

    #[test]
    fn test_allows_matching_domain() {
        let verdict = gate("@domain.com").decide(&identity([("email", "carol@domain.com")]));
        assert_eq!(verdict, Verdict::Allow);
    }

    #[test]
    fn test_rejects_other_domain() {
        let verdict = gate("@domain.com").decide(&identity([("upn", "dave@other.org")]));
        assert_eq!(verdict, Verdict::Deny(DenyReason::DomainMismatch));
    }

    #[test]
    fn test_rejects_missing_identifier() {
        let verdict = gate("@domain.com").decide(&identity([("sub", "abc"), ("email", "")]));
        assert_eq!(verdict, Verdict::Deny(DenyReason::NoIdentifierFound));
    }

    #[test]
    fn test_guest_account_prefix_stripped() {
        // The prefix mentions the allowed domain, the mailbox does not.
        let verdict = gate("@domain.com").decide(&identity([(
            "upn",
            "someone@domain.com#mallory@other.org",
        )]));
        assert_eq!(verdict, Verdict::Deny(DenyReason::DomainMismatch));
    }

    #[test]
    fn test_configured_probes_extend_defaults() {
        let config = AppConfig::try_parse_args([
            "backend",
            "--allowed-domain",
            "@Domain.com",
            "--identity-claim-probes",
            "login_hint",
        ])
        .unwrap();

        let gate = DomainGate::from_config(&config);
        assert_eq!(gate.policy().allowed_suffix().as_str(), "@domain.com");
        assert!(gate
            .decide(&identity([("login_hint", "gina@domain.com")]))
            .is_allowed());
    }
}
