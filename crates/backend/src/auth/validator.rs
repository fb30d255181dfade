//! JWT validation.

use std::sync::Arc;

use async_trait::async_trait;
use domain_policy::IdentityClaims;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};

use super::jwks::JwksProvider;
use super::types::{AuthError, Authenticated};
use crate::config::KeySettings;

/// Clock skew tolerated on `exp`/`nbf`.
const LEEWAY_SECONDS: u64 = 60;

/// Source of the key a token must be signed with.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// The only algorithm accepted for keys from this source.
    fn algorithm(&self) -> Algorithm;

    async fn decoding_key(&self, kid: Option<&str>) -> Result<Arc<DecodingKey>, AuthError>;
}

/// A single shared HS256 secret (development and tests).
pub struct StaticKey {
    key: Arc<DecodingKey>,
}

impl StaticKey {
    pub fn hs256(secret: &str) -> Self {
        Self {
            key: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }
}

#[async_trait]
impl KeyResolver for StaticKey {
    fn algorithm(&self) -> Algorithm {
        Algorithm::HS256
    }

    async fn decoding_key(&self, _kid: Option<&str>) -> Result<Arc<DecodingKey>, AuthError> {
        Ok(self.key.clone())
    }
}

pub struct TokenValidator {
    keys: Arc<dyn KeyResolver>,
    issuers: Vec<String>,
    audience: Vec<String>,
}

impl TokenValidator {
    pub fn new(keys: Arc<dyn KeyResolver>, issuers: Vec<String>, audience: Vec<String>) -> Self {
        Self {
            keys,
            issuers,
            audience,
        }
    }

    pub fn from_settings(settings: KeySettings) -> anyhow::Result<Self> {
        match settings {
            KeySettings::Jwks {
                jwks_uri,
                issuers,
                audience,
            } => {
                tracing::info!(%jwks_uri, ?issuers, "Validating tokens against published keys");
                let provider = JwksProvider::new(jwks_uri)?;
                Ok(Self::new(Arc::new(provider), issuers, audience))
            }
            KeySettings::DevSecret { secret, audience } => {
                tracing::warn!("AUTH_DEV_HS256_SECRET is set; accepting HS256 development tokens");
                Ok(Self::new(Arc::new(StaticKey::hs256(&secret)), Vec::new(), audience))
            }
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.keys.algorithm());
        validation.leeway = LEEWAY_SECONDS;

        if !self.issuers.is_empty() {
            validation.set_issuer(&self.issuers);
        }
        if self.audience.is_empty() {
            validation.validate_aud = false;
        } else {
            validation.set_audience(&self.audience);
        }

        validation
    }

    /// Verify `token` and return the identity it carries.
    pub async fn validate(&self, token: &str) -> Result<Authenticated, AuthError> {
        let header = decode_header(token)?;
        let key = self.keys.decoding_key(header.kid.as_deref()).await?;
        let data = decode::<IdentityClaims>(token, &key, &self.validation())?;

        Ok(Authenticated::new(data.claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::testing::{mint_token, TEST_SECRET};
    use chrono::{Duration, Utc};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn validator(audience: &[&str]) -> TokenValidator {
        TokenValidator::new(
            Arc::new(StaticKey::hs256(TEST_SECRET)),
            Vec::new(),
            audience.iter().map(|a| a.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_valid_token_yields_claims() {
        let token = mint_token(json!({ "email": "carol@domain.com", "name": "Carol" }));

        let identity = assert_ok!(validator(&[]).validate(&token).await);
        assert_eq!(identity.claims().find_first("email"), Some("carol@domain.com"));
        assert_eq!(identity.name(), Some("Carol"));
    }

    #[tokio::test]
    async fn test_invalid_token_rejected() {
        let err = assert_err!(validator(&[]).validate("invalid-token").await);
        assert!(matches!(err, AuthError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_wrong_secret_rejected() {
        let token = mint_token(json!({ "email": "carol@domain.com" }));
        let other = TokenValidator::new(Arc::new(StaticKey::hs256("wrong-secret")), vec![], vec![]);
        assert_err!(other.validate(&token).await);
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let expired = (Utc::now() - Duration::hours(2)).timestamp();
        let token = mint_token(json!({ "email": "carol@domain.com", "exp": expired }));
        assert_err!(validator(&[]).validate(&token).await);
    }

    #[tokio::test]
    async fn test_audience_enforced() {
        let token = mint_token(json!({ "email": "carol@domain.com", "aud": "api://other" }));
        assert_err!(validator(&["api://client"]).validate(&token).await);

        let token = mint_token(json!({ "email": "carol@domain.com", "aud": "api://client" }));
        assert_ok!(validator(&["api://client"]).validate(&token).await);
    }

    #[tokio::test]
    async fn test_issuer_enforced() {
        let validator = TokenValidator::new(
            Arc::new(StaticKey::hs256(TEST_SECRET)),
            vec!["https://sts.windows.net/tenant/".to_string()],
            vec![],
        );

        let token = mint_token(json!({ "iss": "https://evil.example/", "email": "a@domain.com" }));
        assert_err!(validator.validate(&token).await);

        let token = mint_token(json!({
            "iss": "https://sts.windows.net/tenant/",
            "email": "a@domain.com"
        }));
        assert_ok!(validator.validate(&token).await);
    }
}
