//! Token endpoint payloads and the cached account.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use domain_policy::{AuthenticatedAccount, IdentityClaims};
use serde::{Deserialize, Serialize};

use super::SessionError;

/// Claims the account username is taken from, in order.
const USERNAME_CLAIMS: [&str; 3] = ["preferred_username", "upn", "email"];

/// Tokens this close to expiry are refreshed instead of reused.
const EXPIRY_MARGIN_SECONDS: i64 = 60;

/// Signed-in account, as cached in local storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub name: Option<String>,
}

impl Account {
    /// Build the account from an ID token. The token was just received from
    /// the token endpoint over TLS, so its signature is not checked here.
    pub fn from_id_token(id_token: &str) -> Result<Self, SessionError> {
        let claims = decode_payload(id_token)?;
        let username = USERNAME_CLAIMS
            .iter()
            .find_map(|name| claims.find_first(name).filter(|v| !v.is_empty()))
            .ok_or(SessionError::InvalidIdToken)?
            .to_string();

        Ok(Self {
            username,
            name: claims.find_first("name").map(str::to_string),
        })
    }
}

impl AuthenticatedAccount for Account {
    fn username(&self) -> &str {
        &self.username
    }
}

fn decode_payload(jwt: &str) -> Result<IdentityClaims, SessionError> {
    let payload = jwt.split('.').nth(1).ok_or(SessionError::InvalidIdToken)?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| SessionError::InvalidIdToken)?;
    serde_json::from_slice(&bytes).map_err(|_| SessionError::InvalidIdToken)
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl TokenSet {
    pub fn from_response(response: &TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: response.access_token.clone(),
            refresh_token: response.refresh_token.clone(),
            expires_at: now + Duration::seconds(response.expires_in),
        }
    }

    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now > Duration::seconds(EXPIRY_MARGIN_SECONDS)
    }

    /// Keep the previous refresh token when the provider does not rotate it.
    pub fn merge_refresh(mut self, previous: &TokenSet) -> Self {
        if self.refresh_token.is_none() {
            self.refresh_token = previous.refresh_token.clone();
        }
        self
    }
}

/// `application/x-www-form-urlencoded` body.
pub fn form_body(params: &[(&str, &str)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn jwt_with(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
        format!("{}.{}.signature", header, payload)
    }

    #[test]
    fn test_account_from_id_token() {
        let token = jwt_with(json!({
            "preferred_username": "alice@domain.com",
            "email": "alice.other@domain.com",
            "name": "Alice"
        }));

        let account = Account::from_id_token(&token).unwrap();
        assert_eq!(account.username, "alice@domain.com");
        assert_eq!(account.name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_account_username_fallback() {
        let token = jwt_with(json!({ "preferred_username": "", "upn": "bob@domain.com" }));
        assert_eq!(Account::from_id_token(&token).unwrap().username, "bob@domain.com");
    }

    #[test]
    fn test_account_rejects_garbage() {
        assert!(Account::from_id_token("not-a-jwt").is_err());
        assert!(Account::from_id_token("a.!!!.c").is_err());
        assert!(Account::from_id_token(&jwt_with(json!({ "sub": "x" }))).is_err());
    }

    #[test]
    fn test_token_freshness() {
        let now = Utc::now();
        let response = TokenResponse {
            access_token: "at".to_string(),
            id_token: None,
            refresh_token: None,
            expires_in: 3600,
        };
        let tokens = TokenSet::from_response(&response, now);

        assert!(tokens.is_fresh(now));
        assert!(!tokens.is_fresh(now + Duration::seconds(3570)));
    }

    #[test]
    fn test_refresh_token_kept_when_not_rotated() {
        let now = Utc::now();
        let previous = TokenSet {
            access_token: "old".to_string(),
            refresh_token: Some("rt".to_string()),
            expires_at: now,
        };
        let refreshed = TokenSet {
            access_token: "new".to_string(),
            refresh_token: None,
            expires_at: now + Duration::hours(1),
        }
        .merge_refresh(&previous);

        assert_eq!(refreshed.access_token, "new");
        assert_eq!(refreshed.refresh_token.as_deref(), Some("rt"));
    }

    #[test]
    fn test_form_body_encodes_values() {
        assert_eq!(
            form_body(&[("scope", "openid profile"), ("redirect_uri", "http://x/?a=b")]),
            "scope=openid%20profile&redirect_uri=http%3A%2F%2Fx%2F%3Fa%3Db"
        );
    }
}
