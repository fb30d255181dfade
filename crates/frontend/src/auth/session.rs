use chrono::Utc;
use gloo::storage::{LocalStorage, SessionStorage, Storage};
use gloo_net::http::Request;
use web_sys::UrlSearchParams;

use super::pkce::{self, PkcePair};
use super::token::{form_body, Account, TokenResponse, TokenSet};
use super::SessionError;
use crate::config;

const ACCOUNT_KEY: &str = "domain_gate.account";
const TOKENS_KEY: &str = "domain_gate.tokens";
const VERIFIER_KEY: &str = "domain_gate.pkce_verifier";
const STATE_KEY: &str = "domain_gate.auth_state";

fn login_scopes() -> String {
    format!("openid profile offline_access {}", config::api_scope())
}

/// Cached accounts; at most one.
pub fn all_accounts() -> Vec<Account> {
    LocalStorage::get::<Account>(ACCOUNT_KEY)
        .ok()
        .into_iter()
        .collect()
}

fn store_session(account: &Account, tokens: &TokenSet) -> Result<(), SessionError> {
    LocalStorage::set(ACCOUNT_KEY, account).map_err(|e| SessionError::Storage(e.to_string()))?;
    LocalStorage::set(TOKENS_KEY, tokens).map_err(|e| SessionError::Storage(e.to_string()))
}

/// Forget every trace of the session in this browser.
pub fn clear_session() {
    LocalStorage::delete(ACCOUNT_KEY);
    LocalStorage::delete(TOKENS_KEY);
    SessionStorage::delete(VERIFIER_KEY);
    SessionStorage::delete(STATE_KEY);
}

fn navigate(url: &str) {
    if let Err(e) = gloo::utils::window().location().set_href(url) {
        tracing::error!("Navigation to identity provider failed: {:?}", e);
    }
}

/// Send the browser to the provider's sign-in page.
pub fn sign_in_redirect() -> Result<(), SessionError> {
    let pkce = PkcePair::generate();
    let state = pkce::new_state();

    SessionStorage::set(VERIFIER_KEY, &pkce.verifier)
        .map_err(|e| SessionError::Storage(e.to_string()))?;
    SessionStorage::set(STATE_KEY, &state).map_err(|e| SessionError::Storage(e.to_string()))?;

    let redirect_uri = config::redirect_uri();
    let scopes = login_scopes();
    let query = form_body(&[
        ("client_id", config::CLIENT_ID),
        ("response_type", "code"),
        ("redirect_uri", &redirect_uri),
        ("response_mode", "query"),
        ("scope", &scopes),
        ("state", &state),
        ("code_challenge", &pkce.challenge),
        ("code_challenge_method", "S256"),
    ]);

    navigate(&format!("{}?{}", config::endpoint("authorize"), query));
    Ok(())
}

/// Discard local state, then end the provider session.
pub fn sign_out_redirect() {
    clear_session();
    let query = form_body(&[("post_logout_redirect_uri", &config::redirect_uri())]);
    navigate(&format!("{}?{}", config::endpoint("logout"), query));
}

/// Complete a sign-in if the current URL is a provider redirect.
///
/// Returns the new account, or `None` when the page was not loaded from a
/// redirect. The query string is removed from the address bar either way.
pub async fn handle_redirect() -> Result<Option<Account>, SessionError> {
    let window = gloo::utils::window();
    let search = window.location().search().unwrap_or_default();
    if search.is_empty() {
        return Ok(None);
    }

    let params = UrlSearchParams::new_with_str(&search)
        .map_err(|e| SessionError::Request(format!("{:?}", e)))?;

    let code = params.get("code");
    let error = params.get("error");
    if code.is_none() && error.is_none() {
        return Ok(None);
    }

    clear_query_string();

    if let Some(error) = error {
        let description = params.get("error_description").unwrap_or_default();
        return Err(SessionError::Provider(format!("{} {}", error, description)));
    }

    let expected_state = SessionStorage::get::<String>(STATE_KEY).ok();
    let verifier = SessionStorage::get::<String>(VERIFIER_KEY).ok();
    SessionStorage::delete(STATE_KEY);
    SessionStorage::delete(VERIFIER_KEY);

    let (Some(expected_state), Some(verifier), Some(code)) = (expected_state, verifier, code)
    else {
        return Err(SessionError::StateMismatch);
    };
    if params.get("state").as_deref() != Some(expected_state.as_str()) {
        return Err(SessionError::StateMismatch);
    }

    let redirect_uri = config::redirect_uri();
    let scopes = login_scopes();
    let response = request_tokens(&[
        ("client_id", config::CLIENT_ID),
        ("grant_type", "authorization_code"),
        ("code", &code),
        ("redirect_uri", &redirect_uri),
        ("code_verifier", &verifier),
        ("scope", &scopes),
    ])
    .await?;

    let id_token = response
        .id_token
        .as_deref()
        .ok_or(SessionError::InvalidIdToken)?;
    let account = Account::from_id_token(id_token)?;
    store_session(&account, &TokenSet::from_response(&response, Utc::now()))?;

    tracing::info!(username = %account.username, "Signed in");
    Ok(Some(account))
}

fn clear_query_string() {
    let window = gloo::utils::window();
    let path = window.location().pathname().unwrap_or_else(|_| "/".to_string());
    if let Ok(history) = window.history() {
        let _ = history.replace_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(&path));
    }
}

/// Access token for the backend API, refreshed when close to expiry.
pub async fn acquire_token() -> Result<String, SessionError> {
    let tokens = LocalStorage::get::<TokenSet>(TOKENS_KEY)
        .map_err(|_| SessionError::LoginRequired)?;

    if tokens.is_fresh(Utc::now()) {
        return Ok(tokens.access_token);
    }

    let refresh_token = tokens
        .refresh_token
        .as_deref()
        .ok_or(SessionError::LoginRequired)?;

    let scopes = config::api_scope();
    let response = request_tokens(&[
        ("client_id", config::CLIENT_ID),
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
        ("scope", &scopes),
    ])
    .await?;

    let refreshed = TokenSet::from_response(&response, Utc::now()).merge_refresh(&tokens);
    LocalStorage::set(TOKENS_KEY, &refreshed).map_err(|e| SessionError::Storage(e.to_string()))?;

    tracing::debug!("Access token refreshed");
    Ok(refreshed.access_token)
}

async fn request_tokens(params: &[(&str, &str)]) -> Result<TokenResponse, SessionError> {
    let response = Request::post(&config::endpoint("token"))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body(form_body(params))
        .map_err(|e| SessionError::Request(format!("{:?}", e)))?
        .send()
        .await
        .map_err(|e| SessionError::Request(format!("{:?}", e)))?;

    if !response.ok() {
        return Err(SessionError::TokenEndpoint {
            status: response.status(),
            body: response.text().await.unwrap_or_default(),
        });
    }

    response
        .json()
        .await
        .map_err(|e| SessionError::Request(format!("Failed to parse token response: {:?}", e)))
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use chrono::Duration;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn sample_session() -> (Account, TokenSet) {
        (
            Account {
                username: "alice@domain.com".to_string(),
                name: Some("Alice".to_string()),
            },
            TokenSet {
                access_token: "access".to_string(),
                refresh_token: None,
                expires_at: Utc::now() + Duration::hours(1),
            },
        )
    }

    #[wasm_bindgen_test]
    async fn test_cached_token_is_reused() {
        let (account, tokens) = sample_session();
        store_session(&account, &tokens).unwrap();

        assert_eq!(all_accounts(), vec![account]);
        assert_eq!(acquire_token().await.unwrap(), "access");
        clear_session();
    }

    #[wasm_bindgen_test]
    async fn test_expired_without_refresh_requires_login() {
        let (account, mut tokens) = sample_session();
        tokens.expires_at = Utc::now() - Duration::minutes(5);
        store_session(&account, &tokens).unwrap();

        assert_eq!(acquire_token().await, Err(SessionError::LoginRequired));
        clear_session();
    }

    #[wasm_bindgen_test]
    fn test_clear_session_forgets_accounts() {
        let (account, tokens) = sample_session();
        store_session(&account, &tokens).unwrap();
        clear_session();

        assert!(all_accounts().is_empty());
    }
}
