//! Sign-in with the identity provider (authorization code + PKCE) and the
//! locally cached session.

pub mod pkce;
pub mod session;
pub mod token;

use thiserror::Error;

pub use token::Account;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("not signed in")]
    LoginRequired,

    #[error("sign-in response does not match this browser session")]
    StateMismatch,

    #[error("identity provider returned an error: {0}")]
    Provider(String),

    #[error("token endpoint returned {status}: {body}")]
    TokenEndpoint { status: u16, body: String },

    #[error("ID token could not be read")]
    InvalidIdToken,

    #[error("request failed: {0}")]
    Request(String),

    #[error("browser storage unavailable: {0}")]
    Storage(String),
}
