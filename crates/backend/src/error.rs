//! Unified error handling for the backend API.
//!
//! Handlers and middleware return `ApiError`; `IntoResponse` turns it into
//! the JSON `ErrorResponse` body with the matching status code. Domain
//! rejections do not go through here: they have their own plain-text body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain_policy::api::ErrorResponse;
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication required but not provided or invalid
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Signing keys could not be obtained from the identity provider
    #[error("Identity provider unavailable: {0}")]
    Unavailable(#[source] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken => ApiError::Unauthorized("Missing authentication".to_string()),
            AuthError::KeyFetch(e) => ApiError::Unavailable(e),
            AuthError::UnknownKey(_) | AuthError::Invalid(_) => {
                ApiError::Unauthorized("Invalid or expired token".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ApiError::Unavailable(e) => {
                tracing::error!("Signing key fetch failed: {:?}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Identity provider unavailable".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(error_message))).into_response()
    }
}
