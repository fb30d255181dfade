//! Authentication middleware layer for protecting routes.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::ApiError;
use crate::AppState;

use super::types::AuthError;

/// Middleware function that requires a valid bearer token.
///
/// On success the request carries an [`super::Authenticated`] extension for
/// later layers and handlers. Use with `axum::middleware::from_fn_with_state`.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(token) = extract_token_from_header(request.headers()) else {
        tracing::debug!(uri = %request.uri(), "Request without bearer token");
        return ApiError::from(AuthError::MissingToken).into_response();
    };

    match state.validator.validate(&token).await {
        Ok(identity) => {
            tracing::debug!(
                name = identity.name().unwrap_or("unknown"),
                "Token valid"
            );
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(err) => {
            tracing::warn!("Auth failed: {}", err);
            ApiError::from(err).into_response()
        }
    }
}

fn extract_token_from_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| t.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_token_from_header(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_token_from_header(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_token_from_header(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(
            extract_token_from_header(&headers).as_deref(),
            Some("abc.def.ghi")
        );
    }
}
