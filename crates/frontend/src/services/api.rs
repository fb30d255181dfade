use domain_policy::api::PING_PATH;
use gloo_net::http::Request;

use crate::auth::session;
use crate::config;

pub struct ApiService;

impl ApiService {
    /// Call the protected ping endpoint with the signed-in user's token.
    ///
    /// Without a usable token the request still goes out unauthenticated and
    /// the backend's 401 is reported as the error.
    pub async fn ping() -> Result<String, String> {
        let url = config::api_url(PING_PATH);

        let mut request = Request::get(&url);
        match session::acquire_token().await {
            Ok(token) => {
                request = request.header("Authorization", &format!("Bearer {}", token));
                tracing::debug!("Authorization header set");
            }
            Err(e) => tracing::error!("Token error: {}", e),
        }

        let response = request
            .send()
            .await
            .map_err(|e| format!("Request failed: {:?}", e))?;

        if !response.ok() {
            let body = response.text().await.unwrap_or_default();
            return Err(format!("HTTP error: {} {}", response.status(), body));
        }

        response
            .text()
            .await
            .map_err(|e| format!("Failed to read response: {:?}", e))
    }
}
