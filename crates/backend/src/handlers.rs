use axum::{extract::State, http::StatusCode, Json};
use domain_policy::api::{DomainPolicyStatus, HealthResponse};

use crate::auth::Authenticated;
use crate::AppState;

/// Protected ping. Only reachable through `require_auth` and `restrict_domain`.
pub async fn ping(State(state): State<AppState>, identity: Authenticated) -> String {
    let user = match identity.name() {
        Some(name) => name.to_string(),
        None => state
            .gate
            .identify(&identity)
            .map(|id| id.into_inner())
            .unwrap_or_else(|| "unknown".to_string()),
    };

    format!("Pong from API! User: {}", user)
}

/// Liveness plus a check that the domain policy is usable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    if state.gate.policy().allowed_suffix().is_configured() {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
                domain_policy: DomainPolicyStatus::Configured,
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "misconfigured".to_string(),
                domain_policy: DomainPolicyStatus::Unconfigured,
            }),
        )
    }
}
