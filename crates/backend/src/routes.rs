use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use domain_policy::api::PING_PATH;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::{auth, gate, handlers, AppState};

/// Put `router` behind bearer authentication and the domain gate.
///
/// Layers run outermost-last-added, so authentication always precedes the gate.
pub fn protect(router: Router<AppState>, state: &AppState) -> Router<AppState> {
    router
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            gate::restrict_domain,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
}

pub fn api_routes(state: &AppState) -> Router<AppState> {
    let protected = protect(Router::new().route(PING_PATH, get(handlers::ping)), state);

    Router::new()
        .route("/health", get(handlers::health_check))
        .merge(protected)
}

pub fn build_app(state: AppState, config: &AppConfig) -> Router {
    let app = api_routes(&state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors_layer(&config.cors_allowed_origins))
        .with_state(state);

    // Serve static frontend files if the directory exists
    if config.frontend_dir.exists() {
        tracing::info!("Serving frontend from {}", config.frontend_dir.display());
        let index_path = config.frontend_dir.join("index.html");
        let serve_dir =
            ServeDir::new(&config.frontend_dir).not_found_service(ServeFile::new(index_path));
        app.fallback_service(serve_dir)
    } else {
        tracing::info!(
            "Frontend directory not found at {}, serving API only",
            config.frontend_dir.display()
        );
        app
    }
}

/// CORS for the configured frontend origins, with credentials.
///
/// Falls back to permissive CORS when no valid origin is configured.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|s| s.trim().parse().ok())
        .collect();

    if origins.is_empty() {
        tracing::warn!(
            "CORS_ALLOWED_ORIGINS is empty, using permissive CORS (not recommended for production)"
        );
        return CorsLayer::permissive();
    }

    tracing::info!("CORS configured for origins: {:?}", origins);
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}
