use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod auth;
mod config;
mod error;
mod gate;
mod handlers;
mod routes;

use crate::auth::TokenValidator;
use crate::config::AppConfig;
use crate::gate::DomainGate;

/// Shared, immutable per-process state.
#[derive(Clone)]
pub struct AppState {
    pub validator: Arc<TokenValidator>,
    pub gate: Arc<DomainGate>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "backend=debug,domain_policy=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::parse();

    tracing::info!("Starting backend server");

    let state = AppState {
        validator: Arc::new(TokenValidator::from_settings(config.key_settings()?)?),
        gate: Arc::new(DomainGate::from_config(&config)),
    };

    let app = routes::build_app(state, &config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
