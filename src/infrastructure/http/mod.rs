use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::controllers::{generate::GenerateController, health};
use crate::domain::quota::QuotaStore;
use crate::infrastructure::config::Config;
use crate::infrastructure::middleware::{quota_middleware, request_id_middleware};

/// Build the application router. The /v1 subtree carries the quota gate;
/// health and root endpoints bypass it entirely.
pub fn build_router(
    config: Arc<Config>,
    quota_store: Arc<QuotaStore>,
    generate_controller: Arc<GenerateController>,
) -> Router {
    let generate_routes = Router::new()
        .route("/v1/generate", post(GenerateController::generate))
        .with_state(generate_controller)
        .layer(middleware::from_fn_with_state(
            (quota_store, config.clone()),
            quota_middleware,
        ));

    Router::new()
        .route("/", get(health::root))
        .route("/health", get(health::health))
        .with_state(config.clone())
        .merge(generate_routes)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Start the HTTP server, shutting down on ctrl-c
pub async fn start_http_server(
    config: Arc<Config>,
    quota_store: Arc<QuotaStore>,
    generate_controller: Arc<GenerateController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(config.clone(), quota_store, generate_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
