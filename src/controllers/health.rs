use axum::{extract::State, Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::infrastructure::config::Config;

/// GET / - Root endpoint
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Icebreaker API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - Health check endpoint
pub async fn health(State(config): State<Arc<Config>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "environment": config.environment,
    }))
}
