use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::domain::quota::QuotaStore;
use crate::error::AppError;
use crate::infrastructure::config::Config;

/// Shorter bearer tokens are not honored as device ids
const MIN_TOKEN_LENGTH: usize = 8;

/// Quota gate for metered routes. The bearer token is an opaque rate-limiting
/// key, not an authenticated identity. Routing decides which paths are
/// metered; this middleware is only layered onto the protected subtree.
///
/// Usage is checked before the handler runs and recorded only after a 2xx
/// outcome, so rejected or failed requests never consume quota. The in-memory
/// store is infallible; any future fallible store must keep the gate's
/// fail-open posture (availability over strictness).
pub async fn quota_middleware(
    State((store, config)): State<(Arc<QuotaStore>, Arc<Config>)>,
    request: Request,
    next: Next,
) -> Response {
    let Some(device_id) = extract_device_token(&request) else {
        if config.require_device_token {
            return AppError::Unauthorized(
                "Missing or malformed device token".to_string(),
            )
            .into_response();
        }
        // Development posture: unidentified callers pass through unmetered
        tracing::warn!("Request without device token, allowing unmetered");
        return next.run(request).await;
    };

    let limit = config.daily_free_limit;

    if !store.can_use(&device_id, limit).await {
        let usage = store.get_usage(&device_id).await;
        let reset_at = store.get_reset_time(&device_id).await;

        tracing::info!(
            device = %device_prefix(&device_id),
            usage,
            limit,
            "Quota exceeded"
        );

        return AppError::QuotaExceeded {
            usage,
            limit,
            reset_at,
        }
        .into_response();
    }

    let mut response = next.run(request).await;

    // Only successful downstream outcomes consume quota
    if response.status().is_success() {
        let new_usage = store.increment_usage(&device_id).await;
        let remaining = limit.saturating_sub(new_usage);
        let reset_at = store.get_reset_time(&device_id).await;

        let headers = response.headers_mut();
        insert_header(headers, "X-RateLimit-Limit", &limit.to_string());
        insert_header(headers, "X-RateLimit-Remaining", &remaining.to_string());
        insert_header(headers, "X-RateLimit-Reset", &reset_at.timestamp().to_string());

        tracing::debug!(
            device = %device_prefix(&device_id),
            usage = new_usage,
            limit,
            "Request metered"
        );
    }

    response
}

fn extract_device_token(request: &Request) -> Option<String> {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?;

    if token.len() < MIN_TOKEN_LENGTH {
        return None;
    }

    Some(token.to_string())
}

fn insert_header(headers: &mut axum::http::HeaderMap, name: &'static str, value: &str) {
    if let Ok(header_value) = HeaderValue::from_str(value) {
        headers.insert(name, header_value);
    }
}

fn device_prefix(device_id: &str) -> String {
    device_id.chars().take(8).collect()
}
