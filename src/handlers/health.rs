use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::handlers::ConsoleState;

/// Health check endpoint
/// Returns 200 OK if the console is running
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({
        "status": "healthy",
        "service": "gateway-console",
        "version": env!("CARGO_PKG_VERSION"),
    })))
}

/// Readiness check endpoint
/// Returns 200 OK only when the gateway's metrics endpoint answers
pub async fn readiness_check(State(state): State<ConsoleState>) -> impl IntoResponse {
    let gateway = state.gateway();
    match gateway.fetch_metrics().await {
        Ok(_) => (StatusCode::OK, Json(json!({
            "status": "ready",
            "service": "gateway-console",
            "gateway": gateway.base_url(),
        }))),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, Json(json!({
            "status": "not_ready",
            "service": "gateway-console",
            "gateway": gateway.base_url(),
            "reason": e.to_string(),
        }))),
    }
}
