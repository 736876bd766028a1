use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use super::counters::GatewayCounters;
use crate::error::AppError;

/// Shared state of the mock gateway
#[derive(Clone)]
pub struct MockGatewayState {
    pub counters: Arc<GatewayCounters>,
    /// `/admin/*` is closed entirely when unset
    pub admin_token: Option<Arc<str>>,
    pub config: Arc<RwLock<Value>>,
}

impl MockGatewayState {
    pub fn new(counters: Arc<GatewayCounters>, admin_token: Option<String>) -> Self {
        Self {
            counters,
            admin_token: admin_token.map(Arc::from),
            config: Arc::new(RwLock::new(default_gateway_config())),
        }
    }
}

/// Configuration document served by `/admin/config` until replaced
pub fn default_gateway_config() -> Value {
    json!({
        "server": {
            "host": "0.0.0.0",
            "port": 8080,
            "threads": 4,
            "max_connections": 10000,
        },
        "routes": [
            {
                "path": "/api/auth/*",
                "backends": ["http://auth-service:8001"],
                "timeout_ms": 5000,
                "auth_required": false,
            },
            {
                "path": "/api/users/*",
                "backends": ["http://user-service:8002"],
                "timeout_ms": 5000,
                "auth_required": true,
            },
            {
                "path": "/api/orders/*",
                "backends": ["http://order-service:8003"],
                "timeout_ms": 10000,
                "auth_required": true,
            },
        ],
        "rate_limits": {
            "global": { "requests": 1000, "window": 60 },
            "per_ip": { "requests": 100, "window": 60 },
            "per_ip_connections": 10,
            "endpoints": {},
        },
        "jwt": {
            "algorithm": "HS256",
            "issuer": "api-gateway",
            "audience": "api-clients",
            "access_token_expiry": 900,
            "refresh_token_expiry": 604800,
        },
        "security": {
            "max_header_size": 8192,
            "allowed_methods": ["GET", "POST", "PUT", "DELETE", "PATCH", "OPTIONS"],
            "cors": { "enabled": true, "allowed_origins": ["*"] },
            "ip_whitelist": [],
            "ip_blacklist": [],
        },
        "cache": {
            "enabled": true,
            "max_size_mb": 100,
            "default_ttl_seconds": 300,
        },
    })
}

/// Router for the mock gateway: public `/health` and `/metrics`, token-guarded `/admin/*`
pub fn create_mock_router(state: MockGatewayState) -> Router {
    let admin_routes = Router::new()
        .route("/admin/config", get(get_config).post(update_config))
        .route("/admin/routes", get(get_routes).post(update_routes))
        .route("/admin/cache/stats", get(cache_stats))
        .route("/admin/cache/clear", post(clear_cache))
        .route("/admin/ratelimit/reset", post(reset_rate_limit))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin_token));

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .merge(admin_routes)
        .layer(middleware::from_fn_with_state(state.clone(), track_connection))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Bearer-token check for the admin API
async fn require_admin_token(
    State(state): State<MockGatewayState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let expected = state
        .admin_token
        .as_deref()
        .ok_or_else(|| {
            AppError::Unauthorized("Admin API disabled: no admin token configured".to_string())
        })?;

    let provided = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Missing Authorization header".to_string()))?
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Invalid Authorization header format".to_string()))?;

    if !bool::from(provided.as_bytes().ct_eq(expected.as_bytes())) {
        warn!(path = %request.uri().path(), "Rejected admin request with invalid token");
        return Err(AppError::Unauthorized("Invalid admin token".to_string()));
    }

    Ok(next.run(request).await)
}

/// Count each request as a connection while it is being served
async fn track_connection(
    State(state): State<MockGatewayState>,
    request: Request,
    next: Next,
) -> Response {
    state.counters.connection_opened();
    let response = next.run(request).await;
    state.counters.connection_closed();
    response
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy", "service": "mock-gateway" }))
}

async fn metrics(State(state): State<MockGatewayState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.counters.render(),
    )
}

async fn get_config(State(state): State<MockGatewayState>) -> Json<Value> {
    Json(json!({ "config": state.config.read().await.clone() }))
}

async fn update_config(
    State(state): State<MockGatewayState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    // Accept either `{"config": {...}}` or the bare document
    let new_config = match body {
        Value::Object(mut map) if map.contains_key("config") => {
            map.remove("config").unwrap_or(Value::Null)
        }
        other => other,
    };
    if !new_config.is_object() {
        return Err(AppError::InvalidInput("Config must be a JSON object".to_string()));
    }

    *state.config.write().await = new_config.clone();
    info!("Mock gateway config replaced");
    Ok(Json(json!({ "success": true, "config": new_config })))
}

async fn get_routes(State(state): State<MockGatewayState>) -> Json<Value> {
    let routes = state.config.read().await.get("routes").cloned().unwrap_or_else(|| json!([]));
    Json(json!({ "routes": routes }))
}

async fn update_routes(
    State(state): State<MockGatewayState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let routes = body
        .get("routes")
        .filter(|routes| routes.is_array())
        .cloned()
        .ok_or_else(|| AppError::InvalidInput("Missing required field: routes".to_string()))?;

    let mut config = state.config.write().await;
    if let Value::Object(map) = &mut *config {
        map.insert("routes".to_string(), routes.clone());
    }
    Ok(Json(json!({ "success": true, "routes": routes })))
}

async fn cache_stats(State(state): State<MockGatewayState>) -> Json<Value> {
    let (hits, misses) = state.counters.cache_totals();
    let lookups = hits + misses;
    let hit_rate = if lookups == 0 { 0.0 } else { hits as f64 / lookups as f64 };
    Json(json!({
        // Every miss populates one entry
        "total_entries": misses,
        "total_hits": hits,
        "total_misses": misses,
        "hit_rate": hit_rate,
        "memory_usage": misses * 1024,
        "evictions": 0,
    }))
}

async fn clear_cache(State(state): State<MockGatewayState>) -> Json<Value> {
    state.counters.reset_cache();
    info!("Mock gateway cache cleared");
    Json(json!({ "success": true, "cleared": true }))
}

async fn reset_rate_limit(
    State(state): State<MockGatewayState>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.counters.reset_rate_limits();
    let key = body.get("key").cloned().unwrap_or(Value::Null);
    info!(key = %key, "Mock gateway rate limit reset");
    Json(json!({ "success": true, "reset": true, "key": key }))
}
