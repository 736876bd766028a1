//! Admin API pass-through
//!
//! Most handlers forward to the gateway's `/admin/*` endpoint with the
//! configured bearer token and return the gateway's JSON unchanged. The
//! section handlers (cache, rate limits, security) read `/admin/config`,
//! merge the update into one section and post the whole document back.

use axum::{extract::State, response::Json};
use serde_json::{json, Map, Value};
use tracing::info;

use crate::error::AppError;
use crate::handlers::ConsoleState;
use crate::stats::GatewayClient;

const CACHE_SECTION: &str = "cache";
const RATE_LIMITS_SECTION: &str = "rate_limits";
const SECURITY_SECTIONS: [&str; 2] = ["jwt", "security"];

/// GET /api/config
pub async fn get_config(State(state): State<ConsoleState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway().get_admin("config").await?))
}

/// POST /api/config
pub async fn update_config(
    State(state): State<ConsoleState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway().post_admin("config", Some(&body)).await?))
}

/// GET /api/routes
pub async fn get_routes(State(state): State<ConsoleState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway().get_admin("routes").await?))
}

/// POST /api/routes
pub async fn update_routes(
    State(state): State<ConsoleState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway().post_admin("routes", Some(&body)).await?))
}

/// GET /api/cache/stats
pub async fn get_cache_stats(State(state): State<ConsoleState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway().get_admin("cache/stats").await?))
}

/// POST /api/cache/clear
pub async fn clear_cache(State(state): State<ConsoleState>) -> Result<Json<Value>, AppError> {
    Ok(Json(state.gateway().post_admin("cache/clear", None).await?))
}

/// POST /api/ratelimit/reset
///
/// Body must name the limiter `key` to reset.
pub async fn reset_rate_limit(
    State(state): State<ConsoleState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let has_key = body
        .get("key")
        .is_some_and(|key| !key.is_null() && key.as_str() != Some(""));
    if !has_key {
        return Err(AppError::InvalidInput("Missing required field: key".to_string()));
    }

    Ok(Json(state.gateway().post_admin("ratelimit/reset", Some(&body)).await?))
}

/// GET /api/cache/config
pub async fn get_cache_config(State(state): State<ConsoleState>) -> Result<Json<Value>, AppError> {
    let config = current_config(&state.gateway()).await?;
    Ok(Json(json!({ CACHE_SECTION: section(&config, CACHE_SECTION) })))
}

/// POST /api/cache/config
pub async fn update_cache_config(
    State(state): State<ConsoleState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(merge_sections(&state.gateway(), &body, &[CACHE_SECTION]).await?))
}

/// GET /api/ratelimit/config
pub async fn get_rate_limit_config(
    State(state): State<ConsoleState>,
) -> Result<Json<Value>, AppError> {
    let config = current_config(&state.gateway()).await?;
    Ok(Json(json!({ RATE_LIMITS_SECTION: section(&config, RATE_LIMITS_SECTION) })))
}

/// POST /api/ratelimit/config
pub async fn update_rate_limit_config(
    State(state): State<ConsoleState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(merge_sections(&state.gateway(), &body, &[RATE_LIMITS_SECTION]).await?))
}

/// GET /api/security
///
/// Returns `{"config": {"jwt": .., "security": ..}}`.
pub async fn get_security_config(
    State(state): State<ConsoleState>,
) -> Result<Json<Value>, AppError> {
    let config = current_config(&state.gateway()).await?;
    let sections: Map<String, Value> = SECURITY_SECTIONS
        .iter()
        .map(|key| (key.to_string(), section(&config, key)))
        .collect();
    Ok(Json(json!({ "config": sections })))
}

/// POST /api/security
pub async fn update_security_config(
    State(state): State<ConsoleState>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, AppError> {
    Ok(Json(merge_sections(&state.gateway(), &body, &SECURITY_SECTIONS).await?))
}

/// The gateway's config document; `{}` when it reports none
async fn current_config(gateway: &GatewayClient) -> Result<Map<String, Value>, AppError> {
    let mut body = gateway.get_admin("config").await?;
    match body.get_mut("config").map(Value::take) {
        Some(Value::Object(config)) => Ok(config),
        _ => Ok(Map::new()),
    }
}

fn section(config: &Map<String, Value>, key: &str) -> Value {
    config
        .get(key)
        .filter(|value| value.is_object())
        .cloned()
        .unwrap_or_else(|| json!({}))
}

/// Read-modify-write of `/admin/config`
///
/// Each section named in `keys` that the body carries is shallow-merged
/// into the current document: keys in the update replace existing keys,
/// everything else is kept. Sections the body omits are left untouched.
async fn merge_sections(
    gateway: &GatewayClient,
    body: &Value,
    keys: &[&str],
) -> Result<Value, AppError> {
    let mut updates = Vec::with_capacity(keys.len());
    for key in keys {
        match body.get(*key) {
            None | Some(Value::Null) => {}
            Some(Value::Object(update)) => updates.push((*key, update)),
            Some(_) => {
                return Err(AppError::InvalidInput(format!(
                    "Field {} must be a JSON object",
                    key
                )))
            }
        }
    }

    let mut config = current_config(gateway).await?;
    for (key, update) in updates {
        let target = config
            .entry(key)
            .or_insert_with(|| Value::Object(Map::new()));
        if !target.is_object() {
            *target = Value::Object(Map::new());
        }
        if let Value::Object(existing) = target {
            existing.extend(update.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        info!(section = key, "Updating gateway config section");
    }

    gateway
        .post_admin("config", Some(&json!({ "config": config })))
        .await
}
