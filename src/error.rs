use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Authentication error
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// Malformed request from the console client
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Gateway answered with a non-success status
    #[error("Upstream error ({status}): {message}")]
    UpstreamError { status: StatusCode, message: String },
    /// Internal server error
    #[error("Internal error: {0}")]
    InternalError(String),
    /// Gateway could not be reached
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            Self::ConfigError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            Self::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::UpstreamError { status, message } => (*status, message.clone()),
            Self::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            Self::HttpRequest(err) if err.is_timeout() => (
                StatusCode::GATEWAY_TIMEOUT,
                format!("Gateway request timed out: {}", err),
            ),
            Self::HttpRequest(err) => (
                StatusCode::BAD_GATEWAY,
                format!("Failed to connect to gateway: {}", err),
            ),
        };

        let body = Json(json!({
            "error": {
                "message": error_message,
                "type": error_type_name(&self),
            }
        }));

        (status, body).into_response()
    }
}

fn error_type_name(error: &AppError) -> &'static str {
    match error {
        AppError::ConfigError(_) => "config_error",
        AppError::Unauthorized(_) => "unauthorized",
        AppError::InvalidInput(_) => "invalid_input",
        AppError::UpstreamError { .. } => "upstream_error",
        AppError::InternalError(_) => "internal_error",
        AppError::HttpRequest(_) => "http_request_error",
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidInput(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppError::ConfigError("Admin token not configured".to_string());
        assert_eq!(
            error.to_string(),
            "Configuration error: Admin token not configured"
        );

        let error = AppError::UpstreamError {
            status: StatusCode::NOT_FOUND,
            message: "Gateway error: nope".to_string(),
        };
        assert_eq!(error.to_string(), "Upstream error (404 Not Found): Gateway error: nope");
    }

    #[test]
    fn test_error_type_name() {
        assert_eq!(error_type_name(&AppError::Unauthorized("test".to_string())), "unauthorized");
        assert_eq!(
            error_type_name(&AppError::InvalidInput("test".to_string())),
            "invalid_input"
        );
    }

    #[tokio::test]
    async fn test_error_response_keeps_upstream_status() {
        let error = AppError::UpstreamError {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "Gateway error: down".to_string(),
        };
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["message"], "Gateway error: down");
        assert_eq!(json["error"]["type"], "upstream_error");
    }

    #[tokio::test]
    async fn test_missing_token_is_server_error() {
        let response =
            AppError::ConfigError("Admin token not configured".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
