//! HTTP API for the fenestra window catalog.
//!
//! Routing, extraction, and response shaping live here; domain logic stays in
//! the core, db, and vision crates. The repository and analyzer are
//! constructed once at startup and injected through [`AppState`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::error;

use fenestra_core::defaults::{self, ENV_ALLOWED_ORIGINS};
use fenestra_db::Database;
use fenestra_vision::WindowAnalyzer;

pub mod handlers;
pub mod query_types;

use handlers::windows::{get_window, get_window_duplicates, list_windows, upload_window};

/// Transport-layer body cap. Deliberately far above the application's upload
/// cap so oversize uploads reach validation and get a 400, not a bare 413.
const BODY_LIMIT_BYTES: usize = 32 * 1024 * 1024;

/// Runtime configuration resolved once at startup.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Directory holding stored upload files.
    pub upload_dir: PathBuf,
    /// Base URL prefixed onto stored filenames to form image URLs.
    pub public_base_url: String,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl ApiConfig {
    /// Resolve from environment variables, falling back to built-in defaults.
    pub fn from_env() -> Self {
        Self {
            upload_dir: PathBuf::from(
                std::env::var(defaults::ENV_UPLOAD_DIR)
                    .unwrap_or_else(|_| defaults::UPLOAD_DIR.to_string()),
            ),
            public_base_url: std::env::var(defaults::ENV_PUBLIC_BASE_URL)
                .unwrap_or_else(|_| defaults::PUBLIC_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            max_upload_bytes: std::env::var(defaults::ENV_MAX_UPLOAD_BYTES)
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults::MAX_UPLOAD_BYTES),
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub analyzer: Arc<WindowAnalyzer>,
    pub config: Arc<ApiConfig>,
}

/// API error taxonomy mapped onto HTTP statuses.
#[derive(Debug)]
pub enum ApiError {
    /// Storage or other internal failure. Logged in full, answered opaquely.
    Internal(fenestra_core::Error),
    NotFound(String),
    BadRequest(String),
}

impl From<fenestra_core::Error> for ApiError {
    fn from(err: fenestra_core::Error) -> Self {
        match &err {
            fenestra_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            fenestra_core::Error::WindowNotFound(id) => {
                ApiError::NotFound(format!("Window not found: {}", id))
            }
            fenestra_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            _ => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => {
                // Connection strings and driver details stay out of the body.
                error!(subsystem = "api", error = %err, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}

/// Liveness probe.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
    }))
}

/// Parse allowed origins from the comma-separated `ALLOWED_ORIGINS` variable.
///
/// Unparsable entries are skipped with a warning; an unset or empty variable
/// falls back to the local frontend origins.
pub fn parse_allowed_origins() -> Vec<HeaderValue> {
    let origins_str = std::env::var(ENV_ALLOWED_ORIGINS)
        .unwrap_or_else(|_| defaults::ALLOWED_ORIGINS.to_string());

    let origins: Vec<HeaderValue> = origins_str
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect();

    if origins.is_empty() {
        defaults::ALLOWED_ORIGINS
            .split(',')
            .filter_map(|s| s.parse().ok())
            .collect()
    } else {
        origins
    }
}

/// Build the application router over the given state.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(parse_allowed_origins())
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/windows", post(upload_window).get(list_windows))
        .route("/api/windows/:id", get(get_window))
        .route("/api/windows/:id/duplicates", get(get_window_duplicates))
        .route("/health", get(health_check))
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Validate that the upload directory can be written, read, and cleaned up.
///
/// Performs a full round trip at startup so filesystem problems (permissions,
/// missing mounts) surface before the first upload.
pub async fn validate_upload_dir(dir: &Path) -> std::result::Result<(), String> {
    let test_file = dir.join(".health-check");

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| format!("create_dir_all({:?}): {}", dir, e))?;

    let data = b"storage-health-check";
    tokio::fs::write(&test_file, data)
        .await
        .map_err(|e| format!("write({:?}): {}", test_file, e))?;

    let read_back = tokio::fs::read(&test_file)
        .await
        .map_err(|e| format!("read({:?}): {}", test_file, e))?;
    if read_back != data {
        return Err("read-back mismatch".to_string());
    }

    tokio::fs::remove_file(&test_file)
        .await
        .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_from_invalid_input() {
        let err: ApiError = fenestra_core::Error::InvalidInput("bad upload".to_string()).into();
        match err {
            ApiError::BadRequest(msg) => assert_eq!(msg, "bad upload"),
            _ => panic!("Expected BadRequest"),
        }
    }

    #[test]
    fn test_api_error_from_window_not_found() {
        let id = uuid::Uuid::nil();
        let err: ApiError = fenestra_core::Error::WindowNotFound(id).into();
        match err {
            ApiError::NotFound(msg) => assert!(msg.contains(&id.to_string())),
            _ => panic!("Expected NotFound"),
        }
    }

    #[test]
    fn test_api_error_internal_is_opaque() {
        let err: ApiError =
            fenestra_core::Error::Internal("postgres://secret@host".to_string()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_validate_upload_dir_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        validate_upload_dir(dir.path()).await.unwrap();
        // The probe file is cleaned up.
        assert!(!dir.path().join(".health-check").exists());
    }
}
