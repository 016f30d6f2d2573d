//! HTTP routes.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use gamefindr_domain::Profile;

use crate::app::App;
use crate::use_cases::LookupError;

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/profile", post(lookup_profile))
}

async fn health() -> &'static str {
    "OK"
}

#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub platform: String,
}

async fn lookup_profile(
    State(app): State<Arc<App>>,
    Json(request): Json<ProfileRequest>,
) -> Result<Json<Profile>, ApiError> {
    let profile = app
        .gateway
        .lookup(&request.username, &request.platform)
        .await?;
    Ok(Json(profile))
}

/// Wire error envelope: `{ "message": "..." }`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    BadGateway(String),
}

impl From<LookupError> for ApiError {
    fn from(err: LookupError) -> Self {
        // LookupError display strings are already sanitized for external
        // callers; the upstream detail never leaves the logs.
        match &err {
            LookupError::InvalidRequest | LookupError::UnsupportedPlatform(_) => {
                ApiError::BadRequest(err.to_string())
            }
            LookupError::NotFound(_) => ApiError::NotFound(err.to_string()),
            LookupError::Upstream { .. } => ApiError::BadGateway(err.to_string()),
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(message) => (axum::http::StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (axum::http::StatusCode::NOT_FOUND, message),
            ApiError::BadGateway(message) => (axum::http::StatusCode::BAD_GATEWAY, message),
        };
        (status, Json(ErrorBody { message })).into_response()
    }
}
