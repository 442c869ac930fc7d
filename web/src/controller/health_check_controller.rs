use crate::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Always "ok" while the router is serving requests
    #[schema(example = "ok")]
    pub status: String,
    /// The configured runtime environment name
    #[schema(example = "development")]
    pub env: String,
}

impl HealthResponse {
    pub fn ok(env: impl Into<String>) -> Self {
        Self {
            status: "ok".to_string(),
            env: env.into(),
        }
    }
}

/// GET the router's health and the environment it runs in
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API router is up and responding to requests", body = HealthResponse),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "health"
)]
pub async fn health_check(State(app_state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse::ok(app_state.config.runtime_env().to_string())),
    )
}
