use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponseDto {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Service liveness
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponseDto),
    ),
    tag = "health"
)]
pub async fn health_check() -> Json<HealthResponseDto> {
    Json(HealthResponseDto {
        status: "ok".to_string(),
        message: format!("{} is running", env!("CARGO_PKG_NAME")),
        timestamp: Utc::now(),
    })
}
