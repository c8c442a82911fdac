use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::response::{ApiResponse, Meta};

#[derive(Serialize, ToSchema)]
pub struct HealthData {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "OK", body = ApiResponse<HealthData>),
    ),
    tag = "Health"
)]
pub async fn health_check() -> Json<ApiResponse<HealthData>> {
    let data = HealthData {
        status: "ok".to_string(),
    };

    Json(ApiResponse::success(
        "Health check",
        data,
        Some(Meta::empty()),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Welcome message", body = ApiResponse<serde_json::Value>)),
    tag = "Health"
)]
pub async fn home() -> Json<ApiResponse<serde_json::Value>> {
    Json(ApiResponse::single(
        "Welcome to the Barnacle Rugs API",
        serde_json::json!({ "docs": "/docs" }),
    ))
}
