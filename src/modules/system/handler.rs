use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    pub ok: bool,
    pub service: String,
    pub health: String,
    pub mix: String,
    pub docs: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub ok: bool,
}

/// Service index
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Service index", body = ServiceInfo)),
    tag = "System"
)]
pub async fn root() -> impl IntoResponse {
    Json(ServiceInfo {
        ok: true,
        service: "audio-mixer".to_string(),
        health: "/health".to_string(),
        mix: "/mix".to_string(),
        docs: "/docs".to_string(),
    })
}

/// Probes from load balancers use HEAD.
pub async fn root_head() -> impl IntoResponse {
    StatusCode::OK
}

/// Liveness check
#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "System"
)]
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { ok: true })
}
