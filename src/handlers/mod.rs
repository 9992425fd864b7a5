//! # API Handlers
//!
//! HTTP endpoint handlers of the ONG backend.

pub mod auth;
pub mod form;
pub mod types;
pub mod users;

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db;
use crate::models::ServiceInfo;
use crate::server::AppState;

/// Liveness report
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "ok")]
    pub status: String,
}

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Health probe backed by a database round trip
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service and database reachable", body = HealthStatus),
        (status = 503, description = "Database unreachable", body = HealthStatus)
    ),
    tag = "root"
)]
pub async fn healthz(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    match db::health_check(&state.db).await {
        Ok(()) => (
            StatusCode::OK,
            Json(HealthStatus {
                status: "ok".to_string(),
            }),
        ),
        Err(err) => {
            tracing::warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthStatus {
                    status: "unavailable".to_string(),
                }),
            )
        }
    }
}
