// src/handlers/health.rs

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: &'static str,
    #[schema(example = "ok")]
    pub database: &'static str,
}

// GET /api/v1/health
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "Health",
    responses(
        (status = 200, description = "Aplicação e banco no ar", body = HealthResponse),
        (status = 503, description = "Banco de dados inacessível", body = HealthResponse)
    )
)]
pub async fn health(State(app_state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&app_state.db_pool)
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse { status: "ok", database: "ok" }),
        ),
        Err(e) => {
            tracing::error!("🔥 Health check sem banco de dados: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse { status: "degraded", database: "unavailable" }),
            )
        }
    }
}
