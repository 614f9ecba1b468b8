// src/handlers/production.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermProductionRead, PermProductionWrite, RequirePermission},
    },
    models::production::{
        BatchStatus, IngredientRequirement, ProductionBatch, ProductionBatchDetail,
    },
    services::production_service::BatchLineInput,
};

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchLinePayload {
    pub dish_id: Uuid,

    #[validate(range(min = 1, max = 100_000, message = "out_of_range"))]
    #[schema(example = 40)]
    pub portions: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchPayload {
    #[schema(value_type = String, format = Date, example = "2026-10-16")]
    pub production_date: NaiveDate,

    pub notes: Option<String>,

    #[validate(length(min = 1, message = "required"), nested)]
    pub items: Vec<BatchLinePayload>,
}

#[derive(Debug, Deserialize)]
pub struct BatchListQuery {
    pub status: Option<BatchStatus>,
}

// POST /api/v1/production/batches
#[utoipa::path(
    post,
    path = "/api/v1/production/batches",
    tag = "Production",
    request_body = CreateBatchPayload,
    responses(
        (status = 201, description = "Lote planejado com a necessidade de ingredientes", body = ProductionBatchDetail),
        (status = 400, description = "Prato repetido no lote")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_batch(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProductionWrite>,
    Json(payload): Json<CreateBatchPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lines = payload
        .items
        .iter()
        .map(|l| BatchLineInput {
            dish_id: l.dish_id,
            portions: l.portions,
        })
        .collect();

    let batch = app_state
        .production_service
        .create_batch(payload.production_date, payload.notes.as_deref(), lines)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(batch)))
}

// GET /api/v1/production/batches?status=PLANNED
#[utoipa::path(
    get,
    path = "/api/v1/production/batches",
    tag = "Production",
    params(("status" = Option<BatchStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Lotes", body = Vec<ProductionBatch>)),
    security(("api_jwt" = []))
)]
pub async fn list_batches(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProductionRead>,
    Query(query): Query<BatchListQuery>,
) -> Result<Json<Vec<ProductionBatch>>, ApiError> {
    let batches = app_state
        .production_service
        .list_batches(query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(batches))
}

// GET /api/v1/production/batches/{id}
#[utoipa::path(
    get,
    path = "/api/v1/production/batches/{id}",
    tag = "Production",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses((status = 200, description = "Lote com pratos e necessidade de ingredientes", body = ProductionBatchDetail)),
    security(("api_jwt" = []))
)]
pub async fn get_batch(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProductionRead>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductionBatchDetail>, ApiError> {
    let batch = app_state
        .production_service
        .get_batch(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(batch))
}

// GET /api/v1/production/batches/{id}/requirements
#[utoipa::path(
    get,
    path = "/api/v1/production/batches/{id}/requirements",
    tag = "Production",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses((status = 200, description = "Quantidade de cada ingrediente", body = Vec<IngredientRequirement>)),
    security(("api_jwt" = []))
)]
pub async fn batch_requirements(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProductionRead>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<IngredientRequirement>>, ApiError> {
    let requirements = app_state
        .production_service
        .requirements(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(requirements))
}

// POST /api/v1/production/batches/{id}/complete
#[utoipa::path(
    post,
    path = "/api/v1/production/batches/{id}/complete",
    tag = "Production",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses(
        (status = 200, description = "Lote concluído com baixa no estoque", body = ProductionBatchDetail),
        (status = 409, description = "Lote cancelado"),
        (status = 422, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn complete_batch(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermProductionWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductionBatchDetail>, ApiError> {
    let batch = app_state
        .production_service
        .complete_batch(id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(batch))
}

// POST /api/v1/production/batches/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/v1/production/batches/{id}/cancel",
    tag = "Production",
    params(("id" = Uuid, Path, description = "ID do lote")),
    responses((status = 200, description = "Lote cancelado", body = ProductionBatch)),
    security(("api_jwt" = []))
)]
pub async fn cancel_batch(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProductionWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductionBatch>, ApiError> {
    let batch = app_state
        .production_service
        .cancel_batch(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(batch))
}
