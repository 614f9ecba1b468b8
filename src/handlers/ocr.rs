// src/handlers/ocr.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermOcrWrite, RequirePermission},
    },
    models::ocr::{LabelStatus, NutritionLabel},
    services::ocr_service::LabelSubmission,
};

// Ou o texto do rótulo, ou a imagem em base64
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitLabelPayload {
    #[schema(example = "Porção de 30 g\nValor energético 120 kcal\nProteínas 4,2 g")]
    pub text: Option<String>,

    pub image_base64: Option<String>,

    #[validate(length(max = 60, message = "too_long"))]
    #[schema(example = "image/jpeg")]
    pub content_type: Option<String>,

    pub ingredient_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyLabelPayload {
    // Sem ingrediente aqui, vale o informado no envio do rótulo
    pub ingredient_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct LabelListQuery {
    pub status: Option<LabelStatus>,
}

// POST /api/v1/ocr/labels
#[utoipa::path(
    post,
    path = "/api/v1/ocr/labels",
    tag = "OCR",
    request_body = SubmitLabelPayload,
    responses(
        (status = 201, description = "Rótulo interpretado e aguardando revisão", body = NutritionLabel),
        (status = 400, description = "Sem texto nem imagem, ou base64 inválido"),
        (status = 502, description = "Falha no serviço de OCR"),
        (status = 503, description = "OCR de imagens desabilitado")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_label(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermOcrWrite>,
    Json(payload): Json<SubmitLabelPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let submission = LabelSubmission {
        text: payload.text,
        image_base64: payload.image_base64,
        content_type: payload.content_type,
        ingredient_id: payload.ingredient_id,
    };

    let label = app_state
        .ocr_service
        .submit(submission, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(label)))
}

// GET /api/v1/ocr/labels?status=PENDING_REVIEW
#[utoipa::path(
    get,
    path = "/api/v1/ocr/labels",
    tag = "OCR",
    params(("status" = Option<LabelStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Rótulos enviados", body = Vec<NutritionLabel>)),
    security(("api_jwt" = []))
)]
pub async fn list_labels(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOcrWrite>,
    Query(query): Query<LabelListQuery>,
) -> Result<Json<Vec<NutritionLabel>>, ApiError> {
    let labels = app_state
        .ocr_service
        .list(query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(labels))
}

// GET /api/v1/ocr/labels/{id}
#[utoipa::path(
    get,
    path = "/api/v1/ocr/labels/{id}",
    tag = "OCR",
    params(("id" = Uuid, Path, description = "ID do rótulo")),
    responses((status = 200, description = "Rótulo", body = NutritionLabel)),
    security(("api_jwt" = []))
)]
pub async fn get_label(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOcrWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<NutritionLabel>, ApiError> {
    let label = app_state
        .ocr_service
        .get(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(label))
}

// POST /api/v1/ocr/labels/{id}/apply
#[utoipa::path(
    post,
    path = "/api/v1/ocr/labels/{id}/apply",
    tag = "OCR",
    request_body = ApplyLabelPayload,
    params(("id" = Uuid, Path, description = "ID do rótulo")),
    responses(
        (status = 200, description = "Valores gravados no ingrediente", body = NutritionLabel),
        (status = 409, description = "Rótulo já aplicado ou rejeitado"),
        (status = 422, description = "Rótulo sem ingrediente ou sem valores")
    ),
    security(("api_jwt" = []))
)]
pub async fn apply_label(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOcrWrite>,
    Path(id): Path<Uuid>,
    payload: Option<Json<ApplyLabelPayload>>,
) -> Result<Json<NutritionLabel>, ApiError> {
    let ingredient_id = payload.and_then(|Json(p)| p.ingredient_id);
    let label = app_state
        .ocr_service
        .apply(id, ingredient_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(label))
}

// POST /api/v1/ocr/labels/{id}/reject
#[utoipa::path(
    post,
    path = "/api/v1/ocr/labels/{id}/reject",
    tag = "OCR",
    params(("id" = Uuid, Path, description = "ID do rótulo")),
    responses((status = 200, description = "Rótulo rejeitado", body = NutritionLabel)),
    security(("api_jwt" = []))
)]
pub async fn reject_label(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOcrWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<NutritionLabel>, ApiError> {
    let label = app_state
        .ocr_service
        .reject(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(label))
}
