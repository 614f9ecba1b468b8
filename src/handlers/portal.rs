// src/handlers/portal.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        validation::validate_slug,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermPortalWrite, RequirePermission},
    },
    models::{
        catalog::MenuDayDetail,
        portal::{PortalPage, PublishedPage},
    },
};

// =============================================================================
//  1. ADMINISTRAÇÃO DAS PÁGINAS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePagePayload {
    #[validate(length(max = 80, message = "too_long"), custom(function = "validate_slug"))]
    #[schema(example = "quem-somos")]
    pub slug: String,

    #[validate(length(min = 1, max = 160, message = "required"))]
    #[schema(example = "Quem somos")]
    pub title: String,

    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePagePayload {
    #[validate(length(min = 1, max = 160, message = "required"))]
    pub title: Option<String>,
    pub body: Option<String>,
}

// POST /api/v1/portal/pages
#[utoipa::path(
    post,
    path = "/api/v1/portal/pages",
    tag = "Portal",
    request_body = CreatePagePayload,
    responses(
        (status = 201, description = "Página criada (ainda não publicada)", body = PortalPage),
        (status = 409, description = "Slug já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_page(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermPortalWrite>,
    Json(payload): Json<CreatePagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let page = app_state
        .portal_service
        .create_page(&payload.slug, &payload.title, &payload.body, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(page)))
}

// GET /api/v1/portal/pages
#[utoipa::path(
    get,
    path = "/api/v1/portal/pages",
    tag = "Portal",
    responses((status = 200, description = "Todas as páginas, publicadas ou não", body = Vec<PortalPage>)),
    security(("api_jwt" = []))
)]
pub async fn list_pages(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermPortalWrite>,
) -> Result<Json<Vec<PortalPage>>, ApiError> {
    let pages = app_state
        .portal_service
        .list_pages()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(pages))
}

// PATCH /api/v1/portal/pages/{id}
#[utoipa::path(
    patch,
    path = "/api/v1/portal/pages/{id}",
    tag = "Portal",
    request_body = UpdatePagePayload,
    params(("id" = Uuid, Path, description = "ID da página")),
    responses((status = 200, description = "Página atualizada", body = PortalPage)),
    security(("api_jwt" = []))
)]
pub async fn update_page(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermPortalWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePagePayload>,
) -> Result<Json<PortalPage>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let page = app_state
        .portal_service
        .update_page(id, payload.title.as_deref(), payload.body.as_deref(), user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(page))
}

// POST /api/v1/portal/pages/{id}/publish
#[utoipa::path(
    post,
    path = "/api/v1/portal/pages/{id}/publish",
    tag = "Portal",
    params(("id" = Uuid, Path, description = "ID da página")),
    responses((status = 200, description = "Página publicada", body = PortalPage)),
    security(("api_jwt" = []))
)]
pub async fn publish_page(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermPortalWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<PortalPage>, ApiError> {
    let page = app_state
        .portal_service
        .publish(id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(page))
}

// POST /api/v1/portal/pages/{id}/unpublish
#[utoipa::path(
    post,
    path = "/api/v1/portal/pages/{id}/unpublish",
    tag = "Portal",
    params(("id" = Uuid, Path, description = "ID da página")),
    responses((status = 200, description = "Página retirada do ar", body = PortalPage)),
    security(("api_jwt" = []))
)]
pub async fn unpublish_page(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermPortalWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<PortalPage>, ApiError> {
    let page = app_state
        .portal_service
        .unpublish(id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(page))
}

// =============================================================================
//  2. PORTAL PÚBLICO (sem autenticação)
// =============================================================================

// GET /api/v1/public/pages
#[utoipa::path(
    get,
    path = "/api/v1/public/pages",
    tag = "Public",
    responses((status = 200, description = "Páginas publicadas", body = Vec<PublishedPage>))
)]
pub async fn list_published(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<PublishedPage>>, ApiError> {
    let pages = app_state
        .portal_service
        .list_published()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(pages))
}

// GET /api/v1/public/pages/{slug}
#[utoipa::path(
    get,
    path = "/api/v1/public/pages/{slug}",
    tag = "Public",
    params(("slug" = String, Path, description = "Slug da página")),
    responses(
        (status = 200, description = "Página publicada", body = PublishedPage),
        (status = 404, description = "Inexistente ou não publicada")
    )
)]
pub async fn get_published(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(slug): Path<String>,
) -> Result<Json<PublishedPage>, ApiError> {
    let page = app_state
        .portal_service
        .get_published(&slug)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(page))
}

// GET /api/v1/public/menu/{date}
#[utoipa::path(
    get,
    path = "/api/v1/public/menu/{date}",
    tag = "Public",
    params(("date" = String, Path, description = "Data no formato AAAA-MM-DD")),
    responses((status = 200, description = "Itens ativos do cardápio com preços", body = MenuDayDetail))
)]
pub async fn menu_for(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(date): Path<NaiveDate>,
) -> Result<Json<MenuDayDetail>, ApiError> {
    let menu = app_state
        .portal_service
        .menu_for(date)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(menu))
}
