// src/handlers/rbac.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermAccountsManage, RequirePermission},
    },
    models::rbac::{AssignRolePayload, CreateRolePayload, Permission, RoleResponse},
};

// POST /api/v1/accounts/roles
#[utoipa::path(
    post,
    path = "/api/v1/accounts/roles",
    tag = "RBAC",
    request_body = CreateRolePayload,
    responses(
        (status = 201, description = "Cargo criado com as permissões reconhecidas", body = RoleResponse),
        (status = 409, description = "Já existe um cargo com esse nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermAccountsManage>,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .rbac_service
        .create_role_with_permissions(payload.name, payload.description, payload.permissions)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(response)))
}

// POST /api/v1/accounts/users/{user_id}/roles
#[utoipa::path(
    post,
    path = "/api/v1/accounts/users/{user_id}/roles",
    tag = "RBAC",
    request_body = AssignRolePayload,
    params(("user_id" = Uuid, Path, description = "ID do usuário")),
    responses(
        (status = 200, description = "Cargo atribuído (idempotente)", body = RoleResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn assign_role(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermAccountsManage>,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AssignRolePayload>,
) -> Result<Json<RoleResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .rbac_service
        .assign_role(user_id, payload.role_name.trim())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

// GET /api/v1/accounts/permissions (para o frontend montar a tela de cargos)
#[utoipa::path(
    get,
    path = "/api/v1/accounts/permissions",
    tag = "RBAC",
    responses(
        (status = 200, description = "Permissões declaradas no sistema", body = Vec<Permission>)
    ),
    security(("api_jwt" = []))
)]
pub async fn list_permissions(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<Permission>>, ApiError> {
    let permissions = app_state
        .rbac_service
        .list_system_permissions()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(permissions))
}
