// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::auth::{AuthResponse, LoginUserPayload, MeResponse, RegisterUserPayload},
};

// POST /api/v1/auth/register
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário criado", body = AuthResponse),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .auth_service
        .register_user(&payload.email, &payload.password, &payload.full_name)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(response)))
}

// POST /api/v1/auth/login
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let response = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(response))
}

// GET /api/v1/auth/me
#[utoipa::path(
    get,
    path = "/api/v1/auth/me",
    tag = "Auth",
    responses(
        (status = 200, description = "Usuário autenticado e seus cargos", body = MeResponse)
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<MeResponse>, ApiError> {
    let me = app_state
        .auth_service
        .me(user)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(me))
}
