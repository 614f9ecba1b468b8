// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{common::error::AppError, config::AppState, models::auth::User};

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

// O middleware em si: valida o Bearer e pendura o usuário nas extensions da requisição
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let bearer = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or(AppError::InvalidToken)?;

    let user = app_state.auth_service.validate_token(bearer.token()).await?;

    if !user.is_active {
        tracing::warn!(user_id = %user.id, "Token de usuário inativo recusado");
        return Err(AppError::InvalidToken);
    }

    request.extensions_mut().insert(AuthenticatedUser(user));
    Ok(next.run(request).await)
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}
