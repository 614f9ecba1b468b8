// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    #[schema(example = "chef@cozinha.com")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    #[schema(ignore)]
    pub password_hash: String,

    #[schema(example = "Maria Souza")]
    pub full_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "cliente@exemplo.com")]
    pub email: String,

    #[validate(length(min = 8, message = "password_too_short"))]
    pub password: String,

    #[validate(length(min = 1, max = 120, message = "required"))]
    #[schema(example = "João da Silva")]
    pub full_name: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "invalid_email"))]
    pub email: String,
    #[validate(length(min = 1, message = "required"))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

// GET /auth/me
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    #[serde(flatten)]
    pub user: User,
    #[schema(example = json!(["staff"]))]
    pub roles: Vec<String>,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
