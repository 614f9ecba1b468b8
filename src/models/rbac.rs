// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// O que sai do banco (Tabela Roles)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    #[schema(example = "cozinha")]
    pub name: String,
    #[schema(example = "Equipe de produção")]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O que sai do banco (Tabela Permissions)
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: Uuid,
    #[schema(example = "inventory:read")]
    pub slug: String,
    #[schema(example = "Visualizar saldos e movimentações")]
    pub description: String,
    #[schema(example = "INVENTORY")]
    pub module: String,
}

// O Payload para criar um cargo
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolePayload {
    #[validate(length(min = 1, max = 60, message = "required"))]
    #[schema(example = "estoquista")]
    pub name: String,

    pub description: Option<String>,

    #[schema(example = json!(["inventory:read", "inventory:write"]))]
    pub permissions: Vec<String>, // Slugs das permissões
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolePayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "staff")]
    pub role_name: String,
}

// Resposta completa (Cargo + Lista de Permissões)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    #[serde(flatten)]
    pub role: Role,
    pub permissions: Vec<String>,
}
