// src/models/portal.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PortalPage {
    pub id: Uuid,
    #[schema(example = "quem-somos")]
    pub slug: String,
    #[schema(example = "Quem somos")]
    pub title: String,
    pub body: String,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Versão pública: sem autor nem flags de controle
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PublishedPage {
    pub slug: String,
    pub title: String,
    pub body: String,
    pub published_at: Option<DateTime<Utc>>,
}
