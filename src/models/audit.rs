// src/models/audit.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminActivityLog {
    pub id: i64,
    pub actor_id: Uuid,
    pub actor_email: String,
    #[schema(example = "POST")]
    pub method: String,
    #[schema(example = "/api/v1/finance/bills")]
    pub path: String,
    pub query: Option<String>,
    #[schema(example = 201)]
    pub status_code: i32,
    pub duration_ms: i64,
    #[schema(value_type = Option<Object>)]
    pub payload: Option<Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewActivityLog {
    pub actor_id: Uuid,
    pub actor_email: String,
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub status_code: i32,
    pub duration_ms: i64,
    pub payload: Option<Value>,
}
