// src/db/audit_repo.rs

use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::audit::{AdminActivityLog, NewActivityLog},
};

// Só insere e lê: a tabela recusa UPDATE/DELETE por trigger
#[derive(Clone)]
pub struct AuditRepository {
    pool: PgPool,
}

impl AuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, entry: NewActivityLog) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO admin_activity_logs (
                actor_id, actor_email, method, path, query, status_code, duration_ms, payload
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(entry.actor_id)
        .bind(&entry.actor_email)
        .bind(&entry.method)
        .bind(&entry.path)
        .bind(&entry.query)
        .bind(entry.status_code)
        .bind(entry.duration_ms)
        .bind(entry.payload.map(Json))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn list(
        &self,
        limit: i64,
        actor_id: Option<Uuid>,
    ) -> Result<Vec<AdminActivityLog>, AppError> {
        let logs = sqlx::query_as::<_, AdminActivityLog>(
            r#"
            SELECT * FROM admin_activity_logs
            WHERE ($1::uuid IS NULL OR actor_id = $1)
            ORDER BY created_at DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(actor_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(logs)
    }
}
