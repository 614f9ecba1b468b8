// src/db/ocr_repo.rs

use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::ocr::{LabelSource, LabelStatus, NutritionLabel, ParsedNutrition},
};

#[derive(Clone)]
pub struct OcrRepository {
    pool: PgPool,
}

impl OcrRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_label<'e, E>(
        &self,
        executor: E,
        ingredient_id: Option<Uuid>,
        source: LabelSource,
        raw_text: &str,
        parsed: &ParsedNutrition,
        created_by: Uuid,
    ) -> Result<NutritionLabel, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let label = sqlx::query_as::<_, NutritionLabel>(
            r#"
            INSERT INTO nutrition_labels (ingredient_id, source, raw_text, parsed, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(ingredient_id)
        .bind(source)
        .bind(raw_text)
        .bind(Json(parsed))
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(label)
    }

    pub async fn list_labels(&self, status: Option<LabelStatus>) -> Result<Vec<NutritionLabel>, AppError> {
        let labels = sqlx::query_as::<_, NutritionLabel>(
            r#"
            SELECT * FROM nutrition_labels
            WHERE ($1::label_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(labels)
    }

    pub async fn find_label(&self, id: Uuid) -> Result<Option<NutritionLabel>, AppError> {
        let label = sqlx::query_as::<_, NutritionLabel>("SELECT * FROM nutrition_labels WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(label)
    }

    pub async fn lock_label<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<NutritionLabel>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let label = sqlx::query_as::<_, NutritionLabel>(
            "SELECT * FROM nutrition_labels WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(label)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: LabelStatus,
        ingredient_id: Option<Uuid>,
    ) -> Result<NutritionLabel, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let label = sqlx::query_as::<_, NutritionLabel>(
            r#"
            UPDATE nutrition_labels
            SET status = $2,
                ingredient_id = COALESCE($3, ingredient_id),
                applied_at = CASE WHEN $2 = 'APPLIED'::label_status THEN NOW() ELSE applied_at END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .bind(ingredient_id)
        .fetch_one(executor)
        .await?;
        Ok(label)
    }
}
