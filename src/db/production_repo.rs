// src/db/production_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::production::{BatchStatus, ProductionBatch, ProductionBatchItem, RecipeUsage},
};

#[derive(Clone)]
pub struct ProductionRepository {
    pool: PgPool,
}

impl ProductionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_batch<'e, E>(
        &self,
        executor: E,
        production_date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<ProductionBatch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, ProductionBatch>(
            "INSERT INTO production_batches (production_date, notes) VALUES ($1, $2) RETURNING *",
        )
        .bind(production_date)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(batch)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        batch_id: Uuid,
        dish_id: Uuid,
        portions: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "INSERT INTO production_batch_items (batch_id, dish_id, portions) VALUES ($1, $2, $3)",
        )
        .bind(batch_id)
        .bind(dish_id)
        .bind(portions)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn list_batches(
        &self,
        status: Option<BatchStatus>,
    ) -> Result<Vec<ProductionBatch>, AppError> {
        let batches = sqlx::query_as::<_, ProductionBatch>(
            r#"
            SELECT * FROM production_batches
            WHERE ($1::batch_status IS NULL OR status = $1)
            ORDER BY production_date DESC, created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(batches)
    }

    pub async fn find_batch<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<ProductionBatch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, ProductionBatch>("SELECT * FROM production_batches WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(batch)
    }

    pub async fn lock_batch<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<ProductionBatch>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, ProductionBatch>(
            "SELECT * FROM production_batches WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(batch)
    }

    pub async fn items_of<'e, E>(
        &self,
        executor: E,
        batch_id: Uuid,
    ) -> Result<Vec<ProductionBatchItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, ProductionBatchItem>(
            r#"
            SELECT pbi.id, pbi.batch_id, pbi.dish_id, d.name AS dish_name, pbi.portions
            FROM production_batch_items pbi
            JOIN dishes d ON d.id = pbi.dish_id
            WHERE pbi.batch_id = $1
            ORDER BY d.name
            "#,
        )
        .bind(batch_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    /// Cada linha de receita dos pratos do lote, com as porções planejadas.
    pub async fn recipe_usages<'e, E>(
        &self,
        executor: E,
        batch_id: Uuid,
    ) -> Result<Vec<RecipeUsage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let usages = sqlx::query_as::<_, RecipeUsage>(
            r#"
            SELECT
                di.ingredient_id, i.name AS ingredient_name, i.unit,
                di.quantity AS recipe_quantity, pbi.portions, d.yield_portions
            FROM production_batch_items pbi
            JOIN dishes d ON d.id = pbi.dish_id
            JOIN dish_ingredients di ON di.dish_id = d.id
            JOIN ingredients i ON i.id = di.ingredient_id
            WHERE pbi.batch_id = $1
            "#,
        )
        .bind(batch_id)
        .fetch_all(executor)
        .await?;
        Ok(usages)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: BatchStatus,
    ) -> Result<ProductionBatch, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let batch = sqlx::query_as::<_, ProductionBatch>(
            r#"
            UPDATE production_batches
            SET status = $2,
                completed_at = CASE WHEN $2 = 'DONE'::batch_status THEN NOW() ELSE completed_at END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(batch)
    }
}
