// src/db/portal_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::portal::{PortalPage, PublishedPage},
};

#[derive(Clone)]
pub struct PortalRepository {
    pool: PgPool,
}

impl PortalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_page<'e, E>(
        &self,
        executor: E,
        slug: &str,
        title: &str,
        body: &str,
        updated_by: Uuid,
    ) -> Result<PortalPage, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PortalPage>(
            r#"
            INSERT INTO portal_pages (slug, title, body, updated_by)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(slug)
        .bind(title)
        .bind(body)
        .bind(updated_by)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation("Página".into());
                }
            }
            e.into()
        })
    }

    pub async fn update_page<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        title: Option<&str>,
        body: Option<&str>,
        updated_by: Uuid,
    ) -> Result<Option<PortalPage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let page = sqlx::query_as::<_, PortalPage>(
            r#"
            UPDATE portal_pages SET
                title = COALESCE($2, title),
                body = COALESCE($3, body),
                updated_by = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(body)
        .bind(updated_by)
        .fetch_optional(executor)
        .await?;
        Ok(page)
    }

    /// Publica ou despublica. `published_at` guarda a primeira publicação vigente.
    pub async fn set_published<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        published: bool,
        updated_by: Uuid,
    ) -> Result<Option<PortalPage>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let page = sqlx::query_as::<_, PortalPage>(
            r#"
            UPDATE portal_pages SET
                is_published = $2,
                published_at = CASE
                    WHEN $2 AND NOT is_published THEN NOW()
                    WHEN NOT $2 THEN NULL
                    ELSE published_at
                END,
                updated_by = $3,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(published)
        .bind(updated_by)
        .fetch_optional(executor)
        .await?;
        Ok(page)
    }

    pub async fn list_pages(&self) -> Result<Vec<PortalPage>, AppError> {
        let pages = sqlx::query_as::<_, PortalPage>("SELECT * FROM portal_pages ORDER BY slug")
            .fetch_all(&self.pool)
            .await?;
        Ok(pages)
    }

    pub async fn list_published(&self) -> Result<Vec<PublishedPage>, AppError> {
        let pages = sqlx::query_as::<_, PublishedPage>(
            r#"
            SELECT slug, title, body, published_at
            FROM portal_pages
            WHERE is_published
            ORDER BY published_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(pages)
    }

    pub async fn find_published(&self, slug: &str) -> Result<Option<PublishedPage>, AppError> {
        let page = sqlx::query_as::<_, PublishedPage>(
            r#"
            SELECT slug, title, body, published_at
            FROM portal_pages
            WHERE slug = $1 AND is_published
            "#,
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await?;
        Ok(page)
    }
}
