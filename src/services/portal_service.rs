// src/services/portal_service.rs

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::PortalRepository,
    models::{
        catalog::MenuDayDetail,
        portal::{PortalPage, PublishedPage},
    },
    services::catalog_service::CatalogService,
};

#[derive(Clone)]
pub struct PortalService {
    repo: PortalRepository,
    catalog_service: CatalogService,
    pool: PgPool,
}

impl PortalService {
    pub fn new(repo: PortalRepository, catalog_service: CatalogService, pool: PgPool) -> Self {
        Self { repo, catalog_service, pool }
    }

    // --- Administração (portal:write) ---

    pub async fn create_page(
        &self,
        slug: &str,
        title: &str,
        body: &str,
        author: Uuid,
    ) -> Result<PortalPage, AppError> {
        let page = self
            .repo
            .create_page(&self.pool, slug, title.trim(), body, author)
            .await?;
        tracing::info!(page_id = %page.id, slug, "Página do portal criada");
        Ok(page)
    }

    pub async fn update_page(
        &self,
        id: Uuid,
        title: Option<&str>,
        body: Option<&str>,
        author: Uuid,
    ) -> Result<PortalPage, AppError> {
        self.repo
            .update_page(&self.pool, id, title.map(str::trim), body, author)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Página".into()))
    }

    pub async fn publish(&self, id: Uuid, author: Uuid) -> Result<PortalPage, AppError> {
        self.set_published(id, true, author).await
    }

    pub async fn unpublish(&self, id: Uuid, author: Uuid) -> Result<PortalPage, AppError> {
        self.set_published(id, false, author).await
    }

    async fn set_published(&self, id: Uuid, published: bool, author: Uuid) -> Result<PortalPage, AppError> {
        let page = self
            .repo
            .set_published(&self.pool, id, published, author)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Página".into()))?;
        tracing::info!(page_id = %id, published, "Visibilidade da página alterada");
        Ok(page)
    }

    pub async fn list_pages(&self) -> Result<Vec<PortalPage>, AppError> {
        self.repo.list_pages().await
    }

    // --- Público ---

    pub async fn list_published(&self) -> Result<Vec<PublishedPage>, AppError> {
        self.repo.list_published().await
    }

    pub async fn get_published(&self, slug: &str) -> Result<PublishedPage, AppError> {
        self.repo
            .find_published(slug)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Página".into()))
    }

    /// Cardápio do dia como o cliente vê: só itens ativos.
    pub async fn menu_for(&self, date: NaiveDate) -> Result<MenuDayDetail, AppError> {
        self.catalog_service.get_menu_by_date(date, true).await
    }
}
