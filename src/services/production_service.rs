// src/services/production_service.rs

use std::collections::HashSet;

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, reference::Reference, validation::field_error},
    db::ProductionRepository,
    models::{
        inventory::{MovementKind, NewStockMovement},
        production::{
            scale_requirements, BatchStatus, IngredientRequirement, ProductionBatch,
            ProductionBatchDetail,
        },
    },
    services::inventory_service::InventoryService,
};

#[derive(Debug, Clone)]
pub struct BatchLineInput {
    pub dish_id: Uuid,
    pub portions: i32,
}

#[derive(Clone)]
pub struct ProductionService {
    repo: ProductionRepository,
    inventory_service: InventoryService,
    pool: PgPool,
}

impl ProductionService {
    pub fn new(repo: ProductionRepository, inventory_service: InventoryService, pool: PgPool) -> Self {
        Self { repo, inventory_service, pool }
    }

    pub async fn create_batch(
        &self,
        production_date: NaiveDate,
        notes: Option<&str>,
        lines: Vec<BatchLineInput>,
    ) -> Result<ProductionBatchDetail, AppError> {
        let mut seen = HashSet::new();
        if !lines.iter().all(|l| seen.insert(l.dish_id)) {
            return Err(field_error("items", "duplicate_batch_dish"));
        }

        let mut tx = self.pool.begin().await?;
        let batch = self.repo.create_batch(&mut *tx, production_date, notes).await?;
        for line in &lines {
            self.repo
                .insert_item(&mut *tx, batch.id, line.dish_id, line.portions)
                .await?;
        }
        tx.commit().await?;

        tracing::info!(batch_id = %batch.id, %production_date, dishes = lines.len(), "Lote de produção planejado");
        self.get_batch(batch.id).await
    }

    pub async fn list_batches(&self, status: Option<BatchStatus>) -> Result<Vec<ProductionBatch>, AppError> {
        self.repo.list_batches(status).await
    }

    pub async fn get_batch(&self, id: Uuid) -> Result<ProductionBatchDetail, AppError> {
        let mut conn = self.pool.acquire().await?;
        let batch = self
            .repo
            .find_batch(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Lote de produção".into()))?;
        let items = self.repo.items_of(&mut *conn, id).await?;
        let requirements = scale_requirements(&self.repo.recipe_usages(&mut *conn, id).await?)
            .ok_or(AppError::BusinessRule("requirement_out_of_range"))?;
        Ok(ProductionBatchDetail { batch, items, requirements })
    }

    pub async fn requirements(&self, id: Uuid) -> Result<Vec<IngredientRequirement>, AppError> {
        Ok(self.get_batch(id).await?.requirements)
    }

    /// PLANNED -> DONE baixando do estoque tudo o que o lote consome.
    /// Um lote já DONE é devolvido como está; falta de estoque desfaz tudo.
    pub async fn complete_batch(&self, id: Uuid, completed_by: Uuid) -> Result<ProductionBatchDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let batch = self
            .repo
            .lock_batch(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Lote de produção".into()))?;

        match batch.status {
            BatchStatus::Done => {
                drop(tx);
                return self.get_batch(id).await;
            }
            BatchStatus::Cancelled => {
                return Err(AppError::InvalidStateTransition {
                    entity: "Lote de produção",
                    from: batch.status.as_str().into(),
                    to: BatchStatus::Done.as_str().into(),
                });
            }
            BatchStatus::Planned => {}
        }

        let requirements = scale_requirements(&self.repo.recipe_usages(&mut *tx, id).await?)
            .ok_or(AppError::BusinessRule("requirement_out_of_range"))?;
        let reference = Reference::production_batch(id);

        for requirement in &requirements {
            let stock_item = self
                .inventory_service
                .ensure_stock_item(&mut tx, requirement.ingredient_id)
                .await?;
            self.inventory_service
                .apply_movement_in(
                    &mut tx,
                    NewStockMovement {
                        stock_item_id: stock_item.id,
                        kind: MovementKind::Out,
                        quantity: requirement.quantity,
                        reason: format!("Produção do lote {}", id),
                        unit_cost: None,
                        created_by: Some(completed_by),
                    },
                    Some(&reference),
                )
                .await?;
        }

        self.repo.set_status(&mut *tx, id, BatchStatus::Done).await?;
        tx.commit().await?;

        tracing::info!(batch_id = %id, ingredients = requirements.len(), "🍳 Lote de produção concluído");
        self.get_batch(id).await
    }

    pub async fn cancel_batch(&self, id: Uuid) -> Result<ProductionBatch, AppError> {
        let mut tx = self.pool.begin().await?;
        let batch = self
            .repo
            .lock_batch(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Lote de produção".into()))?;

        match batch.status {
            BatchStatus::Cancelled => Ok(batch),
            BatchStatus::Done => Err(AppError::InvalidStateTransition {
                entity: "Lote de produção",
                from: batch.status.as_str().into(),
                to: BatchStatus::Cancelled.as_str().into(),
            }),
            BatchStatus::Planned => {
                let cancelled = self.repo.set_status(&mut *tx, id, BatchStatus::Cancelled).await?;
                tx.commit().await?;
                tracing::info!(batch_id = %id, "Lote de produção cancelado");
                Ok(cancelled)
            }
        }
    }
}
