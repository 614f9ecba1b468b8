// src/services/inventory_service.rs

use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{error::AppError, reference::Reference},
    db::{CatalogRepository, InventoryRepository},
    models::inventory::{MovementKind, NewStockMovement, StockItem, StockItemView, StockMovement},
};

/// Saldo depois da movimentação. Um OUT que deixaria o saldo negativo é recusado.
pub fn projected_balance(
    stock_item_id: Uuid,
    balance: Decimal,
    kind: MovementKind,
    quantity: Decimal,
) -> Result<Decimal, AppError> {
    let projected = balance
        .checked_add(kind.signed(quantity))
        .ok_or(AppError::BusinessRule("quantity_out_of_range"))?;
    if projected < Decimal::ZERO {
        return Err(AppError::InsufficientStock {
            stock_item_id,
            available: balance,
            requested: quantity,
        });
    }
    Ok(projected)
}

#[derive(Clone)]
pub struct InventoryService {
    inventory_repo: InventoryRepository,
    catalog_repo: CatalogRepository,
    pool: PgPool,
}

impl InventoryService {
    pub fn new(inventory_repo: InventoryRepository, catalog_repo: CatalogRepository, pool: PgPool) -> Self {
        Self { inventory_repo, catalog_repo, pool }
    }

    // --- ITENS DE ESTOQUE ---

    pub async fn create_stock_item(
        &self,
        ingredient_id: Uuid,
        low_stock_threshold: Decimal,
    ) -> Result<StockItemView, AppError> {
        let mut tx = self.pool.begin().await?;

        self.catalog_repo
            .find_ingredient(&mut *tx, ingredient_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Ingrediente".into()))?;

        let (item, created) = self
            .inventory_repo
            .get_or_create_stock_item(&mut tx, ingredient_id, low_stock_threshold)
            .await?;
        tx.commit().await?;

        if created {
            tracing::info!(stock_item_id = %item.id, %ingredient_id, "Item de estoque criado");
        }
        self.get_stock_item(item.id).await
    }

    /// Item de estoque do ingrediente, criado na hora se ainda não existir.
    pub async fn ensure_stock_item(
        &self,
        conn: &mut PgConnection,
        ingredient_id: Uuid,
    ) -> Result<StockItem, AppError> {
        let (item, created) = self
            .inventory_repo
            .get_or_create_stock_item(conn, ingredient_id, Decimal::ZERO)
            .await?;
        if created {
            tracing::info!(stock_item_id = %item.id, %ingredient_id, "Item de estoque criado automaticamente");
        }
        Ok(item)
    }

    pub async fn list_stock_items(&self) -> Result<Vec<StockItemView>, AppError> {
        self.inventory_repo.list_stock_views().await
    }

    pub async fn get_stock_item(&self, id: Uuid) -> Result<StockItemView, AppError> {
        self.inventory_repo
            .find_stock_view(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Item de estoque".into()))
    }

    pub async fn low_stock(&self) -> Result<Vec<StockItemView>, AppError> {
        self.inventory_repo.low_stock_views().await
    }

    pub async fn list_movements(&self, stock_item_id: Uuid) -> Result<Vec<StockMovement>, AppError> {
        // 404 explícito em vez de lista vazia para item inexistente
        self.get_stock_item(stock_item_id).await?;
        self.inventory_repo.list_movements(stock_item_id).await
    }

    // --- MOVIMENTAÇÕES ---

    pub async fn apply_movement(
        &self,
        movement: NewStockMovement,
        reference: Option<Reference>,
    ) -> Result<StockMovement, AppError> {
        let mut tx = self.pool.begin().await?;
        let (created, _) = self
            .apply_movement_in(&mut tx, movement, reference.as_ref())
            .await?;
        tx.commit().await?;
        Ok(created)
    }

    /// Aplica a movimentação dentro da transação do chamador.
    /// Com referência, é idempotente por (item, referência): a repetição devolve a movimentação
    /// original e `false`.
    pub async fn apply_movement_in(
        &self,
        conn: &mut PgConnection,
        movement: NewStockMovement,
        reference: Option<&Reference>,
    ) -> Result<(StockMovement, bool), AppError> {
        // 1. Trava o item: movimentações do mesmo item ficam em fila
        self.inventory_repo
            .lock_stock_item(&mut *conn, movement.stock_item_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Item de estoque".into()))?;

        // 2. Já aplicada?
        if let Some(reference) = reference {
            if let Some(existing) = self
                .inventory_repo
                .find_movement_by_reference(&mut *conn, movement.stock_item_id, reference)
                .await?
            {
                tracing::debug!(%reference, "Movimentação já aplicada, reaproveitando");
                return Ok((existing, false));
            }
        }

        // 3. Regra do saldo não negativo
        let balance = self
            .inventory_repo
            .balance(&mut *conn, movement.stock_item_id)
            .await?;
        if let Err(e) = projected_balance(movement.stock_item_id, balance, movement.kind, movement.quantity) {
            tracing::warn!(
                stock_item_id = %movement.stock_item_id,
                %balance,
                requested = %movement.quantity,
                "Saída recusada por estoque insuficiente"
            );
            return Err(e);
        }

        // 4. Grava
        let created = self
            .inventory_repo
            .insert_movement(&mut *conn, &movement, reference)
            .await?;

        tracing::info!(
            stock_item_id = %created.stock_item_id,
            kind = ?created.kind,
            quantity = %created.quantity,
            "Movimentação de estoque registrada"
        );
        Ok((created, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_always_allowed() {
        let id = Uuid::new_v4();
        let balance = projected_balance(id, Decimal::ZERO, MovementKind::In, Decimal::new(5, 0)).unwrap();
        assert_eq!(balance, Decimal::new(5, 0));
    }

    #[test]
    fn test_out_down_to_zero_is_allowed() {
        let id = Uuid::new_v4();
        let balance =
            projected_balance(id, Decimal::new(25, 1), MovementKind::Out, Decimal::new(25, 1)).unwrap();
        assert_eq!(balance, Decimal::ZERO);
    }

    #[test]
    fn test_out_below_zero_is_rejected() {
        let id = Uuid::new_v4();
        match projected_balance(id, Decimal::new(25, 1), MovementKind::Out, Decimal::new(4, 0)) {
            Err(AppError::InsufficientStock { stock_item_id, available, requested }) => {
                assert_eq!(stock_item_id, id);
                assert_eq!(available, Decimal::new(25, 1));
                assert_eq!(requested, Decimal::new(4, 0));
            }
            other => panic!("esperava InsufficientStock, veio {:?}", other),
        }
    }
}
