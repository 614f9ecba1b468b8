// src/services/procurement_service.rs

use chrono::{Duration, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, reference::Reference, validation::field_error},
    db::ProcurementRepository,
    models::{
        finance::NewSettlement,
        inventory::{MovementKind, NewStockMovement},
        procurement::{
            purchase_total, NewPurchaseLine, PurchaseOrder, PurchaseOrderDetail, PurchaseStatus,
            Supplier,
        },
    },
    services::{finance_service::FinanceService, inventory_service::InventoryService},
};

// Prazo padrão da conta a pagar gerada no recebimento
const BILL_DUE_DAYS: i64 = 30;

fn transition_error(from: PurchaseStatus, to: PurchaseStatus) -> AppError {
    AppError::InvalidStateTransition {
        entity: "Pedido de compra",
        from: from.as_str().into(),
        to: to.as_str().into(),
    }
}

#[derive(Clone)]
pub struct ProcurementService {
    repo: ProcurementRepository,
    inventory_service: InventoryService,
    finance_service: FinanceService,
    pool: PgPool,
}

impl ProcurementService {
    pub fn new(
        repo: ProcurementRepository,
        inventory_service: InventoryService,
        finance_service: FinanceService,
        pool: PgPool,
    ) -> Self {
        Self { repo, inventory_service, finance_service, pool }
    }

    // --- FORNECEDORES ---

    pub async fn create_supplier(
        &self,
        name: &str,
        contact_email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Supplier, AppError> {
        // Nome exibido como digitado; a unicidade é por LOWER(name)
        let display = name.split_whitespace().collect::<Vec<_>>().join(" ");
        self.repo
            .create_supplier(&self.pool, &display, contact_email, phone)
            .await
    }

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        self.repo.list_suppliers().await
    }

    // --- PEDIDOS DE COMPRA ---

    pub async fn create_order(
        &self,
        supplier_id: Uuid,
        expected_date: Option<NaiveDate>,
        notes: Option<&str>,
        lines: Vec<NewPurchaseLine>,
    ) -> Result<PurchaseOrderDetail, AppError> {
        if lines.is_empty() {
            return Err(AppError::BusinessRule("empty_purchase_order"));
        }
        let total = purchase_total(&lines).ok_or_else(|| field_error("items", "total_out_of_range"))?;

        let mut tx = self.pool.begin().await?;
        let order = self
            .repo
            .create_order(&mut *tx, supplier_id, expected_date, total, notes)
            .await?;

        let mut items = Vec::with_capacity(lines.len());
        for line in &lines {
            items.push(self.repo.insert_item(&mut *tx, order.id, line).await?);
        }
        tx.commit().await?;

        tracing::info!(purchase_order_id = %order.id, %total, "Pedido de compra criado");
        Ok(PurchaseOrderDetail { order, items, bill_id: None })
    }

    pub async fn list_orders(
        &self,
        status: Option<PurchaseStatus>,
    ) -> Result<Vec<PurchaseOrder>, AppError> {
        self.repo.list_orders(status).await
    }

    pub async fn get_order(&self, id: Uuid) -> Result<PurchaseOrderDetail, AppError> {
        let mut conn = self.pool.acquire().await?;
        let order = self
            .repo
            .find_order(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido de compra".into()))?;
        let items = self.repo.items_of(&mut *conn, id).await?;
        let bill = self
            .finance_service
            .find_bill(&mut conn, &Reference::purchase_order(id))
            .await?;
        Ok(PurchaseOrderDetail { order, items, bill_id: bill.map(|b| b.id) })
    }

    pub async fn submit_order(&self, id: Uuid) -> Result<PurchaseOrder, AppError> {
        self.transition(id, PurchaseStatus::Ordered).await
    }

    pub async fn cancel_order(&self, id: Uuid) -> Result<PurchaseOrder, AppError> {
        self.transition(id, PurchaseStatus::Cancelled).await
    }

    async fn transition(&self, id: Uuid, next: PurchaseStatus) -> Result<PurchaseOrder, AppError> {
        let mut tx = self.pool.begin().await?;
        let order = self
            .repo
            .lock_order(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido de compra".into()))?;

        if order.status == next {
            return Ok(order);
        }
        if !order.status.can_transition_to(next) {
            return Err(transition_error(order.status, next));
        }

        let updated = self.repo.set_status(&mut *tx, id, next).await?;
        tx.commit().await?;
        tracing::info!(purchase_order_id = %id, from = order.status.as_str(), to = next.as_str(), "Pedido de compra atualizado");
        Ok(updated)
    }

    /// ORDERED -> RECEIVED: entrada de estoque por item e uma conta a pagar pelo total.
    /// Receber um pedido já recebido devolve o pedido sem repetir nenhum efeito.
    pub async fn receive_order(&self, id: Uuid, received_by: Uuid) -> Result<PurchaseOrderDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .repo
            .lock_order(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido de compra".into()))?;

        if order.status == PurchaseStatus::Received {
            drop(tx);
            return self.get_order(id).await;
        }
        if !order.status.can_transition_to(PurchaseStatus::Received) {
            return Err(transition_error(order.status, PurchaseStatus::Received));
        }

        let items = self.repo.items_of(&mut *tx, id).await?;

        // 1. Entradas de estoque (uma por item do pedido)
        for item in &items {
            let stock_item = self
                .inventory_service
                .ensure_stock_item(&mut tx, item.ingredient_id)
                .await?;
            self.inventory_service
                .apply_movement_in(
                    &mut tx,
                    NewStockMovement {
                        stock_item_id: stock_item.id,
                        kind: MovementKind::In,
                        quantity: item.quantity,
                        reason: format!("Recebimento do pedido de compra {}", order.id),
                        unit_cost: Some(item.unit_cost),
                        created_by: Some(received_by),
                    },
                    Some(&Reference::purchase_order_item(item.id)),
                )
                .await?;
        }

        // 2. Conta a pagar pelo total do pedido
        let bill = self
            .finance_service
            .get_or_create_bill(
                &mut tx,
                NewSettlement {
                    reference: Reference::purchase_order(order.id),
                    counterparty_id: Some(order.supplier_id),
                    description: format!("Pedido de compra {}", order.id),
                    amount: order.total_amount,
                    due_date: Utc::now().date_naive() + Duration::days(BILL_DUE_DAYS),
                },
            )
            .await?;

        // 3. Status
        let received = self.repo.set_status(&mut *tx, id, PurchaseStatus::Received).await?;
        tx.commit().await?;

        tracing::info!(purchase_order_id = %id, items = items.len(), bill_id = %bill.id, "📦 Pedido de compra recebido");
        Ok(PurchaseOrderDetail { order: received, items, bill_id: Some(bill.id) })
    }
}
