// src/services/order_service.rs

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, reference::Reference, validation::field_error},
    db::{CatalogRepository, OrdersRepository},
    models::{
        catalog::MenuItem,
        finance::{CashDirection, NewCashMovement, NewSettlement},
        orders::{
            order_total, Order, OrderDetail, OrderStatus, Payment, PaymentMethod, PaymentStatus,
            PricedLine,
        },
    },
    services::finance_service::FinanceService,
};

// Linha pedida pelo cliente
#[derive(Debug, Clone)]
pub struct OrderLineInput {
    pub menu_item_id: Uuid,
    pub quantity: i32,
}

/// Congela o preço de cada linha a partir dos itens do cardápio do dia.
/// Item que não é do cardápio ou está inativo torna o pedido inválido.
pub fn price_lines(
    lines: &[OrderLineInput],
    menu_items: &[MenuItem],
) -> Result<Vec<PricedLine>, AppError> {
    let by_id: HashMap<Uuid, &MenuItem> = menu_items.iter().map(|m| (m.id, m)).collect();

    lines
        .iter()
        .map(|line| match by_id.get(&line.menu_item_id) {
            Some(item) if item.is_active => Ok(PricedLine {
                menu_item_id: item.id,
                dish_id: item.dish_id,
                quantity: line.quantity,
                unit_price: item.sale_price,
            }),
            _ => Err(AppError::BusinessRule("menu_item_unavailable")),
        })
        .collect()
}

fn transition_error(from: OrderStatus, to: OrderStatus) -> AppError {
    AppError::InvalidStateTransition {
        entity: "Pedido",
        from: from.as_str().into(),
        to: to.as_str().into(),
    }
}

#[derive(Clone)]
pub struct OrderService {
    repo: OrdersRepository,
    catalog_repo: CatalogRepository,
    finance_service: FinanceService,
    pool: PgPool,
}

impl OrderService {
    pub fn new(
        repo: OrdersRepository,
        catalog_repo: CatalogRepository,
        finance_service: FinanceService,
        pool: PgPool,
    ) -> Self {
        Self { repo, catalog_repo, finance_service, pool }
    }

    // --- PEDIDOS ---

    pub async fn create_order(
        &self,
        customer_id: Option<Uuid>,
        menu_date: NaiveDate,
        lines: Vec<OrderLineInput>,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<OrderDetail, AppError> {
        if lines.is_empty() {
            return Err(field_error("items", "order_without_items"));
        }

        let mut tx = self.pool.begin().await?;

        let menu_day = self
            .catalog_repo
            .find_menu_day_by_date(&mut *tx, menu_date)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Cardápio".into()))?;

        let requested: Vec<Uuid> = lines.iter().map(|l| l.menu_item_id).collect();
        let menu_items = self
            .catalog_repo
            .menu_items_of_day(&mut *tx, menu_day.id, &requested)
            .await?;

        let priced = price_lines(&lines, &menu_items)?;
        let total = order_total(&priced).ok_or_else(|| field_error("items", "total_out_of_range"))?;

        let order = self
            .repo
            .create_order(&mut *tx, customer_id, menu_day.id, total, notes, created_by)
            .await?;

        let mut items = Vec::with_capacity(priced.len());
        for line in &priced {
            items.push(self.repo.insert_item(&mut *tx, order.id, line).await?);
        }
        tx.commit().await?;

        tracing::info!(order_id = %order.id, display_id = order.display_id, %total, "🧾 Pedido criado");
        Ok(OrderDetail { order, items, payments: Vec::new(), receivable: None })
    }

    pub async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, AppError> {
        self.repo.list_orders(status).await
    }

    pub async fn get_order(&self, id: Uuid) -> Result<OrderDetail, AppError> {
        let mut conn = self.pool.acquire().await?;
        let order = self
            .repo
            .find_order(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))?;
        let items = self.repo.items_of(&mut *conn, id).await?;
        let payments = self.repo.payments_of(&mut *conn, id).await?;
        let receivable = self
            .finance_service
            .find_receivable(&mut conn, &Reference::order(id))
            .await?;
        Ok(OrderDetail { order, items, payments, receivable })
    }

    /// PENDING -> CONFIRMED e garante a conta a receber do pedido.
    /// Em pedido já confirmado (ou pago) só garante que a conta exista.
    pub async fn confirm_order(&self, id: Uuid) -> Result<OrderDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .repo
            .lock_order(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))?;

        let order = match order.status {
            OrderStatus::Pending => self.repo.set_status(&mut *tx, id, OrderStatus::Confirmed).await?,
            OrderStatus::Confirmed | OrderStatus::Paid => order,
            OrderStatus::Cancelled => {
                return Err(transition_error(order.status, OrderStatus::Confirmed));
            }
        };

        self.finance_service
            .get_or_create_receivable(
                &mut tx,
                NewSettlement {
                    reference: Reference::order(order.id),
                    counterparty_id: order.customer_id,
                    description: format!("Pedido #{}", order.display_id),
                    amount: order.total_amount,
                    due_date: Utc::now().date_naive(),
                },
            )
            .await?;

        tx.commit().await?;
        tracing::info!(order_id = %id, "Pedido confirmado");
        self.get_order(id).await
    }

    /// Cancela o pedido se nenhum pagamento foi confirmado; a conta a receber em aberto vai junto.
    pub async fn cancel_order(&self, id: Uuid) -> Result<OrderDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .repo
            .lock_order(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))?;

        if order.status == OrderStatus::Cancelled {
            drop(tx);
            return self.get_order(id).await;
        }
        if !order.status.can_transition_to(OrderStatus::Cancelled) {
            return Err(transition_error(order.status, OrderStatus::Cancelled));
        }

        let confirmed = self.repo.confirmed_total(&mut *tx, id).await?;
        if confirmed > Decimal::ZERO {
            tracing::warn!(order_id = %id, %confirmed, "Cancelamento recusado: pedido com pagamento confirmado");
            return Err(AppError::BusinessRule("order_has_confirmed_payments"));
        }

        self.repo.set_status(&mut *tx, id, OrderStatus::Cancelled).await?;
        self.finance_service
            .cancel_for_reference(&mut tx, &Reference::order(id))
            .await?;

        tx.commit().await?;
        tracing::info!(order_id = %id, "Pedido cancelado");
        self.get_order(id).await
    }

    // --- PAGAMENTOS ---

    pub async fn register_payment(
        &self,
        order_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<Payment, AppError> {
        let mut tx = self.pool.begin().await?;

        let order = self
            .repo
            .lock_order(&mut *tx, order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))?;

        if order.status != OrderStatus::Confirmed {
            return Err(AppError::BusinessRule("order_not_confirmed"));
        }

        let confirmed = self.repo.confirmed_total(&mut *tx, order_id).await?;
        if amount > order.total_amount - confirmed {
            return Err(AppError::BusinessRule("payment_exceeds_balance"));
        }

        let payment = self.repo.create_payment(&mut *tx, order_id, amount, method).await?;
        tx.commit().await?;

        tracing::info!(payment_id = %payment.id, %order_id, %amount, "Pagamento registrado");
        Ok(payment)
    }

    /// PENDING -> CONFIRMED com uma entrada de caixa. Quando os pagamentos confirmados
    /// cobrem o total, o pedido vira PAID e a conta a receber é quitada sem novo lançamento.
    pub async fn confirm_payment(&self, payment_id: Uuid) -> Result<Payment, AppError> {
        let mut tx = self.pool.begin().await?;

        let payment = self
            .repo
            .lock_payment(&mut *tx, payment_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pagamento".into()))?;

        if payment.status == PaymentStatus::Confirmed {
            return Ok(payment);
        }

        let order = self
            .repo
            .lock_order(&mut *tx, payment.order_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Pedido".into()))?;
        if order.status != OrderStatus::Confirmed {
            return Err(AppError::BusinessRule("order_not_confirmed"));
        }

        let confirmed_payment = self.repo.confirm_payment(&mut *tx, payment.id).await?;

        self.finance_service
            .post_once(
                &mut tx,
                NewCashMovement {
                    reference: Reference::payment(payment.id),
                    direction: CashDirection::In,
                    amount: payment.amount,
                    description: format!("Pagamento do pedido #{}", order.display_id),
                    occurred_on: Utc::now().date_naive(),
                },
            )
            .await?;

        let paid_so_far = self.repo.confirmed_total(&mut *tx, order.id).await?;
        if paid_so_far >= order.total_amount {
            self.repo.set_status(&mut *tx, order.id, OrderStatus::Paid).await?;
            self.finance_service
                .mark_receivable_paid(&mut tx, &Reference::order(order.id))
                .await?;
            tracing::info!(order_id = %order.id, "✅ Pedido quitado");
        }

        tx.commit().await?;
        Ok(confirmed_payment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu_item(price_cents: i64, is_active: bool) -> MenuItem {
        MenuItem {
            id: Uuid::new_v4(),
            menu_day_id: Uuid::nil(),
            dish_id: Uuid::new_v4(),
            sale_price: Decimal::new(price_cents, 2),
            is_active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_prices_are_snapshotted_from_menu() {
        let lasagna = menu_item(3290, true);
        let lines = vec![OrderLineInput { menu_item_id: lasagna.id, quantity: 3 }];
        let priced = price_lines(&lines, std::slice::from_ref(&lasagna)).unwrap();
        assert_eq!(priced[0].unit_price, Decimal::new(3290, 2));
        assert_eq!(priced[0].dish_id, lasagna.dish_id);
        assert_eq!(order_total(&priced), Some(Decimal::new(9870, 2)));
    }

    #[test]
    fn test_inactive_or_foreign_item_is_unavailable() {
        let inactive = menu_item(1000, false);
        let lines = vec![OrderLineInput { menu_item_id: inactive.id, quantity: 1 }];
        assert!(matches!(
            price_lines(&lines, &[inactive]),
            Err(AppError::BusinessRule("menu_item_unavailable"))
        ));

        let other_day = vec![OrderLineInput { menu_item_id: Uuid::new_v4(), quantity: 1 }];
        assert!(matches!(
            price_lines(&other_day, &[menu_item(1000, true)]),
            Err(AppError::BusinessRule("menu_item_unavailable"))
        ));
    }
}
