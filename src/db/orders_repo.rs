// src/db/orders_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::orders::{Order, OrderItem, OrderStatus, Payment, PaymentMethod, PricedLine},
};

#[derive(Clone)]
pub struct OrdersRepository {
    pool: PgPool,
}

impl OrdersRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- PEDIDOS ---

    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        customer_id: Option<Uuid>,
        menu_day_id: Uuid,
        total_amount: Decimal,
        notes: Option<&str>,
        created_by: Uuid,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (customer_id, menu_day_id, total_amount, notes, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(customer_id)
        .bind(menu_day_id)
        .bind(total_amount)
        .bind(notes)
        .bind(created_by)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        line: &PricedLine,
    ) -> Result<OrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, OrderItem>(
            r#"
            INSERT INTO order_items (order_id, menu_item_id, dish_id, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(line.menu_item_id)
        .bind(line.dish_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE ($1::order_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    pub async fn find_order<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn lock_order<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Order>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn items_of<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Vec<OrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = $1 ORDER BY created_at, id",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: OrderStatus,
    ) -> Result<Order, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, Order>(
            "UPDATE orders SET status = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    // --- PAGAMENTOS ---

    pub async fn create_payment<'e, E>(
        &self,
        executor: E,
        order_id: Uuid,
        amount: Decimal,
        method: PaymentMethod,
    ) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (order_id, amount, method)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(order_id)
        .bind(amount)
        .bind(method)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    pub async fn payments_of<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Vec<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE order_id = $1 ORDER BY created_at, id",
        )
        .bind(order_id)
        .fetch_all(executor)
        .await?;
        Ok(payments)
    }

    pub async fn lock_payment<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Payment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(payment)
    }

    pub async fn confirm_payment<'e, E>(&self, executor: E, id: Uuid) -> Result<Payment, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments SET status = 'CONFIRMED', confirmed_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(payment)
    }

    /// Soma dos pagamentos confirmados do pedido.
    pub async fn confirmed_total<'e, E>(&self, executor: E, order_id: Uuid) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let total = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(amount), 0)
            FROM payments
            WHERE order_id = $1 AND status = 'CONFIRMED'
            "#,
        )
        .bind(order_id)
        .fetch_one(executor)
        .await?;
        Ok(total)
    }
}
