// src/db/procurement_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::procurement::{NewPurchaseLine, PurchaseOrder, PurchaseOrderItem, PurchaseStatus, Supplier},
};

#[derive(Clone)]
pub struct ProcurementRepository {
    pool: PgPool,
}

impl ProcurementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Fornecedores ---

    pub async fn create_supplier<'e, E>(
        &self,
        executor: E,
        name: &str,
        contact_email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Supplier, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Supplier>(
            r#"
            INSERT INTO suppliers (name, contact_email, phone)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(contact_email)
        .bind(phone)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation("Fornecedor".into());
                }
            }
            e.into()
        })
    }

    pub async fn list_suppliers(&self) -> Result<Vec<Supplier>, AppError> {
        let suppliers = sqlx::query_as::<_, Supplier>("SELECT * FROM suppliers ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(suppliers)
    }

    // --- Pedidos de compra ---

    pub async fn create_order<'e, E>(
        &self,
        executor: E,
        supplier_id: Uuid,
        expected_date: Option<NaiveDate>,
        total_amount: Decimal,
        notes: Option<&str>,
    ) -> Result<PurchaseOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            INSERT INTO purchase_orders (supplier_id, expected_date, total_amount, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(supplier_id)
        .bind(expected_date)
        .bind(total_amount)
        .bind(notes)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    pub async fn insert_item<'e, E>(
        &self,
        executor: E,
        purchase_order_id: Uuid,
        line: &NewPurchaseLine,
    ) -> Result<PurchaseOrderItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, PurchaseOrderItem>(
            r#"
            INSERT INTO purchase_order_items (purchase_order_id, ingredient_id, quantity, unit_cost)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(purchase_order_id)
        .bind(line.ingredient_id)
        .bind(line.quantity)
        .bind(line.unit_cost)
        .fetch_one(executor)
        .await?;
        Ok(item)
    }

    pub async fn list_orders(
        &self,
        status: Option<PurchaseStatus>,
    ) -> Result<Vec<PurchaseOrder>, AppError> {
        let orders = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            SELECT * FROM purchase_orders
            WHERE ($1::purchase_status IS NULL OR status = $1)
            ORDER BY created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    pub async fn find_order<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<PurchaseOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, PurchaseOrder>("SELECT * FROM purchase_orders WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(order)
    }

    pub async fn lock_order<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<PurchaseOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            "SELECT * FROM purchase_orders WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn items_of<'e, E>(
        &self,
        executor: E,
        purchase_order_id: Uuid,
    ) -> Result<Vec<PurchaseOrderItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, PurchaseOrderItem>(
            "SELECT * FROM purchase_order_items WHERE purchase_order_id = $1 ORDER BY id",
        )
        .bind(purchase_order_id)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }

    pub async fn set_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: PurchaseStatus,
    ) -> Result<PurchaseOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, PurchaseOrder>(
            r#"
            UPDATE purchase_orders
            SET status = $2,
                received_at = CASE WHEN $2 = 'RECEIVED'::purchase_status THEN NOW() ELSE received_at END,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }
}
