// src/db/inventory_repo.rs

use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, reference::Reference},
    models::inventory::{NewStockMovement, StockItem, StockItemView, StockMovement},
};

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

// Saldo derivado: soma das movimentações com sinal
const STOCK_VIEW_SELECT: &str = r#"
    SELECT
        s.id, s.ingredient_id, i.name AS ingredient_name, i.unit, s.low_stock_threshold,
        COALESCE(SUM(CASE WHEN m.kind = 'IN' THEN m.quantity ELSE -m.quantity END), 0) AS balance
    FROM stock_items s
    JOIN ingredients i ON i.id = s.ingredient_id
    LEFT JOIN stock_movements m ON m.stock_item_id = s.id
"#;

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Funções de "Leitura"
    // ---

    pub async fn list_stock_views(&self) -> Result<Vec<StockItemView>, AppError> {
        let sql = format!("{STOCK_VIEW_SELECT} GROUP BY s.id, i.name, i.unit ORDER BY i.name ASC");
        let items = sqlx::query_as::<_, StockItemView>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn find_stock_view(&self, id: Uuid) -> Result<Option<StockItemView>, AppError> {
        let sql = format!("{STOCK_VIEW_SELECT} WHERE s.id = $1 GROUP BY s.id, i.name, i.unit");
        let item = sqlx::query_as::<_, StockItemView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    /// Itens com saldo igual ou abaixo do limite de alerta.
    pub async fn low_stock_views(&self) -> Result<Vec<StockItemView>, AppError> {
        let sql = format!(
            "{STOCK_VIEW_SELECT} GROUP BY s.id, i.name, i.unit \
             HAVING COALESCE(SUM(CASE WHEN m.kind = 'IN' THEN m.quantity ELSE -m.quantity END), 0) <= s.low_stock_threshold \
             ORDER BY i.name ASC"
        );
        let items = sqlx::query_as::<_, StockItemView>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    pub async fn list_movements(&self, stock_item_id: Uuid) -> Result<Vec<StockMovement>, AppError> {
        let movements = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE stock_item_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(stock_item_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    // ---
    // Funções de "Escrita" (Transacionais)
    // ---

    /// Cria o item de estoque do ingrediente, ou devolve o existente. O bool diz se foi criado agora.
    pub async fn get_or_create_stock_item(
        &self,
        conn: &mut sqlx::PgConnection,
        ingredient_id: Uuid,
        low_stock_threshold: Decimal,
    ) -> Result<(StockItem, bool), AppError> {
        let inserted = sqlx::query_as::<_, StockItem>(
            r#"
            INSERT INTO stock_items (ingredient_id, low_stock_threshold)
            VALUES ($1, $2)
            ON CONFLICT (ingredient_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(ingredient_id)
        .bind(low_stock_threshold)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(item) = inserted {
            return Ok((item, true));
        }

        let existing =
            sqlx::query_as::<_, StockItem>("SELECT * FROM stock_items WHERE ingredient_id = $1")
                .bind(ingredient_id)
                .fetch_one(&mut *conn)
                .await?;
        Ok((existing, false))
    }

    /// Trava a linha do item até o fim da transação (serializa movimentações concorrentes).
    pub async fn lock_stock_item<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<StockItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, StockItem>("SELECT * FROM stock_items WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(item)
    }

    pub async fn balance<'e, E>(&self, executor: E, stock_item_id: Uuid) -> Result<Decimal, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let balance = sqlx::query_scalar::<_, Decimal>(
            r#"
            SELECT COALESCE(SUM(CASE WHEN kind = 'IN' THEN quantity ELSE -quantity END), 0)
            FROM stock_movements
            WHERE stock_item_id = $1
            "#,
        )
        .bind(stock_item_id)
        .fetch_one(executor)
        .await?;
        Ok(balance)
    }

    pub async fn find_movement_by_reference<'e, E>(
        &self,
        executor: E,
        stock_item_id: Uuid,
        reference: &Reference,
    ) -> Result<Option<StockMovement>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let movement = sqlx::query_as::<_, StockMovement>(
            r#"
            SELECT * FROM stock_movements
            WHERE stock_item_id = $1 AND reference_type = $2 AND reference_id = $3
            "#,
        )
        .bind(stock_item_id)
        .bind(&reference.kind)
        .bind(reference.id)
        .fetch_optional(executor)
        .await?;
        Ok(movement)
    }

    pub async fn insert_movement<'e, E>(
        &self,
        executor: E,
        movement: &NewStockMovement,
        reference: Option<&Reference>,
    ) -> Result<StockMovement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let created = sqlx::query_as::<_, StockMovement>(
            r#"
            INSERT INTO stock_movements (
                stock_item_id, kind, quantity, reason, unit_cost,
                reference_type, reference_id, created_by
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(movement.stock_item_id)
        .bind(movement.kind)
        .bind(movement.quantity)
        .bind(&movement.reason)
        .bind(movement.unit_cost)
        .bind(reference.map(|r| r.kind.as_str()))
        .bind(reference.map(|r| r.id))
        .bind(movement.created_by)
        .fetch_one(executor)
        .await?;
        Ok(created)
    }
}
