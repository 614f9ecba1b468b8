// src/models/inventory.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::catalog::MeasureUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "movement_kind", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum MovementKind {
    In,  // Vira "IN"
    Out, // Vira "OUT"
}

impl MovementKind {
    /// Quantidade com sinal: IN soma, OUT subtrai.
    pub fn signed(self, quantity: Decimal) -> Decimal {
        match self {
            MovementKind::In => quantity,
            MovementKind::Out => -quantity,
        }
    }
}

// Um item de estoque por ingrediente
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItem {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub low_stock_threshold: Decimal,
    pub created_at: DateTime<Utc>,
}

// Item + ingrediente + saldo derivado das movimentações
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockItemView {
    pub id: Uuid,
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub unit: MeasureUnit,
    pub low_stock_threshold: Decimal,
    pub balance: Decimal,
}

// --- STOCK MOVEMENT (Histórico) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockMovement {
    pub id: Uuid,
    pub stock_item_id: Uuid,
    pub kind: MovementKind,
    pub quantity: Decimal,
    #[schema(example = "Compra #12")]
    pub reason: String,
    pub unit_cost: Option<Decimal>,
    #[schema(example = "purchase_order_item")]
    pub reference_type: Option<String>,
    pub reference_id: Option<Uuid>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// Dados de uma nova movimentação, montados pelos serviços
#[derive(Debug, Clone)]
pub struct NewStockMovement {
    pub stock_item_id: Uuid,
    pub kind: MovementKind,
    pub quantity: Decimal,
    pub reason: String,
    pub unit_cost: Option<Decimal>,
    pub created_by: Option<Uuid>,
}
