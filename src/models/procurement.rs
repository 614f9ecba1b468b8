// src/models/procurement.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::validation::MAX_MONEY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "purchase_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    Draft,
    Ordered,
    Received,
    Cancelled,
}

impl PurchaseStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PurchaseStatus::Draft => "DRAFT",
            PurchaseStatus::Ordered => "ORDERED",
            PurchaseStatus::Received => "RECEIVED",
            PurchaseStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn can_transition_to(self, next: PurchaseStatus) -> bool {
        matches!(
            (self, next),
            (PurchaseStatus::Draft, PurchaseStatus::Ordered)
                | (PurchaseStatus::Draft, PurchaseStatus::Cancelled)
                | (PurchaseStatus::Ordered, PurchaseStatus::Received)
                | (PurchaseStatus::Ordered, PurchaseStatus::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: Uuid,
    #[schema(example = "Hortifruti Central")]
    pub name: String,
    pub contact_email: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub status: PurchaseStatus,
    #[schema(value_type = Option<String>, format = Date)]
    pub expected_date: Option<NaiveDate>,
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderDetail {
    #[serde(flatten)]
    pub order: PurchaseOrder,
    pub items: Vec<PurchaseOrderItem>,
    // Conta a pagar gerada no recebimento
    pub bill_id: Option<Uuid>,
}

// Linha nova de um pedido de compra (ainda sem id)
#[derive(Debug, Clone)]
pub struct NewPurchaseLine {
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
}

/// Total de um pedido de compra: soma de quantidade x custo unitário, em centavos.
/// `None` quando o total não cabe na coluna de valor.
pub fn purchase_total(lines: &[NewPurchaseLine]) -> Option<Decimal> {
    let total = lines.iter().try_fold(Decimal::ZERO, |acc, l| {
        acc.checked_add(l.quantity.checked_mul(l.unit_cost)?)
    })?;
    let total = total.round_dp(2);
    (total <= MAX_MONEY).then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::validation::{MAX_QUANTITY, MAX_UNIT_COST};

    #[test]
    fn test_purchase_transitions() {
        assert!(PurchaseStatus::Draft.can_transition_to(PurchaseStatus::Ordered));
        assert!(PurchaseStatus::Ordered.can_transition_to(PurchaseStatus::Received));
        assert!(!PurchaseStatus::Draft.can_transition_to(PurchaseStatus::Received));
        assert!(!PurchaseStatus::Received.can_transition_to(PurchaseStatus::Cancelled));
        assert!(!PurchaseStatus::Cancelled.can_transition_to(PurchaseStatus::Ordered));
    }

    #[test]
    fn test_purchase_total_rounds_to_cents() {
        let lines = vec![
            NewPurchaseLine { ingredient_id: Uuid::nil(), quantity: Decimal::new(2500, 3), unit_cost: Decimal::new(4_3333, 4) },
            NewPurchaseLine { ingredient_id: Uuid::nil(), quantity: Decimal::new(10, 0), unit_cost: Decimal::new(150, 2) },
        ];
        // 2.5 * 4.3333 = 10.83325 ; + 15 = 25.83325
        assert_eq!(purchase_total(&lines), Some(Decimal::new(2583, 2)));
    }

    #[test]
    fn test_purchase_total_out_of_column_range() {
        // Cada linha é válida isoladamente, mas o total passa de NUMERIC(12, 2)
        let lines = vec![NewPurchaseLine {
            ingredient_id: Uuid::nil(),
            quantity: MAX_QUANTITY,
            unit_cost: MAX_UNIT_COST,
        }];
        assert_eq!(purchase_total(&lines), None);

        let huge: Decimal = "100000000000000000000".parse().unwrap();
        let overflowing = vec![NewPurchaseLine { ingredient_id: Uuid::nil(), quantity: huge, unit_cost: huge }];
        assert_eq!(purchase_total(&overflowing), None);
    }
}
