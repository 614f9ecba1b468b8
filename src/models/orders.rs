// src/models/orders.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{common::validation::MAX_MONEY, models::finance::ArReceivable};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Paid,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Confirmed => "CONFIRMED",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Paid)
                | (OrderStatus::Confirmed, OrderStatus::Cancelled)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_method", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentMethod {
    Cash,
    Card,
    Pix,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[schema(example = 1024)]
    pub display_id: i32,
    pub customer_id: Option<Uuid>,
    pub menu_day_id: Uuid,
    pub status: OrderStatus,
    #[schema(example = "65.80")]
    pub total_amount: Decimal,
    pub notes: Option<String>,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// O unit_price é uma fotografia do preço do cardápio na criação do pedido e nunca muda
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub menu_item_id: Uuid,
    pub dish_id: Uuid,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "32.90")]
    pub unit_price: Decimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: Uuid,
    pub order_id: Uuid,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub items: Vec<OrderItem>,
    pub payments: Vec<Payment>,
    pub receivable: Option<ArReceivable>,
}

// Item do cardápio resolvido para o pedido: preço atual vira o preço congelado
#[derive(Debug, Clone)]
pub struct PricedLine {
    pub menu_item_id: Uuid,
    pub dish_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

/// Total do pedido: soma de quantidade x preço unitário congelado.
/// `None` quando o total não cabe na coluna de valor.
pub fn order_total(lines: &[PricedLine]) -> Option<Decimal> {
    let total = lines.iter().try_fold(Decimal::ZERO, |acc, l| {
        acc.checked_add(Decimal::from(l.quantity).checked_mul(l.unit_price)?)
    })?;
    (total <= MAX_MONEY).then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: i32, cents: i64) -> PricedLine {
        PricedLine {
            menu_item_id: Uuid::new_v4(),
            dish_id: Uuid::new_v4(),
            quantity,
            unit_price: Decimal::new(cents, 2),
        }
    }

    #[test]
    fn test_order_total() {
        let lines = vec![line(2, 3290), line(1, 1250)];
        assert_eq!(order_total(&lines), Some(Decimal::new(7830, 2)));
        assert_eq!(order_total(&[]), Some(Decimal::ZERO));
        assert_eq!(order_total(&[line(i32::MAX, 999_999_999_999)]), None);
    }

    #[test]
    fn test_order_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Confirmed));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Paid));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Paid));
        assert!(!OrderStatus::Paid.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Confirmed));
    }
}
