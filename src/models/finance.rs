// src/models/finance.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::reference::Reference;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "settlement_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SettlementStatus {
    Open,      // Em aberto
    Paid,      // Quitado
    Cancelled, // Cancelado
}

impl SettlementStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SettlementStatus::Open => "OPEN",
            SettlementStatus::Paid => "PAID",
            SettlementStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "cash_direction", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CashDirection {
    In,  // Entrada
    Out, // Saída
}

// --- Structs ---

// Conta a pagar. Existe no máximo uma por referência de origem.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApBill {
    pub id: Uuid,
    pub supplier_id: Option<Uuid>,
    #[schema(example = "purchase_order")]
    pub reference_type: String,
    pub reference_id: Uuid,
    #[schema(example = "Compra de hortifruti")]
    pub description: String,
    #[schema(example = "350.00")]
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    pub status: SettlementStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// Conta a receber. Para pedidos, a referência é o próprio pedido.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArReceivable {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    #[schema(example = "order")]
    pub reference_type: String,
    pub reference_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    #[schema(value_type = String, format = Date)]
    pub due_date: NaiveDate,
    pub status: SettlementStatus,
    pub received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashMovement {
    pub id: Uuid,
    pub direction: CashDirection,
    pub amount: Decimal,
    pub description: String,
    #[schema(example = "payment")]
    pub reference_type: String,
    pub reference_id: Uuid,
    #[schema(value_type = String, format = Date)]
    pub occurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CashBalance {
    pub total_in: Decimal,
    pub total_out: Decimal,
    pub balance: Decimal,
}

// Dados para abrir um título (pagar ou receber) a partir de uma origem
#[derive(Debug, Clone)]
pub struct NewSettlement {
    pub reference: Reference,
    pub counterparty_id: Option<Uuid>,
    pub description: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewCashMovement {
    pub reference: Reference,
    pub direction: CashDirection,
    pub amount: Decimal,
    pub description: String,
    pub occurred_on: NaiveDate,
}

// --- Linhas de exportação CSV ---

#[derive(Debug, Serialize)]
pub struct CashMovementCsvRow {
    pub data: NaiveDate,
    pub direcao: &'static str,
    pub valor: String,
    pub descricao: String,
    pub referencia: String,
}

impl From<&CashMovement> for CashMovementCsvRow {
    fn from(m: &CashMovement) -> Self {
        CashMovementCsvRow {
            data: m.occurred_on,
            direcao: match m.direction {
                CashDirection::In => "IN",
                CashDirection::Out => "OUT",
            },
            valor: m.amount.round_dp(2).to_string(),
            descricao: m.description.clone(),
            referencia: format!("{}:{}", m.reference_type, m.reference_id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SettlementCsvRow {
    pub id: Uuid,
    pub vencimento: NaiveDate,
    pub status: &'static str,
    pub valor: String,
    pub descricao: String,
    pub referencia: String,
}

impl From<&ApBill> for SettlementCsvRow {
    fn from(b: &ApBill) -> Self {
        SettlementCsvRow {
            id: b.id,
            vencimento: b.due_date,
            status: b.status.as_str(),
            valor: b.amount.round_dp(2).to_string(),
            descricao: b.description.clone(),
            referencia: format!("{}:{}", b.reference_type, b.reference_id),
        }
    }
}

impl From<&ArReceivable> for SettlementCsvRow {
    fn from(r: &ArReceivable) -> Self {
        SettlementCsvRow {
            id: r.id,
            vencimento: r.due_date,
            status: r.status.as_str(),
            valor: r.amount.round_dp(2).to_string(),
            descricao: r.description.clone(),
            referencia: format!("{}:{}", r.reference_type, r.reference_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cash_csv_row_formats_amount_and_reference() {
        let id = Uuid::nil();
        let movement = CashMovement {
            id,
            direction: CashDirection::Out,
            amount: Decimal::new(12347, 3),
            description: "Conta de luz".into(),
            reference_type: "ap_bill".into(),
            reference_id: id,
            occurred_on: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            created_at: Utc::now(),
        };
        let row = CashMovementCsvRow::from(&movement);
        assert_eq!(row.direcao, "OUT");
        assert_eq!(row.valor, "12.35");
        assert_eq!(row.referencia, format!("ap_bill:{}", id));
    }
}
