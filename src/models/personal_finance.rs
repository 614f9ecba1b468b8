// src/models/personal_finance.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "entry_kind", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Income => "INCOME",
            EntryKind::Expense => "EXPENSE",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PfCategory {
    pub id: Uuid,
    #[schema(ignore)]
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    #[schema(example = "Mercado")]
    pub name: String,
    pub kind: EntryKind,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PfTransaction {
    pub id: Uuid,
    #[schema(ignore)]
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub category_id: Option<Uuid>,
    pub kind: EntryKind,
    pub amount: Decimal,
    pub description: String,
    #[schema(value_type = String, format = Date)]
    pub occurred_on: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category_id: Option<Uuid>,
    // "Sem categoria" quando a transação não tem categoria
    pub category_name: String,
    pub kind: EntryKind,
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    #[schema(example = "2026-10")]
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    pub by_category: Vec<CategoryTotal>,
}

impl MonthSummary {
    pub fn from_totals(month: String, by_category: Vec<CategoryTotal>) -> Self {
        let sum = |kind: EntryKind| -> Decimal {
            by_category
                .iter()
                .filter(|c| c.kind == kind)
                .map(|c| c.total)
                .sum()
        };
        let income = sum(EntryKind::Income);
        let expense = sum(EntryKind::Expense);
        MonthSummary {
            month,
            income,
            expense,
            net: income - expense,
            by_category,
        }
    }
}

/// Interpreta "AAAA-MM" e devolve o intervalo [primeiro dia, primeiro dia do mês seguinte).
pub fn parse_month(month: &str) -> Option<(NaiveDate, NaiveDate)> {
    let (year, month) = month.trim().split_once('-')?;
    if year.len() != 4 || month.len() != 2 {
        return None;
    }
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if start.month() == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((start, end))
}

#[derive(Debug, Serialize)]
pub struct PfTransactionCsvRow {
    pub data: NaiveDate,
    pub tipo: &'static str,
    pub categoria: String,
    pub valor: String,
    pub descricao: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_month() {
        let (start, end) = parse_month("2026-02").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());

        let (_, end) = parse_month("2026-12").unwrap();
        assert_eq!(end, NaiveDate::from_ymd_opt(2027, 1, 1).unwrap());
    }

    #[test]
    fn test_parse_month_rejects_garbage() {
        assert!(parse_month("2026-13").is_none());
        assert!(parse_month("2026-1").is_none());
        assert!(parse_month("outubro").is_none());
        assert!(parse_month("").is_none());
    }

    #[test]
    fn test_summary_totals() {
        let totals = vec![
            CategoryTotal { category_id: None, category_name: "Salário".into(), kind: EntryKind::Income, total: Decimal::new(500000, 2) },
            CategoryTotal { category_id: None, category_name: "Mercado".into(), kind: EntryKind::Expense, total: Decimal::new(123450, 2) },
            CategoryTotal { category_id: None, category_name: "Aluguel".into(), kind: EntryKind::Expense, total: Decimal::new(150000, 2) },
        ];
        let summary = MonthSummary::from_totals("2026-10".into(), totals);
        assert_eq!(summary.income, Decimal::new(500000, 2));
        assert_eq!(summary.expense, Decimal::new(273450, 2));
        assert_eq!(summary.net, Decimal::new(226550, 2));
    }
}
