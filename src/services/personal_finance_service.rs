// src/services/personal_finance_service.rs

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{csv_export::render_csv, error::AppError, validation::field_error},
    db::PersonalFinanceRepository,
    models::personal_finance::{
        parse_month, EntryKind, MonthSummary, PfCategory, PfTransaction, PfTransactionCsvRow,
    },
};

#[derive(Debug, Clone)]
pub struct NewPfTransaction {
    pub kind: EntryKind,
    pub amount: Decimal,
    pub description: String,
    pub occurred_on: NaiveDate,
    pub category_id: Option<Uuid>,
}

// Todas as operações recebem o usuário dono dos dados; nada vaza entre usuários
#[derive(Clone)]
pub struct PersonalFinanceService {
    repo: PersonalFinanceRepository,
    pool: PgPool,
}

fn month_range(month: &str) -> Result<(NaiveDate, NaiveDate), AppError> {
    parse_month(month).ok_or_else(|| field_error("month", "invalid_month"))
}

impl PersonalFinanceService {
    pub fn new(repo: PersonalFinanceRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn create_category(
        &self,
        user_id: Uuid,
        name: &str,
        kind: EntryKind,
    ) -> Result<PfCategory, AppError> {
        let name = name.split_whitespace().collect::<Vec<_>>().join(" ");
        self.repo.create_category(&self.pool, user_id, &name, kind).await
    }

    pub async fn list_categories(&self, user_id: Uuid) -> Result<Vec<PfCategory>, AppError> {
        self.repo.list_categories(user_id).await
    }

    pub async fn create_transaction(
        &self,
        user_id: Uuid,
        input: NewPfTransaction,
    ) -> Result<PfTransaction, AppError> {
        if let Some(category_id) = input.category_id {
            let category = self
                .repo
                .find_category(user_id, category_id)
                .await?
                .ok_or_else(|| AppError::ResourceNotFound("Categoria".into()))?;
            if category.kind != input.kind {
                tracing::warn!(%user_id, %category_id, "Categoria de tipo diferente do lançamento");
                return Err(AppError::BusinessRule("category_kind_mismatch"));
            }
        }

        self.repo
            .create_transaction(
                &self.pool,
                user_id,
                input.category_id,
                input.kind,
                input.amount,
                input.description.trim(),
                input.occurred_on,
            )
            .await
    }

    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        month: Option<&str>,
    ) -> Result<Vec<PfTransaction>, AppError> {
        let range = month.map(month_range).transpose()?;
        self.repo.list_transactions(user_id, range).await
    }

    pub async fn delete_transaction(&self, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_transaction(&self.pool, user_id, id).await? {
            return Err(AppError::ResourceNotFound("Lançamento".into()));
        }
        Ok(())
    }

    pub async fn summary(&self, user_id: Uuid, month: &str) -> Result<MonthSummary, AppError> {
        let (from, to) = month_range(month)?;
        let totals = self.repo.totals_by_category(user_id, from, to).await?;
        Ok(MonthSummary::from_totals(month.trim().to_string(), totals))
    }

    pub async fn export_csv(&self, user_id: Uuid, month: Option<&str>) -> Result<Vec<u8>, AppError> {
        let categories: HashMap<Uuid, String> = self
            .repo
            .list_categories(user_id)
            .await?
            .into_iter()
            .map(|c| (c.id, c.name))
            .collect();

        let rows: Vec<PfTransactionCsvRow> = self
            .list_transactions(user_id, month)
            .await?
            .into_iter()
            .map(|t| PfTransactionCsvRow {
                data: t.occurred_on,
                tipo: t.kind.as_str(),
                categoria: t
                    .category_id
                    .and_then(|id| categories.get(&id).cloned())
                    .unwrap_or_default(),
                valor: t.amount.round_dp(2).to_string(),
                descricao: t.description,
            })
            .collect();
        render_csv(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_month_is_a_field_error() {
        match month_range("2026/10") {
            Err(AppError::ValidationError(errors)) => {
                assert!(errors.field_errors().contains_key("month"));
            }
            other => panic!("esperava erro de validação, veio {:?}", other),
        }
        assert!(month_range("2026-10").is_ok());
    }
}
