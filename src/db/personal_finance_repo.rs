// src/db/personal_finance_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::personal_finance::{CategoryTotal, EntryKind, PfCategory, PfTransaction},
};

// Tudo aqui é filtrado pelo dono (user_id); nenhum usuário enxerga dados de outro.
#[derive(Clone)]
pub struct PersonalFinanceRepository {
    pool: PgPool,
}

impl PersonalFinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        name: &str,
        kind: EntryKind,
    ) -> Result<PfCategory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PfCategory>(
            "INSERT INTO pf_categories (user_id, name, kind) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user_id)
        .bind(name)
        .bind(kind)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation("Categoria".into());
                }
            }
            e.into()
        })
    }

    pub async fn list_categories(&self, user_id: Uuid) -> Result<Vec<PfCategory>, AppError> {
        let categories = sqlx::query_as::<_, PfCategory>(
            "SELECT * FROM pf_categories WHERE user_id = $1 ORDER BY kind, name",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    pub async fn find_category(
        &self,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<Option<PfCategory>, AppError> {
        let category = sqlx::query_as::<_, PfCategory>(
            "SELECT * FROM pf_categories WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    pub async fn create_transaction<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        category_id: Option<Uuid>,
        kind: EntryKind,
        amount: Decimal,
        description: &str,
        occurred_on: NaiveDate,
    ) -> Result<PfTransaction, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let transaction = sqlx::query_as::<_, PfTransaction>(
            r#"
            INSERT INTO pf_transactions (user_id, category_id, kind, amount, description, occurred_on)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(category_id)
        .bind(kind)
        .bind(amount)
        .bind(description)
        .bind(occurred_on)
        .fetch_one(executor)
        .await?;
        Ok(transaction)
    }

    /// Transações do usuário, opcionalmente restritas ao intervalo [from, to).
    pub async fn list_transactions(
        &self,
        user_id: Uuid,
        range: Option<(NaiveDate, NaiveDate)>,
    ) -> Result<Vec<PfTransaction>, AppError> {
        let (from, to) = range.unzip();
        let transactions = sqlx::query_as::<_, PfTransaction>(
            r#"
            SELECT * FROM pf_transactions
            WHERE user_id = $1
              AND ($2::date IS NULL OR occurred_on >= $2)
              AND ($3::date IS NULL OR occurred_on < $3)
            ORDER BY occurred_on DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(transactions)
    }

    pub async fn delete_transaction<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM pf_transactions WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn totals_by_category(
        &self,
        user_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CategoryTotal>, AppError> {
        let totals = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT
                t.category_id,
                COALESCE(c.name, 'Sem categoria') AS category_name,
                t.kind,
                SUM(t.amount) AS total
            FROM pf_transactions t
            LEFT JOIN pf_categories c ON c.id = t.category_id
            WHERE t.user_id = $1 AND t.occurred_on >= $2 AND t.occurred_on < $3
            GROUP BY t.category_id, c.name, t.kind
            ORDER BY t.kind, total DESC
            "#,
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(totals)
    }
}
