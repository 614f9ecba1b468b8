// src/db/finance_repo.rs

use chrono::NaiveDate;
use sqlx::{Executor, PgConnection, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{error::AppError, reference::Reference},
    models::finance::{
        ApBill, ArReceivable, CashBalance, CashMovement, NewCashMovement, NewSettlement,
        SettlementStatus,
    },
};

#[derive(Clone)]
pub struct FinanceRepository {
    pool: PgPool,
}

impl FinanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CONTAS A PAGAR
    // =========================================================================

    /// Uma conta por referência: tenta inserir e, se já existir, devolve a existente.
    pub async fn get_or_create_bill(
        &self,
        conn: &mut PgConnection,
        new: &NewSettlement,
    ) -> Result<(ApBill, bool), AppError> {
        let inserted = sqlx::query_as::<_, ApBill>(
            r#"
            INSERT INTO ap_bills (supplier_id, reference_type, reference_id, description, amount, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (reference_type, reference_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(new.counterparty_id)
        .bind(&new.reference.kind)
        .bind(new.reference.id)
        .bind(&new.description)
        .bind(new.amount)
        .bind(new.due_date)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(bill) = inserted {
            return Ok((bill, true));
        }

        let existing = self.find_bill_by_reference(&mut *conn, &new.reference).await?;
        Ok((existing.ok_or(sqlx::Error::RowNotFound)?, false))
    }

    pub async fn find_bill_by_reference<'e, E>(
        &self,
        executor: E,
        reference: &Reference,
    ) -> Result<Option<ApBill>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, ApBill>(
            "SELECT * FROM ap_bills WHERE reference_type = $1 AND reference_id = $2",
        )
        .bind(&reference.kind)
        .bind(reference.id)
        .fetch_optional(executor)
        .await?;
        Ok(bill)
    }

    pub async fn lock_bill<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ApBill>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, ApBill>("SELECT * FROM ap_bills WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(bill)
    }

    pub async fn list_bills(&self, status: Option<SettlementStatus>) -> Result<Vec<ApBill>, AppError> {
        let bills = sqlx::query_as::<_, ApBill>(
            r#"
            SELECT * FROM ap_bills
            WHERE ($1::settlement_status IS NULL OR status = $1)
            ORDER BY due_date ASC, created_at ASC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(bills)
    }

    pub async fn mark_bill_paid<'e, E>(&self, executor: E, id: Uuid) -> Result<ApBill, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let bill = sqlx::query_as::<_, ApBill>(
            "UPDATE ap_bills SET status = 'PAID', paid_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(executor)
        .await?;
        Ok(bill)
    }

    // =========================================================================
    //  CONTAS A RECEBER
    // =========================================================================

    pub async fn get_or_create_receivable(
        &self,
        conn: &mut PgConnection,
        new: &NewSettlement,
    ) -> Result<(ArReceivable, bool), AppError> {
        let inserted = sqlx::query_as::<_, ArReceivable>(
            r#"
            INSERT INTO ar_receivables (customer_id, reference_type, reference_id, description, amount, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (reference_type, reference_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(new.counterparty_id)
        .bind(&new.reference.kind)
        .bind(new.reference.id)
        .bind(&new.description)
        .bind(new.amount)
        .bind(new.due_date)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(receivable) = inserted {
            return Ok((receivable, true));
        }

        let existing = self
            .find_receivable_by_reference(&mut *conn, &new.reference)
            .await?;
        Ok((existing.ok_or(sqlx::Error::RowNotFound)?, false))
    }

    pub async fn find_receivable_by_reference<'e, E>(
        &self,
        executor: E,
        reference: &Reference,
    ) -> Result<Option<ArReceivable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let receivable = sqlx::query_as::<_, ArReceivable>(
            "SELECT * FROM ar_receivables WHERE reference_type = $1 AND reference_id = $2",
        )
        .bind(&reference.kind)
        .bind(reference.id)
        .fetch_optional(executor)
        .await?;
        Ok(receivable)
    }

    pub async fn lock_receivable<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<ArReceivable>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let receivable =
            sqlx::query_as::<_, ArReceivable>("SELECT * FROM ar_receivables WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(executor)
                .await?;
        Ok(receivable)
    }

    pub async fn list_receivables(
        &self,
        status: Option<SettlementStatus>,
    ) -> Result<Vec<ArReceivable>, AppError> {
        let receivables = sqlx::query_as::<_, ArReceivable>(
            r#"
            SELECT * FROM ar_receivables
            WHERE ($1::settlement_status IS NULL OR status = $1)
            ORDER BY due_date ASC, created_at ASC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(receivables)
    }

    /// Muda o status; PAID também carimba `received_at`.
    pub async fn set_receivable_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: SettlementStatus,
    ) -> Result<ArReceivable, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let receivable = sqlx::query_as::<_, ArReceivable>(
            r#"
            UPDATE ar_receivables
            SET status = $2,
                received_at = CASE WHEN $2 = 'PAID'::settlement_status THEN NOW() ELSE received_at END
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(status)
        .fetch_one(executor)
        .await?;
        Ok(receivable)
    }

    // =========================================================================
    //  CAIXA
    // =========================================================================

    /// Grava o movimento uma única vez por referência.
    pub async fn post_cash_once(
        &self,
        conn: &mut PgConnection,
        new: &NewCashMovement,
    ) -> Result<(CashMovement, bool), AppError> {
        let inserted = sqlx::query_as::<_, CashMovement>(
            r#"
            INSERT INTO cash_movements (direction, amount, description, reference_type, reference_id, occurred_on)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (reference_type, reference_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(new.direction)
        .bind(new.amount)
        .bind(&new.description)
        .bind(&new.reference.kind)
        .bind(new.reference.id)
        .bind(new.occurred_on)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(movement) = inserted {
            return Ok((movement, true));
        }

        let existing = sqlx::query_as::<_, CashMovement>(
            "SELECT * FROM cash_movements WHERE reference_type = $1 AND reference_id = $2",
        )
        .bind(&new.reference.kind)
        .bind(new.reference.id)
        .fetch_one(&mut *conn)
        .await?;
        Ok((existing, false))
    }

    pub async fn list_cash(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<CashMovement>, AppError> {
        let movements = sqlx::query_as::<_, CashMovement>(
            r#"
            SELECT * FROM cash_movements
            WHERE ($1::date IS NULL OR occurred_on >= $1)
              AND ($2::date IS NULL OR occurred_on <= $2)
            ORDER BY occurred_on ASC, created_at ASC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;
        Ok(movements)
    }

    pub async fn cash_balance(&self) -> Result<CashBalance, AppError> {
        let (total_in, total_out) = sqlx::query_as::<_, (rust_decimal::Decimal, rust_decimal::Decimal)>(
            r#"
            SELECT
                COALESCE(SUM(amount) FILTER (WHERE direction = 'IN'), 0),
                COALESCE(SUM(amount) FILTER (WHERE direction = 'OUT'), 0)
            FROM cash_movements
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(CashBalance {
            total_in,
            total_out,
            balance: total_in - total_out,
        })
    }
}
