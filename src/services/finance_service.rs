// src/services/finance_service.rs

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::{
        csv_export::render_csv,
        error::AppError,
        reference::{self, Reference},
    },
    db::FinanceRepository,
    models::finance::{
        ApBill, ArReceivable, CashBalance, CashDirection, CashMovement, CashMovementCsvRow,
        NewCashMovement, NewSettlement, SettlementCsvRow, SettlementStatus,
    },
};

// O dinheiro de um pedido entra pelos pagamentos; baixar a conta à mão lançaria caixa em dobro
fn ensure_manually_settleable(receivable: &ArReceivable) -> Result<(), AppError> {
    if receivable.reference_type == reference::ORDER {
        tracing::warn!(receivable_id = %receivable.id, order_id = %receivable.reference_id, "Baixa manual recusada para conta de pedido");
        return Err(AppError::Conflict("receivable_settled_by_payments"));
    }
    Ok(())
}

#[derive(Clone)]
pub struct FinanceService {
    repo: FinanceRepository,
    pool: PgPool,
}

impl FinanceService {
    pub fn new(repo: FinanceRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // =========================================================================
    //  CONTAS A PAGAR
    // =========================================================================

    /// Conta a pagar da origem; chamar de novo com a mesma referência devolve a mesma conta.
    pub async fn get_or_create_bill(
        &self,
        conn: &mut PgConnection,
        new: NewSettlement,
    ) -> Result<ApBill, AppError> {
        let (bill, created) = self.repo.get_or_create_bill(conn, &new).await?;
        if created {
            tracing::info!(bill_id = %bill.id, reference = %new.reference, amount = %bill.amount, "💸 Conta a pagar criada");
        } else {
            tracing::debug!(bill_id = %bill.id, reference = %new.reference, "Conta a pagar já existia");
        }
        Ok(bill)
    }

    pub async fn find_bill(
        &self,
        conn: &mut PgConnection,
        reference: &Reference,
    ) -> Result<Option<ApBill>, AppError> {
        self.repo.find_bill_by_reference(conn, reference).await
    }

    pub async fn create_manual_bill(
        &self,
        supplier_id: Option<Uuid>,
        description: &str,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Result<ApBill, AppError> {
        let mut tx = self.pool.begin().await?;
        let bill = self
            .get_or_create_bill(
                &mut tx,
                NewSettlement {
                    reference: Reference::manual(),
                    counterparty_id: supplier_id,
                    description: description.trim().to_string(),
                    amount,
                    due_date,
                },
            )
            .await?;
        tx.commit().await?;
        Ok(bill)
    }

    pub async fn list_bills(&self, status: Option<SettlementStatus>) -> Result<Vec<ApBill>, AppError> {
        self.repo.list_bills(status).await
    }

    /// OPEN -> PAID com uma única saída de caixa. Pagar de novo não faz nada.
    pub async fn pay_bill(&self, bill_id: Uuid) -> Result<ApBill, AppError> {
        let mut tx = self.pool.begin().await?;

        let bill = self
            .repo
            .lock_bill(&mut *tx, bill_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Conta a pagar".into()))?;

        match bill.status {
            SettlementStatus::Paid => return Ok(bill),
            SettlementStatus::Cancelled => {
                return Err(AppError::InvalidStateTransition {
                    entity: "Conta a pagar",
                    from: bill.status.as_str().into(),
                    to: SettlementStatus::Paid.as_str().into(),
                });
            }
            SettlementStatus::Open => {}
        }

        let paid = self.repo.mark_bill_paid(&mut *tx, bill.id).await?;
        self.post_once(
            &mut tx,
            NewCashMovement {
                reference: Reference::ap_bill(bill.id),
                direction: CashDirection::Out,
                amount: bill.amount,
                description: bill.description.clone(),
                occurred_on: Utc::now().date_naive(),
            },
        )
        .await?;

        tx.commit().await?;
        tracing::info!(bill_id = %paid.id, "Conta a pagar quitada");
        Ok(paid)
    }

    // =========================================================================
    //  CONTAS A RECEBER
    // =========================================================================

    pub async fn get_or_create_receivable(
        &self,
        conn: &mut PgConnection,
        new: NewSettlement,
    ) -> Result<ArReceivable, AppError> {
        let (receivable, created) = self.repo.get_or_create_receivable(conn, &new).await?;
        if created {
            tracing::info!(receivable_id = %receivable.id, reference = %new.reference, amount = %receivable.amount, "💰 Conta a receber criada");
        } else {
            tracing::debug!(receivable_id = %receivable.id, reference = %new.reference, "Conta a receber já existia");
        }
        Ok(receivable)
    }

    pub async fn find_receivable(
        &self,
        conn: &mut PgConnection,
        reference: &Reference,
    ) -> Result<Option<ArReceivable>, AppError> {
        self.repo.find_receivable_by_reference(conn, reference).await
    }

    pub async fn list_receivables(
        &self,
        status: Option<SettlementStatus>,
    ) -> Result<Vec<ArReceivable>, AppError> {
        self.repo.list_receivables(status).await
    }

    /// Baixa manual: OPEN -> PAID com uma entrada de caixa referenciando a própria conta.
    /// Contas de pedidos só são quitadas pela confirmação dos pagamentos.
    pub async fn settle_receivable(&self, receivable_id: Uuid) -> Result<ArReceivable, AppError> {
        let mut tx = self.pool.begin().await?;

        let receivable = self
            .repo
            .lock_receivable(&mut *tx, receivable_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Conta a receber".into()))?;

        match receivable.status {
            SettlementStatus::Paid => return Ok(receivable),
            SettlementStatus::Cancelled => {
                return Err(AppError::InvalidStateTransition {
                    entity: "Conta a receber",
                    from: receivable.status.as_str().into(),
                    to: SettlementStatus::Paid.as_str().into(),
                });
            }
            SettlementStatus::Open => {}
        }
        ensure_manually_settleable(&receivable)?;

        let settled = self
            .repo
            .set_receivable_status(&mut *tx, receivable.id, SettlementStatus::Paid)
            .await?;
        self.post_once(
            &mut tx,
            NewCashMovement {
                reference: Reference::ar_receivable(receivable.id),
                direction: CashDirection::In,
                amount: receivable.amount,
                description: receivable.description.clone(),
                occurred_on: Utc::now().date_naive(),
            },
        )
        .await?;

        tx.commit().await?;
        tracing::info!(receivable_id = %settled.id, "Conta a receber baixada");
        Ok(settled)
    }

    /// Marca como paga sem mexer no caixa (o dinheiro já entrou pelos pagamentos).
    pub async fn mark_receivable_paid(
        &self,
        conn: &mut PgConnection,
        reference: &Reference,
    ) -> Result<Option<ArReceivable>, AppError> {
        let Some(receivable) = self.repo.find_receivable_by_reference(&mut *conn, reference).await? else {
            return Ok(None);
        };
        if receivable.status != SettlementStatus::Open {
            return Ok(Some(receivable));
        }
        let paid = self
            .repo
            .set_receivable_status(&mut *conn, receivable.id, SettlementStatus::Paid)
            .await?;
        Ok(Some(paid))
    }

    /// Cancela a conta a receber da origem, se ela ainda estiver em aberto.
    pub async fn cancel_for_reference(
        &self,
        conn: &mut PgConnection,
        reference: &Reference,
    ) -> Result<Option<ArReceivable>, AppError> {
        let Some(receivable) = self.repo.find_receivable_by_reference(&mut *conn, reference).await? else {
            return Ok(None);
        };
        if receivable.status != SettlementStatus::Open {
            return Ok(Some(receivable));
        }
        let cancelled = self
            .repo
            .set_receivable_status(&mut *conn, receivable.id, SettlementStatus::Cancelled)
            .await?;
        tracing::info!(receivable_id = %cancelled.id, %reference, "Conta a receber cancelada");
        Ok(Some(cancelled))
    }

    // =========================================================================
    //  CAIXA
    // =========================================================================

    /// No máximo um movimento por referência. Valores zerados não geram movimento.
    pub async fn post_once(
        &self,
        conn: &mut PgConnection,
        new: NewCashMovement,
    ) -> Result<Option<CashMovement>, AppError> {
        if new.amount <= Decimal::ZERO {
            return Ok(None);
        }
        let (movement, created) = self.repo.post_cash_once(conn, &new).await?;
        if created {
            tracing::info!(
                movement_id = %movement.id,
                reference = %new.reference,
                direction = ?movement.direction,
                amount = %movement.amount,
                "Movimento de caixa lançado"
            );
        }
        Ok(Some(movement))
    }

    pub async fn list_cash(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<CashMovement>, AppError> {
        self.repo.list_cash(from, to).await
    }

    pub async fn cash_balance(&self) -> Result<CashBalance, AppError> {
        self.repo.cash_balance().await
    }

    // =========================================================================
    //  EXPORTAÇÕES
    // =========================================================================

    pub async fn export_cash_csv(
        &self,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Vec<u8>, AppError> {
        let rows: Vec<CashMovementCsvRow> =
            self.list_cash(from, to).await?.iter().map(Into::into).collect();
        render_csv(&rows)
    }

    pub async fn export_bills_csv(&self, status: Option<SettlementStatus>) -> Result<Vec<u8>, AppError> {
        let rows: Vec<SettlementCsvRow> = self.list_bills(status).await?.iter().map(Into::into).collect();
        render_csv(&rows)
    }

    pub async fn export_receivables_csv(
        &self,
        status: Option<SettlementStatus>,
    ) -> Result<Vec<u8>, AppError> {
        let rows: Vec<SettlementCsvRow> =
            self.list_receivables(status).await?.iter().map(Into::into).collect();
        render_csv(&rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn receivable(reference: Reference) -> ArReceivable {
        ArReceivable {
            id: Uuid::new_v4(),
            customer_id: None,
            reference_type: reference.kind,
            reference_id: reference.id,
            description: "Pedido".into(),
            amount: Decimal::new(3000, 2),
            due_date: Utc::now().date_naive(),
            status: SettlementStatus::Open,
            received_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_order_receivable_is_not_settled_by_hand() {
        let from_order = receivable(Reference::order(Uuid::new_v4()));
        assert!(matches!(
            ensure_manually_settleable(&from_order),
            Err(AppError::Conflict("receivable_settled_by_payments"))
        ));

        let manual = receivable(Reference::manual());
        assert!(ensure_manually_settleable(&manual).is_ok());
    }
}
