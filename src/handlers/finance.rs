// src/handlers/finance.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        csv_export::csv_response,
        error::{ApiError, AppError},
        validation::validate_amount,
    },
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermFinanceRead, PermFinanceWrite, RequirePermission},
    },
    models::finance::{ApBill, ArReceivable, CashBalance, CashMovement, SettlementStatus},
};

#[derive(Debug, Deserialize)]
pub struct SettlementListQuery {
    pub status: Option<SettlementStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CashPeriodQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

// =============================================================================
//  1. CONTAS A PAGAR
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBillPayload {
    pub supplier_id: Option<Uuid>,

    #[validate(length(min = 1, max = 200, message = "required"))]
    #[schema(example = "Conta de energia de outubro")]
    pub description: String,

    #[validate(custom(function = "validate_amount"))]
    #[schema(example = "480.00")]
    pub amount: Decimal,

    #[schema(value_type = String, format = Date, example = "2026-11-10")]
    pub due_date: NaiveDate,
}

// POST /api/v1/finance/bills
#[utoipa::path(
    post,
    path = "/api/v1/finance/bills",
    tag = "Finance",
    request_body = CreateBillPayload,
    responses((status = 201, description = "Conta a pagar avulsa", body = ApBill)),
    security(("api_jwt" = []))
)]
pub async fn create_bill(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermFinanceWrite>,
    Json(payload): Json<CreateBillPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let bill = app_state
        .finance_service
        .create_manual_bill(
            payload.supplier_id,
            payload.description.trim(),
            payload.amount,
            payload.due_date,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(bill)))
}

// GET /api/v1/finance/bills?status=OPEN
#[utoipa::path(
    get,
    path = "/api/v1/finance/bills",
    tag = "Finance",
    params(("status" = Option<SettlementStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Contas a pagar", body = Vec<ApBill>)),
    security(("api_jwt" = []))
)]
pub async fn list_bills(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermFinanceRead>,
    Query(query): Query<SettlementListQuery>,
) -> Result<Json<Vec<ApBill>>, ApiError> {
    let bills = app_state
        .finance_service
        .list_bills(query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(bills))
}

// POST /api/v1/finance/bills/{id}/pay
#[utoipa::path(
    post,
    path = "/api/v1/finance/bills/{id}/pay",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da conta a pagar")),
    responses(
        (status = 200, description = "Conta paga com saída no caixa (idempotente)", body = ApBill),
        (status = 409, description = "Conta cancelada")
    ),
    security(("api_jwt" = []))
)]
pub async fn pay_bill(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermFinanceWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApBill>, ApiError> {
    let bill = app_state
        .finance_service
        .pay_bill(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(bill))
}

// =============================================================================
//  2. CONTAS A RECEBER
// =============================================================================

// GET /api/v1/finance/receivables?status=OPEN
#[utoipa::path(
    get,
    path = "/api/v1/finance/receivables",
    tag = "Finance",
    params(("status" = Option<SettlementStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Contas a receber", body = Vec<ArReceivable>)),
    security(("api_jwt" = []))
)]
pub async fn list_receivables(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermFinanceRead>,
    Query(query): Query<SettlementListQuery>,
) -> Result<Json<Vec<ArReceivable>>, ApiError> {
    let receivables = app_state
        .finance_service
        .list_receivables(query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(receivables))
}

// POST /api/v1/finance/receivables/{id}/settle
#[utoipa::path(
    post,
    path = "/api/v1/finance/receivables/{id}/settle",
    tag = "Finance",
    params(("id" = Uuid, Path, description = "ID da conta a receber")),
    responses(
        (status = 200, description = "Recebimento baixado com entrada no caixa (idempotente)", body = ArReceivable)
    ),
    security(("api_jwt" = []))
)]
pub async fn settle_receivable(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermFinanceWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArReceivable>, ApiError> {
    let receivable = app_state
        .finance_service
        .settle_receivable(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(receivable))
}

// =============================================================================
//  3. CAIXA
// =============================================================================

// GET /api/v1/finance/cash?from=2026-10-01&to=2026-10-31
#[utoipa::path(
    get,
    path = "/api/v1/finance/cash",
    tag = "Finance",
    params(
        ("from" = Option<String>, Query, description = "Data inicial (AAAA-MM-DD)"),
        ("to" = Option<String>, Query, description = "Data final (AAAA-MM-DD)")
    ),
    responses((status = 200, description = "Movimentos de caixa", body = Vec<CashMovement>)),
    security(("api_jwt" = []))
)]
pub async fn list_cash(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermFinanceRead>,
    Query(query): Query<CashPeriodQuery>,
) -> Result<Json<Vec<CashMovement>>, ApiError> {
    let movements = app_state
        .finance_service
        .list_cash(query.from, query.to)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(movements))
}

// GET /api/v1/finance/cash/balance
#[utoipa::path(
    get,
    path = "/api/v1/finance/cash/balance",
    tag = "Finance",
    responses((status = 200, description = "Entradas, saídas e saldo do caixa", body = CashBalance)),
    security(("api_jwt" = []))
)]
pub async fn cash_balance(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermFinanceRead>,
) -> Result<Json<CashBalance>, ApiError> {
    let balance = app_state
        .finance_service
        .cash_balance()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(balance))
}

// =============================================================================
//  4. EXPORTAÇÕES CSV
// =============================================================================

// GET /api/v1/finance/exports/cash.csv
#[utoipa::path(
    get,
    path = "/api/v1/finance/exports/cash.csv",
    tag = "Finance",
    params(
        ("from" = Option<String>, Query, description = "Data inicial (AAAA-MM-DD)"),
        ("to" = Option<String>, Query, description = "Data final (AAAA-MM-DD)")
    ),
    responses((status = 200, description = "Movimentos de caixa em CSV", content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn export_cash(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermFinanceRead>,
    Query(query): Query<CashPeriodQuery>,
) -> Result<Response, ApiError> {
    let body = app_state
        .finance_service
        .export_cash_csv(query.from, query.to)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(csv_response("caixa.csv", body))
}

// GET /api/v1/finance/exports/bills.csv
#[utoipa::path(
    get,
    path = "/api/v1/finance/exports/bills.csv",
    tag = "Finance",
    params(("status" = Option<SettlementStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Contas a pagar em CSV", content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn export_bills(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermFinanceRead>,
    Query(query): Query<SettlementListQuery>,
) -> Result<Response, ApiError> {
    let body = app_state
        .finance_service
        .export_bills_csv(query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(csv_response("contas-a-pagar.csv", body))
}

// GET /api/v1/finance/exports/receivables.csv
#[utoipa::path(
    get,
    path = "/api/v1/finance/exports/receivables.csv",
    tag = "Finance",
    params(("status" = Option<SettlementStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Contas a receber em CSV", content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn export_receivables(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermFinanceRead>,
    Query(query): Query<SettlementListQuery>,
) -> Result<Response, ApiError> {
    let body = app_state
        .finance_service
        .export_receivables_csv(query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(csv_response("contas-a-receber.csv", body))
}
