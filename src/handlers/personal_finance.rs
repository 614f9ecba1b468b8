// src/handlers/personal_finance.rs

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
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermPersonalFinance, RequirePermission},
    },
    models::personal_finance::{EntryKind, MonthSummary, PfCategory, PfTransaction},
    services::personal_finance_service::NewPfTransaction,
};

// Tudo aqui é do usuário autenticado; não existe acesso a dados de outra pessoa.

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, max = 60, message = "required"))]
    #[schema(example = "Mercado")]
    pub name: String,

    #[schema(example = "EXPENSE")]
    pub kind: EntryKind,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionPayload {
    pub kind: EntryKind,

    #[validate(custom(function = "validate_amount"))]
    #[schema(example = "152.30")]
    pub amount: Decimal,

    #[validate(length(max = 200, message = "too_long"))]
    #[serde(default)]
    pub description: String,

    #[schema(value_type = String, format = Date, example = "2026-10-16")]
    pub occurred_on: NaiveDate,

    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    pub month: String,
}

// POST /api/v1/personal-finance/categories
#[utoipa::path(
    post,
    path = "/api/v1/personal-finance/categories",
    tag = "Personal Finance",
    request_body = CreateCategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = PfCategory),
        (status = 409, description = "Categoria já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermPersonalFinance>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let category = app_state
        .personal_finance_service
        .create_category(user.id, &payload.name, payload.kind)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(category)))
}

// GET /api/v1/personal-finance/categories
#[utoipa::path(
    get,
    path = "/api/v1/personal-finance/categories",
    tag = "Personal Finance",
    responses((status = 200, description = "Categorias do usuário", body = Vec<PfCategory>)),
    security(("api_jwt" = []))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermPersonalFinance>,
) -> Result<Json<Vec<PfCategory>>, ApiError> {
    let categories = app_state
        .personal_finance_service
        .list_categories(user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(categories))
}

// POST /api/v1/personal-finance/transactions
#[utoipa::path(
    post,
    path = "/api/v1/personal-finance/transactions",
    tag = "Personal Finance",
    request_body = CreateTransactionPayload,
    responses(
        (status = 201, description = "Lançamento criado", body = PfTransaction),
        (status = 422, description = "Categoria de tipo diferente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermPersonalFinance>,
    Json(payload): Json<CreateTransactionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let transaction = app_state
        .personal_finance_service
        .create_transaction(
            user.id,
            NewPfTransaction {
                kind: payload.kind,
                amount: payload.amount,
                description: payload.description,
                occurred_on: payload.occurred_on,
                category_id: payload.category_id,
            },
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

// GET /api/v1/personal-finance/transactions?month=2026-10
#[utoipa::path(
    get,
    path = "/api/v1/personal-finance/transactions",
    tag = "Personal Finance",
    params(("month" = Option<String>, Query, description = "Mês no formato AAAA-MM")),
    responses((status = 200, description = "Lançamentos do usuário", body = Vec<PfTransaction>)),
    security(("api_jwt" = []))
)]
pub async fn list_transactions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermPersonalFinance>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<Vec<PfTransaction>>, ApiError> {
    let transactions = app_state
        .personal_finance_service
        .list_transactions(user.id, query.month.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(transactions))
}

// DELETE /api/v1/personal-finance/transactions/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/personal-finance/transactions/{id}",
    tag = "Personal Finance",
    params(("id" = Uuid, Path, description = "ID do lançamento")),
    responses(
        (status = 204, description = "Lançamento removido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_transaction(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermPersonalFinance>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .personal_finance_service
        .delete_transaction(user.id, id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(StatusCode::NO_CONTENT)
}

// GET /api/v1/personal-finance/summary?month=2026-10
#[utoipa::path(
    get,
    path = "/api/v1/personal-finance/summary",
    tag = "Personal Finance",
    params(("month" = String, Query, description = "Mês no formato AAAA-MM")),
    responses(
        (status = 200, description = "Receitas, despesas, saldo e totais por categoria", body = MonthSummary),
        (status = 400, description = "Mês inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn month_summary(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermPersonalFinance>,
    Query(query): Query<SummaryQuery>,
) -> Result<Json<MonthSummary>, ApiError> {
    let summary = app_state
        .personal_finance_service
        .summary(user.id, &query.month)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(summary))
}

// GET /api/v1/personal-finance/export.csv?month=2026-10
#[utoipa::path(
    get,
    path = "/api/v1/personal-finance/export.csv",
    tag = "Personal Finance",
    params(("month" = Option<String>, Query, description = "Mês no formato AAAA-MM")),
    responses((status = 200, description = "Lançamentos em CSV", content_type = "text/csv")),
    security(("api_jwt" = []))
)]
pub async fn export_transactions(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermPersonalFinance>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, ApiError> {
    let body = app_state
        .personal_finance_service
        .export_csv(user.id, query.month.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(csv_response("financas-pessoais.csv", body))
}
