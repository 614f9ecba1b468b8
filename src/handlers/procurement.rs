// src/handlers/procurement.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
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
        error::{ApiError, AppError},
        validation::{validate_quantity, validate_unit_cost},
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermProcurementRead, PermProcurementWrite, RequirePermission},
    },
    models::procurement::{
        NewPurchaseLine, PurchaseOrder, PurchaseOrderDetail, PurchaseStatus, Supplier,
    },
};

// --- Fornecedores ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSupplierPayload {
    #[validate(length(min = 1, max = 120, message = "required"))]
    #[schema(example = "Hortifruti Central")]
    pub name: String,

    #[validate(email(message = "invalid_email"))]
    pub contact_email: Option<String>,

    #[validate(length(max = 30, message = "too_long"))]
    pub phone: Option<String>,
}

// POST /api/v1/procurement/suppliers
#[utoipa::path(
    post,
    path = "/api/v1/procurement/suppliers",
    tag = "Procurement",
    request_body = CreateSupplierPayload,
    responses(
        (status = 201, description = "Fornecedor criado", body = Supplier),
        (status = 409, description = "Nome de fornecedor já usado")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProcurementWrite>,
    Json(payload): Json<CreateSupplierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let supplier = app_state
        .procurement_service
        .create_supplier(&payload.name, payload.contact_email.as_deref(), payload.phone.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(supplier)))
}

// GET /api/v1/procurement/suppliers
#[utoipa::path(
    get,
    path = "/api/v1/procurement/suppliers",
    tag = "Procurement",
    responses((status = 200, description = "Fornecedores", body = Vec<Supplier>)),
    security(("api_jwt" = []))
)]
pub async fn list_suppliers(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProcurementRead>,
) -> Result<Json<Vec<Supplier>>, ApiError> {
    let suppliers = app_state
        .procurement_service
        .list_suppliers()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(suppliers))
}

// --- Pedidos de compra ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseLinePayload {
    pub ingredient_id: Uuid,

    #[validate(custom(function = "validate_quantity"))]
    #[schema(example = "25")]
    pub quantity: Decimal,

    #[validate(custom(function = "validate_unit_cost"))]
    #[schema(example = "4.90")]
    pub unit_cost: Decimal,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePurchaseOrderPayload {
    pub supplier_id: Uuid,

    #[schema(value_type = Option<String>, format = Date, example = "2026-10-20")]
    pub expected_date: Option<NaiveDate>,

    pub notes: Option<String>,

    #[validate(nested)]
    pub items: Vec<PurchaseLinePayload>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseListQuery {
    pub status: Option<PurchaseStatus>,
}

// POST /api/v1/procurement/orders
#[utoipa::path(
    post,
    path = "/api/v1/procurement/orders",
    tag = "Procurement",
    request_body = CreatePurchaseOrderPayload,
    responses(
        (status = 201, description = "Pedido de compra em rascunho", body = PurchaseOrderDetail),
        (status = 422, description = "Pedido sem itens")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_purchase_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProcurementWrite>,
    Json(payload): Json<CreatePurchaseOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lines = payload
        .items
        .iter()
        .map(|l| NewPurchaseLine {
            ingredient_id: l.ingredient_id,
            quantity: l.quantity,
            unit_cost: l.unit_cost,
        })
        .collect();

    let order = app_state
        .procurement_service
        .create_order(payload.supplier_id, payload.expected_date, payload.notes.as_deref(), lines)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(order)))
}

// GET /api/v1/procurement/orders?status=ORDERED
#[utoipa::path(
    get,
    path = "/api/v1/procurement/orders",
    tag = "Procurement",
    params(("status" = Option<PurchaseStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Pedidos de compra", body = Vec<PurchaseOrder>)),
    security(("api_jwt" = []))
)]
pub async fn list_purchase_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProcurementRead>,
    Query(query): Query<PurchaseListQuery>,
) -> Result<Json<Vec<PurchaseOrder>>, ApiError> {
    let orders = app_state
        .procurement_service
        .list_orders(query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(orders))
}

// GET /api/v1/procurement/orders/{id}
#[utoipa::path(
    get,
    path = "/api/v1/procurement/orders/{id}",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "ID do pedido de compra")),
    responses((status = 200, description = "Pedido com itens e conta gerada", body = PurchaseOrderDetail)),
    security(("api_jwt" = []))
)]
pub async fn get_purchase_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProcurementRead>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseOrderDetail>, ApiError> {
    let order = app_state
        .procurement_service
        .get_order(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(order))
}

// POST /api/v1/procurement/orders/{id}/submit
#[utoipa::path(
    post,
    path = "/api/v1/procurement/orders/{id}/submit",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "ID do pedido de compra")),
    responses(
        (status = 200, description = "Pedido enviado ao fornecedor", body = PurchaseOrder),
        (status = 409, description = "Transição inválida")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_purchase_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProcurementWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseOrder>, ApiError> {
    let order = app_state
        .procurement_service
        .submit_order(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(order))
}

// POST /api/v1/procurement/orders/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/v1/procurement/orders/{id}/cancel",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "ID do pedido de compra")),
    responses((status = 200, description = "Pedido cancelado", body = PurchaseOrder)),
    security(("api_jwt" = []))
)]
pub async fn cancel_purchase_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermProcurementWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseOrder>, ApiError> {
    let order = app_state
        .procurement_service
        .cancel_order(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(order))
}

// POST /api/v1/procurement/orders/{id}/receive
#[utoipa::path(
    post,
    path = "/api/v1/procurement/orders/{id}/receive",
    tag = "Procurement",
    params(("id" = Uuid, Path, description = "ID do pedido de compra")),
    responses(
        (status = 200, description = "Mercadoria recebida: entradas no estoque e conta a pagar", body = PurchaseOrderDetail)
    ),
    security(("api_jwt" = []))
)]
pub async fn receive_purchase_order(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermProcurementWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseOrderDetail>, ApiError> {
    let order = app_state
        .procurement_service
        .receive_order(id, user.id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(order))
}
