// src/handlers/orders.rs

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
        validation::validate_amount,
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermOrdersRead, PermOrdersWrite, RequirePermission},
    },
    models::orders::{Order, OrderDetail, OrderStatus, Payment, PaymentMethod},
    services::order_service::OrderLineInput,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLinePayload {
    pub menu_item_id: Uuid,

    #[validate(range(min = 1, max = 100_000, message = "out_of_range"))]
    #[schema(example = 2)]
    pub quantity: i32,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    pub customer_id: Option<Uuid>,

    #[schema(value_type = String, format = Date, example = "2026-10-16")]
    pub menu_date: NaiveDate,

    #[serde(default)]
    #[validate(nested)]
    pub items: Vec<OrderLinePayload>,

    #[schema(example = "Sem cebola")]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPaymentPayload {
    #[validate(custom(function = "validate_amount"))]
    #[schema(example = "59.80")]
    pub amount: Decimal,

    #[schema(example = "PIX")]
    pub method: PaymentMethod,
}

#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
}

// POST /api/v1/orders
#[utoipa::path(
    post,
    path = "/api/v1/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado como PENDING", body = OrderDetail),
        (status = 400, description = "Pedido sem itens"),
        (status = 422, description = "Item fora do cardápio do dia ou inativo")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermOrdersWrite>,
    Json(payload): Json<CreateOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let lines = payload
        .items
        .iter()
        .map(|l| OrderLineInput {
            menu_item_id: l.menu_item_id,
            quantity: l.quantity,
        })
        .collect();

    let order = app_state
        .order_service
        .create_order(
            payload.customer_id,
            payload.menu_date,
            lines,
            payload.notes.as_deref(),
            user.id,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(order)))
}

// GET /api/v1/orders?status=CONFIRMED
#[utoipa::path(
    get,
    path = "/api/v1/orders",
    tag = "Orders",
    params(("status" = Option<OrderStatus>, Query, description = "Filtra por status")),
    responses((status = 200, description = "Pedidos", body = Vec<Order>)),
    security(("api_jwt" = []))
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOrdersRead>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<Vec<Order>>, ApiError> {
    let orders = app_state
        .order_service
        .list_orders(query.status)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(orders))
}

// GET /api/v1/orders/{id}
#[utoipa::path(
    get,
    path = "/api/v1/orders/{id}",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses((status = 200, description = "Pedido com itens, pagamentos e título a receber", body = OrderDetail)),
    security(("api_jwt" = []))
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOrdersRead>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = app_state
        .order_service
        .get_order(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(order))
}

// POST /api/v1/orders/{id}/confirm
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/confirm",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido confirmado e título a receber garantido", body = OrderDetail),
        (status = 409, description = "Pedido cancelado")
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOrdersWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = app_state
        .order_service
        .confirm_order(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(order))
}

// POST /api/v1/orders/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/cancel",
    tag = "Orders",
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 200, description = "Pedido cancelado", body = OrderDetail),
        (status = 422, description = "Pedido com pagamento confirmado")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_order(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOrdersWrite>,
    Path(id): Path<Uuid>,
) -> Result<Json<OrderDetail>, ApiError> {
    let order = app_state
        .order_service
        .cancel_order(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(order))
}

// POST /api/v1/orders/{id}/payments
#[utoipa::path(
    post,
    path = "/api/v1/orders/{id}/payments",
    tag = "Orders",
    request_body = RegisterPaymentPayload,
    params(("id" = Uuid, Path, description = "ID do pedido")),
    responses(
        (status = 201, description = "Pagamento registrado como PENDING", body = Payment),
        (status = 422, description = "Pedido não confirmado ou valor acima do saldo")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOrdersWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RegisterPaymentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let payment = app_state
        .order_service
        .register_payment(id, payload.amount, payload.method)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(payment)))
}

// POST /api/v1/orders/payments/{payment_id}/confirm
#[utoipa::path(
    post,
    path = "/api/v1/orders/payments/{payment_id}/confirm",
    tag = "Orders",
    params(("payment_id" = Uuid, Path, description = "ID do pagamento")),
    responses(
        (status = 200, description = "Pagamento confirmado com entrada no caixa", body = Payment)
    ),
    security(("api_jwt" = []))
)]
pub async fn confirm_payment(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermOrdersWrite>,
    Path(payment_id): Path<Uuid>,
) -> Result<Json<Payment>, ApiError> {
    let payment = app_state
        .order_service
        .confirm_payment(payment_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(payment))
}
