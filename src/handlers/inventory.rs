// src/handlers/inventory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::{ApiError, AppError},
        reference::Reference,
        validation::{
            validate_manual_reference_type, validate_quantity, validate_threshold,
            validate_unit_cost,
        },
    },
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        i18n::Locale,
        rbac::{PermInventoryRead, PermInventoryWrite, RequirePermission},
    },
    models::inventory::{MovementKind, NewStockMovement, StockItemView, StockMovement},
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateStockItemPayload {
    pub ingredient_id: Uuid,

    #[validate(custom(function = "validate_threshold"))]
    #[serde(default)]
    #[schema(example = "2.5")]
    pub low_stock_threshold: Decimal,
}

// Referência opcional para tornar o lançamento idempotente.
// Os tipos usados por compras e produção são reservados.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReferencePayload {
    #[validate(custom(function = "validate_manual_reference_type"))]
    #[schema(example = "inventory_count")]
    pub reference_type: String,
    pub reference_id: Uuid,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyMovementPayload {
    #[schema(example = "OUT")]
    pub kind: MovementKind,

    #[validate(custom(function = "validate_quantity"))]
    #[schema(example = "1.5")]
    pub quantity: Decimal,

    #[validate(length(min = 1, max = 200, message = "required"))]
    #[schema(example = "Perda por validade")]
    pub reason: String,

    #[validate(custom(function = "validate_unit_cost"))]
    pub unit_cost: Option<Decimal>,

    #[validate(nested)]
    pub reference: Option<ReferencePayload>,
}

// POST /api/v1/inventory/stock-items
#[utoipa::path(
    post,
    path = "/api/v1/inventory/stock-items",
    tag = "Inventory",
    request_body = CreateStockItemPayload,
    responses(
        (status = 201, description = "Item de estoque do ingrediente (criado ou existente)", body = StockItemView)
    ),
    security(("api_jwt" = []))
)]
pub async fn create_stock_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermInventoryWrite>,
    Json(payload): Json<CreateStockItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .inventory_service
        .create_stock_item(payload.ingredient_id, payload.low_stock_threshold)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(item)))
}

// GET /api/v1/inventory/stock-items
#[utoipa::path(
    get,
    path = "/api/v1/inventory/stock-items",
    tag = "Inventory",
    responses((status = 200, description = "Itens com saldo atual", body = Vec<StockItemView>)),
    security(("api_jwt" = []))
)]
pub async fn list_stock_items(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermInventoryRead>,
) -> Result<Json<Vec<StockItemView>>, ApiError> {
    let items = app_state
        .inventory_service
        .list_stock_items()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(items))
}

// GET /api/v1/inventory/stock-items/low
#[utoipa::path(
    get,
    path = "/api/v1/inventory/stock-items/low",
    tag = "Inventory",
    responses((status = 200, description = "Itens com saldo no limite mínimo ou abaixo", body = Vec<StockItemView>)),
    security(("api_jwt" = []))
)]
pub async fn low_stock(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermInventoryRead>,
) -> Result<Json<Vec<StockItemView>>, ApiError> {
    let items = app_state
        .inventory_service
        .low_stock()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(items))
}

// GET /api/v1/inventory/stock-items/{id}
#[utoipa::path(
    get,
    path = "/api/v1/inventory/stock-items/{id}",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item de estoque")),
    responses((status = 200, description = "Item com saldo", body = StockItemView)),
    security(("api_jwt" = []))
)]
pub async fn get_stock_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermInventoryRead>,
    Path(id): Path<Uuid>,
) -> Result<Json<StockItemView>, ApiError> {
    let item = app_state
        .inventory_service
        .get_stock_item(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(item))
}

// GET /api/v1/inventory/stock-items/{id}/movements
#[utoipa::path(
    get,
    path = "/api/v1/inventory/stock-items/{id}/movements",
    tag = "Inventory",
    params(("id" = Uuid, Path, description = "ID do item de estoque")),
    responses((status = 200, description = "Histórico de movimentações", body = Vec<StockMovement>)),
    security(("api_jwt" = []))
)]
pub async fn list_movements(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermInventoryRead>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<StockMovement>>, ApiError> {
    let movements = app_state
        .inventory_service
        .list_movements(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(movements))
}

// POST /api/v1/inventory/stock-items/{id}/movements
#[utoipa::path(
    post,
    path = "/api/v1/inventory/stock-items/{id}/movements",
    tag = "Inventory",
    request_body = ApplyMovementPayload,
    params(("id" = Uuid, Path, description = "ID do item de estoque")),
    responses(
        (status = 201, description = "Movimentação lançada (ou a já existente para a mesma referência)", body = StockMovement),
        (status = 422, description = "Estoque insuficiente")
    ),
    security(("api_jwt" = []))
)]
pub async fn apply_movement(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermInventoryWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ApplyMovementPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let reference = payload
        .reference
        .map(|r| Reference::new(r.reference_type.trim(), r.reference_id));

    let movement = app_state
        .inventory_service
        .apply_movement(
            NewStockMovement {
                stock_item_id: id,
                kind: payload.kind,
                quantity: payload.quantity,
                reason: payload.reason.trim().to_string(),
                unit_cost: payload.unit_cost,
                created_by: Some(user.id),
            },
            reference,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(movement)))
}
