// src/handlers/catalog.rs

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
        validation::{validate_price, validate_quantity},
    },
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermCatalogRead, PermCatalogWrite, RequirePermission},
    },
    models::catalog::{
        Dish, DishDetail, Ingredient, MeasureUnit, MenuDay, MenuDayDetail, MenuItem, NutritionFacts,
    },
    services::catalog_service::RecipeInput,
};

// =============================================================================
//  1. INGREDIENTES
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateIngredientPayload {
    #[validate(length(min = 1, max = 120, message = "required"))]
    #[schema(example = "Farinha de trigo")]
    pub name: String,

    #[schema(example = "KG")]
    pub unit: MeasureUnit,

    #[serde(default)]
    #[validate(nested)]
    pub nutrition: NutritionFacts,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIngredientPayload {
    #[validate(length(min = 1, max = 120, message = "required"))]
    pub name: Option<String>,
    pub unit: Option<MeasureUnit>,
    pub is_active: Option<bool>,
    #[serde(default)]
    #[validate(nested)]
    pub nutrition: NutritionFacts,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientListQuery {
    #[serde(default)]
    pub active_only: bool,
}

// POST /api/v1/catalog/ingredients
#[utoipa::path(
    post,
    path = "/api/v1/catalog/ingredients",
    tag = "Catalog",
    request_body = CreateIngredientPayload,
    responses(
        (status = 201, description = "Ingrediente criado", body = Ingredient),
        (status = 409, description = "Já existe um ingrediente com esse nome")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_ingredient(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCatalogWrite>,
    Json(payload): Json<CreateIngredientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let ingredient = app_state
        .catalog_service
        .create_ingredient(&payload.name, payload.unit, payload.nutrition)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(ingredient)))
}

// GET /api/v1/catalog/ingredients?activeOnly=true
#[utoipa::path(
    get,
    path = "/api/v1/catalog/ingredients",
    tag = "Catalog",
    params(("activeOnly" = Option<bool>, Query, description = "Somente ingredientes ativos")),
    responses((status = 200, description = "Ingredientes", body = Vec<Ingredient>)),
    security(("api_jwt" = []))
)]
pub async fn list_ingredients(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCatalogRead>,
    Query(query): Query<IngredientListQuery>,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    let ingredients = app_state
        .catalog_service
        .list_ingredients(query.active_only)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(ingredients))
}

// GET /api/v1/catalog/ingredients/{id}
#[utoipa::path(
    get,
    path = "/api/v1/catalog/ingredients/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do ingrediente")),
    responses(
        (status = 200, description = "Ingrediente", body = Ingredient),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_ingredient(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCatalogRead>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ingredient>, ApiError> {
    let ingredient = app_state
        .catalog_service
        .get_ingredient(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(ingredient))
}

// PATCH /api/v1/catalog/ingredients/{id}
#[utoipa::path(
    patch,
    path = "/api/v1/catalog/ingredients/{id}",
    tag = "Catalog",
    request_body = UpdateIngredientPayload,
    params(("id" = Uuid, Path, description = "ID do ingrediente")),
    responses((status = 200, description = "Ingrediente atualizado", body = Ingredient)),
    security(("api_jwt" = []))
)]
pub async fn update_ingredient(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCatalogWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateIngredientPayload>,
) -> Result<Json<Ingredient>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let ingredient = app_state
        .catalog_service
        .update_ingredient(
            id,
            payload.name.as_deref(),
            payload.unit,
            payload.is_active,
            payload.nutrition,
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(ingredient))
}

// =============================================================================
//  2. PRATOS E RECEITAS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLinePayload {
    pub ingredient_id: Uuid,

    #[validate(custom(function = "validate_quantity"))]
    #[schema(example = "0.250")]
    pub quantity: Decimal,
}

impl From<&RecipeLinePayload> for RecipeInput {
    fn from(line: &RecipeLinePayload) -> Self {
        RecipeInput {
            ingredient_id: line.ingredient_id,
            quantity: line.quantity,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDishPayload {
    #[validate(length(min = 1, max = 120, message = "required"))]
    #[schema(example = "Lasanha à bolonhesa")]
    pub name: String,

    pub description: Option<String>,

    #[validate(range(min = 1, message = "min_one"))]
    #[schema(example = 10)]
    pub yield_portions: i32,

    #[validate(custom(function = "validate_price"))]
    #[schema(example = "32.90")]
    pub default_price: Decimal,

    #[serde(default)]
    #[validate(nested)]
    pub ingredients: Vec<RecipeLinePayload>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceRecipePayload {
    #[validate(nested)]
    pub ingredients: Vec<RecipeLinePayload>,
}

// POST /api/v1/catalog/dishes
#[utoipa::path(
    post,
    path = "/api/v1/catalog/dishes",
    tag = "Catalog",
    request_body = CreateDishPayload,
    responses(
        (status = 201, description = "Prato criado com a receita", body = DishDetail),
        (status = 400, description = "Ingrediente repetido na receita")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_dish(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCatalogWrite>,
    Json(payload): Json<CreateDishPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let dish = app_state
        .catalog_service
        .create_dish(
            &payload.name,
            payload.description.as_deref(),
            payload.yield_portions,
            payload.default_price,
            payload.ingredients.iter().map(Into::into).collect(),
        )
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(dish)))
}

// GET /api/v1/catalog/dishes
#[utoipa::path(
    get,
    path = "/api/v1/catalog/dishes",
    tag = "Catalog",
    responses((status = 200, description = "Pratos", body = Vec<Dish>)),
    security(("api_jwt" = []))
)]
pub async fn list_dishes(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCatalogRead>,
) -> Result<Json<Vec<Dish>>, ApiError> {
    let dishes = app_state
        .catalog_service
        .list_dishes()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(dishes))
}

// GET /api/v1/catalog/dishes/{id}
#[utoipa::path(
    get,
    path = "/api/v1/catalog/dishes/{id}",
    tag = "Catalog",
    params(("id" = Uuid, Path, description = "ID do prato")),
    responses((status = 200, description = "Prato com a receita ordenada", body = DishDetail)),
    security(("api_jwt" = []))
)]
pub async fn get_dish(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCatalogRead>,
    Path(id): Path<Uuid>,
) -> Result<Json<DishDetail>, ApiError> {
    let dish = app_state
        .catalog_service
        .get_dish(id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(dish))
}

// PUT /api/v1/catalog/dishes/{id}/recipe
#[utoipa::path(
    put,
    path = "/api/v1/catalog/dishes/{id}/recipe",
    tag = "Catalog",
    request_body = ReplaceRecipePayload,
    params(("id" = Uuid, Path, description = "ID do prato")),
    responses((status = 200, description = "Receita substituída", body = DishDetail)),
    security(("api_jwt" = []))
)]
pub async fn replace_recipe(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCatalogWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReplaceRecipePayload>,
) -> Result<Json<DishDetail>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let dish = app_state
        .catalog_service
        .replace_recipe(id, payload.ingredients.iter().map(Into::into).collect())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(dish))
}

// =============================================================================
//  3. CARDÁPIO DO DIA
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateMenuDayPayload {
    #[schema(value_type = String, format = Date, example = "2026-10-16")]
    pub menu_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMenuItemPayload {
    pub dish_id: Uuid,

    // Sem preço, vale o preço padrão do prato
    #[validate(custom(function = "validate_price"))]
    pub sale_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMenuItemPayload {
    #[validate(custom(function = "validate_price"))]
    pub sale_price: Option<Decimal>,
    pub is_active: Option<bool>,
}

// POST /api/v1/catalog/menus
#[utoipa::path(
    post,
    path = "/api/v1/catalog/menus",
    tag = "Catalog",
    request_body = CreateMenuDayPayload,
    responses(
        (status = 201, description = "Cardápio do dia criado", body = MenuDay),
        (status = 409, description = "Já existe cardápio nessa data")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_menu_day(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCatalogWrite>,
    Json(payload): Json<CreateMenuDayPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let menu_day = app_state
        .catalog_service
        .create_menu_day(payload.menu_date, payload.notes.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(menu_day)))
}

// GET /api/v1/catalog/menus/{date}
#[utoipa::path(
    get,
    path = "/api/v1/catalog/menus/{date}",
    tag = "Catalog",
    params(("date" = String, Path, description = "Data no formato AAAA-MM-DD")),
    responses((status = 200, description = "Cardápio com todos os itens", body = MenuDayDetail)),
    security(("api_jwt" = []))
)]
pub async fn get_menu_day(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCatalogRead>,
    Path(menu_date): Path<NaiveDate>,
) -> Result<Json<MenuDayDetail>, ApiError> {
    let menu = app_state
        .catalog_service
        .get_menu_by_date(menu_date, false)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(menu))
}

// POST /api/v1/catalog/menus/{date}/items
#[utoipa::path(
    post,
    path = "/api/v1/catalog/menus/{date}/items",
    tag = "Catalog",
    request_body = AddMenuItemPayload,
    params(("date" = String, Path, description = "Data no formato AAAA-MM-DD")),
    responses((status = 201, description = "Prato incluído no cardápio", body = MenuItem)),
    security(("api_jwt" = []))
)]
pub async fn add_menu_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCatalogWrite>,
    Path(menu_date): Path<NaiveDate>,
    Json(payload): Json<AddMenuItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .catalog_service
        .add_menu_item(menu_date, payload.dish_id, payload.sale_price)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok((StatusCode::CREATED, Json(item)))
}

// PATCH /api/v1/catalog/menu-items/{id}
#[utoipa::path(
    patch,
    path = "/api/v1/catalog/menu-items/{id}",
    tag = "Catalog",
    request_body = UpdateMenuItemPayload,
    params(("id" = Uuid, Path, description = "ID do item do cardápio")),
    responses((status = 200, description = "Item atualizado", body = MenuItem)),
    security(("api_jwt" = []))
)]
pub async fn update_menu_item(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermCatalogWrite>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMenuItemPayload>,
) -> Result<Json<MenuItem>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let item = app_state
        .catalog_service
        .update_menu_item(id, payload.sale_price, payload.is_active)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(item))
}
