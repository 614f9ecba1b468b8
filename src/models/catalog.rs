// src/models/catalog.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::common::validation::validate_nutrient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "measure_unit", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MeasureUnit {
    G,
    Kg,
    Ml,
    L,
    Unit,
}

// --- Ingredientes ---
// O nome é sempre guardado normalizado (minúsculas, espaços colapsados).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: Uuid,
    #[schema(example = "farinha de trigo")]
    pub name: String,
    pub unit: MeasureUnit,
    pub is_active: bool,
    // Valores por 100 g / 100 ml
    pub energy_kcal: Option<Decimal>,
    pub protein_g: Option<Decimal>,
    pub carbs_g: Option<Decimal>,
    pub fat_g: Option<Decimal>,
    pub sodium_mg: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Informação nutricional por 100 g / 100 ml. Campos ausentes não são alterados.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NutritionFacts {
    #[validate(custom(function = "validate_nutrient"))]
    pub energy_kcal: Option<Decimal>,
    #[validate(custom(function = "validate_nutrient"))]
    pub protein_g: Option<Decimal>,
    #[validate(custom(function = "validate_nutrient"))]
    pub carbs_g: Option<Decimal>,
    #[validate(custom(function = "validate_nutrient"))]
    pub fat_g: Option<Decimal>,
    #[validate(custom(function = "validate_nutrient"))]
    pub sodium_mg: Option<Decimal>,
}

impl NutritionFacts {
    pub fn is_empty(&self) -> bool {
        self.energy_kcal.is_none()
            && self.protein_g.is_none()
            && self.carbs_g.is_none()
            && self.fat_g.is_none()
            && self.sodium_mg.is_none()
    }
}

// --- Pratos ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dish {
    pub id: Uuid,
    #[schema(example = "Lasanha à bolonhesa")]
    pub name: String,
    pub description: Option<String>,
    #[schema(example = 12)]
    pub yield_portions: i32,
    #[schema(example = "32.90")]
    pub default_price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha da receita já com os dados do ingrediente (JOIN)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeLine {
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub unit: MeasureUnit,
    pub quantity: Decimal,
    pub position: i32,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DishDetail {
    #[serde(flatten)]
    pub dish: Dish,
    pub recipe: Vec<RecipeLine>,
}

// --- Cardápio do dia ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuDay {
    pub id: Uuid,
    #[schema(value_type = String, format = Date, example = "2026-10-16")]
    pub menu_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: Uuid,
    pub menu_day_id: Uuid,
    pub dish_id: Uuid,
    // Preço congelado no momento em que o prato entrou no cardápio
    pub sale_price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemView {
    pub id: Uuid,
    pub dish_id: Uuid,
    pub dish_name: String,
    pub sale_price: Decimal,
    pub is_active: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MenuDayDetail {
    #[serde(flatten)]
    pub menu_day: MenuDay,
    pub items: Vec<MenuItemView>,
}
