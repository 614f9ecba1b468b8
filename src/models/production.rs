// src/models/production.rs

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{common::validation::MAX_QUANTITY, models::catalog::MeasureUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "batch_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BatchStatus {
    Planned,
    Done,
    Cancelled,
}

impl BatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BatchStatus::Planned => "PLANNED",
            BatchStatus::Done => "DONE",
            BatchStatus::Cancelled => "CANCELLED",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionBatch {
    pub id: Uuid,
    #[schema(value_type = String, format = Date, example = "2026-10-16")]
    pub production_date: NaiveDate,
    pub status: BatchStatus,
    pub notes: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionBatchItem {
    pub id: Uuid,
    pub batch_id: Uuid,
    pub dish_id: Uuid,
    pub dish_name: String,
    #[schema(example = 24)]
    pub portions: i32,
}

// Quanto de cada ingrediente o lote consome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngredientRequirement {
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub unit: MeasureUnit,
    pub quantity: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionBatchDetail {
    #[serde(flatten)]
    pub batch: ProductionBatch,
    pub items: Vec<ProductionBatchItem>,
    pub requirements: Vec<IngredientRequirement>,
}

// Uma linha de receita multiplicada pelo lote (resultado do JOIN itens x receitas)
#[derive(Debug, Clone, FromRow)]
pub struct RecipeUsage {
    pub ingredient_id: Uuid,
    pub ingredient_name: String,
    pub unit: MeasureUnit,
    pub recipe_quantity: Decimal,
    pub portions: i32,
    pub yield_portions: i32,
}

/// Escala as receitas pelo número de porções do lote e soma por ingrediente.
/// Cada linha contribui com `recipe_quantity * portions / yield_portions`; o total é
/// arredondado a 3 casas. A ordem do resultado é estável (por ingrediente).
/// `None` quando alguma quantidade não cabe num movimento de estoque.
pub fn scale_requirements(usages: &[RecipeUsage]) -> Option<Vec<IngredientRequirement>> {
    let mut totals: BTreeMap<Uuid, IngredientRequirement> = BTreeMap::new();

    for usage in usages {
        if usage.yield_portions <= 0 {
            continue;
        }
        let needed = usage
            .recipe_quantity
            .checked_mul(Decimal::from(usage.portions))?
            .checked_div(Decimal::from(usage.yield_portions))?;

        match totals.get_mut(&usage.ingredient_id) {
            Some(req) => req.quantity = req.quantity.checked_add(needed)?,
            None => {
                totals.insert(
                    usage.ingredient_id,
                    IngredientRequirement {
                        ingredient_id: usage.ingredient_id,
                        ingredient_name: usage.ingredient_name.clone(),
                        unit: usage.unit,
                        quantity: needed,
                    },
                );
            }
        }
    }

    let mut requirements = Vec::with_capacity(totals.len());
    for mut req in totals.into_values() {
        req.quantity = req.quantity.round_dp(3);
        if req.quantity > MAX_QUANTITY {
            return None;
        }
        if req.quantity > Decimal::ZERO {
            requirements.push(req);
        }
    }
    Some(requirements)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage(ingredient_id: Uuid, qty: Decimal, portions: i32, yield_portions: i32) -> RecipeUsage {
        RecipeUsage {
            ingredient_id,
            ingredient_name: "farinha".into(),
            unit: MeasureUnit::Kg,
            recipe_quantity: qty,
            portions,
            yield_portions,
        }
    }

    #[test]
    fn test_scales_by_portions_over_yield() {
        let flour = Uuid::new_v4();
        // Receita rende 10 porções com 2 kg; o lote faz 25 porções
        let reqs = scale_requirements(&[usage(flour, Decimal::new(2, 0), 25, 10)]).unwrap();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].quantity, Decimal::new(5, 0));
    }

    #[test]
    fn test_sums_the_same_ingredient_across_dishes() {
        let flour = Uuid::new_v4();
        let reqs = scale_requirements(&[
            usage(flour, Decimal::new(1, 0), 3, 3),
            usage(flour, Decimal::new(500, 3), 1, 2),
        ])
        .unwrap();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].quantity, Decimal::new(1250, 3));
    }

    #[test]
    fn test_rounds_to_three_places() {
        let salt = Uuid::new_v4();
        let reqs = scale_requirements(&[usage(salt, Decimal::new(1, 0), 1, 3)]).unwrap();
        assert_eq!(reqs[0].quantity, Decimal::new(333, 3));
    }

    #[test]
    fn test_empty_batch_requires_nothing() {
        assert!(scale_requirements(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_requirement_larger_than_a_stock_movement_is_rejected() {
        let flour = Uuid::new_v4();
        assert!(scale_requirements(&[usage(flour, MAX_QUANTITY, i32::MAX, 1)]).is_none());
    }
}
