// src/models/ocr.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{common::validation::MAX_NUTRIENT, models::catalog::NutritionFacts};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "label_source", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelSource {
    Text,
    Image,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "label_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LabelStatus {
    PendingReview,
    Applied,
    Rejected,
}

impl LabelStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            LabelStatus::PendingReview => "PENDING_REVIEW",
            LabelStatus::Applied => "APPLIED",
            LabelStatus::Rejected => "REJECTED",
        }
    }
}

/// Valores lidos do rótulo, na base em que aparecem (por porção ou por 100 g).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedNutrition {
    pub serving_size_g: Option<Decimal>,
    pub energy_kcal: Option<Decimal>,
    pub protein_g: Option<Decimal>,
    pub carbs_g: Option<Decimal>,
    pub fat_g: Option<Decimal>,
    pub sodium_mg: Option<Decimal>,
    // Fração dos cinco nutrientes que foram encontrados (0..1)
    #[schema(example = "0.8")]
    pub confidence: Decimal,
}

impl ParsedNutrition {
    pub fn has_values(&self) -> bool {
        self.energy_kcal.is_some()
            || self.protein_g.is_some()
            || self.carbs_g.is_some()
            || self.fat_g.is_some()
            || self.sodium_mg.is_some()
    }

    /// Converte para valores por 100 g. Sem tamanho de porção os valores já são tomados como por 100 g.
    /// `None` quando algum valor convertido não cabe na coluna do ingrediente.
    pub fn per_100g(&self) -> Option<NutritionFacts> {
        let factor = match self.serving_size_g {
            Some(serving) if serving > Decimal::ZERO => Decimal::ONE_HUNDRED.checked_div(serving)?,
            _ => Decimal::ONE,
        };
        let scale = |v: Option<Decimal>| -> Option<Option<Decimal>> {
            match v {
                None => Some(None),
                Some(v) => {
                    let scaled = v.checked_mul(factor)?.round_dp(2);
                    (scaled <= MAX_NUTRIENT).then_some(Some(scaled))
                }
            }
        };

        Some(NutritionFacts {
            energy_kcal: scale(self.energy_kcal)?,
            protein_g: scale(self.protein_g)?,
            carbs_g: scale(self.carbs_g)?,
            fat_g: scale(self.fat_g)?,
            sodium_mg: scale(self.sodium_mg)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NutritionLabel {
    pub id: Uuid,
    pub ingredient_id: Option<Uuid>,
    pub source: LabelSource,
    pub raw_text: String,
    #[schema(value_type = ParsedNutrition)]
    pub parsed: Json<ParsedNutrition>,
    pub status: LabelStatus,
    pub created_by: Option<Uuid>,
    pub applied_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_100g_scales_serving_values() {
        let parsed = ParsedNutrition {
            serving_size_g: Some(Decimal::new(30, 0)),
            energy_kcal: Some(Decimal::new(120, 0)),
            sodium_mg: Some(Decimal::new(45, 0)),
            ..Default::default()
        };
        let facts = parsed.per_100g().unwrap();
        assert_eq!(facts.energy_kcal, Some(Decimal::new(400, 0)));
        assert_eq!(facts.sodium_mg, Some(Decimal::new(150, 0)));
        assert_eq!(facts.protein_g, None);
    }

    #[test]
    fn test_per_100g_without_serving_keeps_values() {
        let parsed = ParsedNutrition {
            protein_g: Some(Decimal::new(125, 1)),
            ..Default::default()
        };
        assert_eq!(parsed.per_100g().unwrap().protein_g, Some(Decimal::new(125, 1)));
        assert!(parsed.has_values());
        assert!(!ParsedNutrition::default().has_values());
    }

    #[test]
    fn test_per_100g_rejects_values_that_do_not_fit() {
        let tiny_serving = ParsedNutrition {
            serving_size_g: Some(Decimal::new(1, 27)),
            energy_kcal: Some(Decimal::new(120, 0)),
            ..Default::default()
        };
        assert!(tiny_serving.per_100g().is_none());

        let huge = ParsedNutrition {
            sodium_mg: Some(Decimal::new(999_999_999_999, 0)),
            ..Default::default()
        };
        assert!(huge.per_100g().is_none());
    }
}
