// src/services/catalog_service.rs

use std::collections::HashSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{
        error::AppError,
        validation::{field_error, normalize_name},
    },
    db::CatalogRepository,
    models::catalog::{
        Dish, DishDetail, Ingredient, MeasureUnit, MenuDay, MenuDayDetail, MenuItem,
        NutritionFacts,
    },
};

// Linha de receita recebida do cliente; a posição é a ordem no array
#[derive(Debug, Clone)]
pub struct RecipeInput {
    pub ingredient_id: Uuid,
    pub quantity: Decimal,
}

/// Um ingrediente só pode aparecer uma vez na mesma receita.
pub fn ensure_unique_ingredients(lines: &[RecipeInput]) -> Result<(), AppError> {
    let mut seen = HashSet::new();
    if lines.iter().all(|l| seen.insert(l.ingredient_id)) {
        Ok(())
    } else {
        Err(field_error("ingredients", "duplicate_recipe_ingredient"))
    }
}

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // --- INGREDIENTES ---

    pub async fn create_ingredient(
        &self,
        name: &str,
        unit: MeasureUnit,
        nutrition: NutritionFacts,
    ) -> Result<Ingredient, AppError> {
        let ingredient = self
            .repo
            .create_ingredient(&self.pool, &normalize_name(name), unit, &nutrition)
            .await?;
        tracing::info!(ingredient_id = %ingredient.id, name = %ingredient.name, "Ingrediente criado");
        Ok(ingredient)
    }

    pub async fn list_ingredients(&self, active_only: bool) -> Result<Vec<Ingredient>, AppError> {
        self.repo.list_ingredients(active_only).await
    }

    pub async fn get_ingredient(&self, id: Uuid) -> Result<Ingredient, AppError> {
        self.repo
            .find_ingredient(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Ingrediente".into()))
    }

    pub async fn update_ingredient(
        &self,
        id: Uuid,
        name: Option<&str>,
        unit: Option<MeasureUnit>,
        is_active: Option<bool>,
        nutrition: NutritionFacts,
    ) -> Result<Ingredient, AppError> {
        let normalized = name.map(normalize_name);
        self.repo
            .update_ingredient(&self.pool, id, normalized.as_deref(), unit, is_active, &nutrition)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Ingrediente".into()))
    }

    // --- PRATOS ---

    pub async fn create_dish(
        &self,
        name: &str,
        description: Option<&str>,
        yield_portions: i32,
        default_price: Decimal,
        recipe: Vec<RecipeInput>,
    ) -> Result<DishDetail, AppError> {
        ensure_unique_ingredients(&recipe)?;

        let mut tx = self.pool.begin().await?;

        let dish = self
            .repo
            .create_dish(&mut *tx, name.trim(), description, yield_portions, default_price)
            .await?;

        for (position, line) in recipe.iter().enumerate() {
            self.repo
                .insert_recipe_line(&mut *tx, dish.id, line.ingredient_id, line.quantity, position as i32)
                .await?;
        }

        let recipe = self.repo.recipe_lines(&mut *tx, dish.id).await?;
        tx.commit().await?;

        tracing::info!(dish_id = %dish.id, lines = recipe.len(), "Prato criado");
        Ok(DishDetail { dish, recipe })
    }

    pub async fn list_dishes(&self) -> Result<Vec<Dish>, AppError> {
        self.repo.list_dishes().await
    }

    pub async fn get_dish(&self, id: Uuid) -> Result<DishDetail, AppError> {
        let dish = self
            .repo
            .find_dish(&self.pool, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Prato".into()))?;
        let recipe = self.repo.recipe_lines(&self.pool, id).await?;
        Ok(DishDetail { dish, recipe })
    }

    /// Troca a receita inteira de uma vez.
    pub async fn replace_recipe(
        &self,
        dish_id: Uuid,
        recipe: Vec<RecipeInput>,
    ) -> Result<DishDetail, AppError> {
        ensure_unique_ingredients(&recipe)?;

        let mut tx = self.pool.begin().await?;

        let dish = self
            .repo
            .find_dish(&mut *tx, dish_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Prato".into()))?;

        self.repo.clear_recipe(&mut *tx, dish_id).await?;
        for (position, line) in recipe.iter().enumerate() {
            self.repo
                .insert_recipe_line(&mut *tx, dish_id, line.ingredient_id, line.quantity, position as i32)
                .await?;
        }
        self.repo.touch_dish(&mut *tx, dish_id).await?;

        let recipe = self.repo.recipe_lines(&mut *tx, dish_id).await?;
        tx.commit().await?;

        Ok(DishDetail { dish, recipe })
    }

    // --- CARDÁPIO ---

    pub async fn create_menu_day(
        &self,
        menu_date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<MenuDay, AppError> {
        let day = self.repo.create_menu_day(&self.pool, menu_date, notes).await?;
        tracing::info!(%menu_date, "Cardápio do dia criado");
        Ok(day)
    }

    pub async fn find_menu_day(&self, menu_date: NaiveDate) -> Result<MenuDay, AppError> {
        self.repo
            .find_menu_day_by_date(&self.pool, menu_date)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Cardápio".into()))
    }

    pub async fn get_menu_by_date(
        &self,
        menu_date: NaiveDate,
        active_only: bool,
    ) -> Result<MenuDayDetail, AppError> {
        let menu_day = self.find_menu_day(menu_date).await?;
        let items = self.repo.menu_item_views(menu_day.id, active_only).await?;
        Ok(MenuDayDetail { menu_day, items })
    }

    /// Sem preço informado, congela o preço padrão atual do prato.
    pub async fn add_menu_item(
        &self,
        menu_date: NaiveDate,
        dish_id: Uuid,
        sale_price: Option<Decimal>,
    ) -> Result<MenuItem, AppError> {
        let mut tx = self.pool.begin().await?;

        let day = self
            .repo
            .find_menu_day_by_date(&mut *tx, menu_date)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Cardápio".into()))?;
        let dish = self
            .repo
            .find_dish(&mut *tx, dish_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Prato".into()))?;

        let price = sale_price.unwrap_or(dish.default_price);
        let item = self.repo.add_menu_item(&mut *tx, day.id, dish.id, price).await?;
        tx.commit().await?;

        Ok(item)
    }

    pub async fn update_menu_item(
        &self,
        item_id: Uuid,
        sale_price: Option<Decimal>,
        is_active: Option<bool>,
    ) -> Result<MenuItem, AppError> {
        self.repo
            .update_menu_item(&self.pool, item_id, sale_price, is_active)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Item do cardápio".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_ingredient_in_recipe_is_rejected() {
        let flour = Uuid::new_v4();
        let lines = vec![
            RecipeInput { ingredient_id: flour, quantity: Decimal::ONE },
            RecipeInput { ingredient_id: Uuid::new_v4(), quantity: Decimal::ONE },
            RecipeInput { ingredient_id: flour, quantity: Decimal::TWO },
        ];
        match ensure_unique_ingredients(&lines) {
            Err(AppError::ValidationError(e)) => {
                assert!(e.field_errors().contains_key("ingredients"))
            }
            other => panic!("esperava erro de validação, veio {other:?}"),
        }
        assert!(ensure_unique_ingredients(&lines[..2]).is_ok());
        assert!(ensure_unique_ingredients(&[]).is_ok());
    }
}
