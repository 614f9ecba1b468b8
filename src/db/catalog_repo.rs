// src/db/catalog_repo.rs

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::catalog::{
        Dish, Ingredient, MeasureUnit, MenuDay, MenuItem, MenuItemView, NutritionFacts,
        RecipeLine,
    },
};

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

// Traduz a violação dos índices únicos de nome para um 409 com o recurso certo
fn map_unique(e: sqlx::Error, resource: &str) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(resource.to_string());
        }
    }
    e.into()
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Ingredientes
    // ---

    pub async fn create_ingredient<'e, E>(
        &self,
        executor: E,
        name: &str,
        unit: MeasureUnit,
        nutrition: &NutritionFacts,
    ) -> Result<Ingredient, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Ingredient>(
            r#"
            INSERT INTO ingredients (name, unit, energy_kcal, protein_g, carbs_g, fat_g, sodium_mg)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(unit)
        .bind(nutrition.energy_kcal)
        .bind(nutrition.protein_g)
        .bind(nutrition.carbs_g)
        .bind(nutrition.fat_g)
        .bind(nutrition.sodium_mg)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique(e, "Ingrediente"))
    }

    pub async fn list_ingredients(&self, active_only: bool) -> Result<Vec<Ingredient>, AppError> {
        let ingredients = sqlx::query_as::<_, Ingredient>(
            "SELECT * FROM ingredients WHERE ($1 = FALSE OR is_active) ORDER BY name ASC",
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(ingredients)
    }

    pub async fn find_ingredient<'e, E>(
        &self,
        executor: E,
        id: Uuid,
    ) -> Result<Option<Ingredient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ingredient = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(ingredient)
    }

    /// Atualização parcial: campos `None` preservam o valor atual.
    pub async fn update_ingredient<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        unit: Option<MeasureUnit>,
        is_active: Option<bool>,
        nutrition: &NutritionFacts,
    ) -> Result<Option<Ingredient>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Ingredient>(
            r#"
            UPDATE ingredients SET
                name = COALESCE($2, name),
                unit = COALESCE($3, unit),
                is_active = COALESCE($4, is_active),
                energy_kcal = COALESCE($5, energy_kcal),
                protein_g = COALESCE($6, protein_g),
                carbs_g = COALESCE($7, carbs_g),
                fat_g = COALESCE($8, fat_g),
                sodium_mg = COALESCE($9, sodium_mg),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(unit)
        .bind(is_active)
        .bind(nutrition.energy_kcal)
        .bind(nutrition.protein_g)
        .bind(nutrition.carbs_g)
        .bind(nutrition.fat_g)
        .bind(nutrition.sodium_mg)
        .fetch_optional(executor)
        .await
        .map_err(|e| map_unique(e, "Ingrediente"))
    }

    // ---
    // Pratos e receitas
    // ---

    pub async fn create_dish<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
        yield_portions: i32,
        default_price: Decimal,
    ) -> Result<Dish, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Dish>(
            r#"
            INSERT INTO dishes (name, description, yield_portions, default_price)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(yield_portions)
        .bind(default_price)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique(e, "Prato"))
    }

    pub async fn list_dishes(&self) -> Result<Vec<Dish>, AppError> {
        let dishes = sqlx::query_as::<_, Dish>("SELECT * FROM dishes ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;
        Ok(dishes)
    }

    pub async fn find_dish<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Dish>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let dish = sqlx::query_as::<_, Dish>("SELECT * FROM dishes WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(dish)
    }

    pub async fn recipe_lines<'e, E>(
        &self,
        executor: E,
        dish_id: Uuid,
    ) -> Result<Vec<RecipeLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lines = sqlx::query_as::<_, RecipeLine>(
            r#"
            SELECT di.ingredient_id, i.name AS ingredient_name, i.unit, di.quantity, di.position
            FROM dish_ingredients di
            JOIN ingredients i ON i.id = di.ingredient_id
            WHERE di.dish_id = $1
            ORDER BY di.position ASC
            "#,
        )
        .bind(dish_id)
        .fetch_all(executor)
        .await?;
        Ok(lines)
    }

    pub async fn clear_recipe<'e, E>(&self, executor: E, dish_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM dish_ingredients WHERE dish_id = $1")
            .bind(dish_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn insert_recipe_line<'e, E>(
        &self,
        executor: E,
        dish_id: Uuid,
        ingredient_id: Uuid,
        quantity: Decimal,
        position: i32,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO dish_ingredients (dish_id, ingredient_id, quantity, position)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(dish_id)
        .bind(ingredient_id)
        .bind(quantity)
        .bind(position)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn touch_dish<'e, E>(&self, executor: E, dish_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE dishes SET updated_at = NOW() WHERE id = $1")
            .bind(dish_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    // ---
    // Cardápio do dia
    // ---

    pub async fn create_menu_day<'e, E>(
        &self,
        executor: E,
        menu_date: NaiveDate,
        notes: Option<&str>,
    ) -> Result<MenuDay, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, MenuDay>(
            "INSERT INTO menu_days (menu_date, notes) VALUES ($1, $2) RETURNING *",
        )
        .bind(menu_date)
        .bind(notes)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique(e, "Cardápio"))
    }

    pub async fn find_menu_day_by_date<'e, E>(
        &self,
        executor: E,
        menu_date: NaiveDate,
    ) -> Result<Option<MenuDay>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let day = sqlx::query_as::<_, MenuDay>("SELECT * FROM menu_days WHERE menu_date = $1")
            .bind(menu_date)
            .fetch_optional(executor)
            .await?;
        Ok(day)
    }

    pub async fn menu_item_views(
        &self,
        menu_day_id: Uuid,
        active_only: bool,
    ) -> Result<Vec<MenuItemView>, AppError> {
        let items = sqlx::query_as::<_, MenuItemView>(
            r#"
            SELECT mi.id, mi.dish_id, d.name AS dish_name, mi.sale_price, mi.is_active
            FROM menu_items mi
            JOIN dishes d ON d.id = mi.dish_id
            WHERE mi.menu_day_id = $1
              AND ($2 = FALSE OR mi.is_active)
            ORDER BY d.name ASC
            "#,
        )
        .bind(menu_day_id)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    pub async fn add_menu_item<'e, E>(
        &self,
        executor: E,
        menu_day_id: Uuid,
        dish_id: Uuid,
        sale_price: Decimal,
    ) -> Result<MenuItem, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, MenuItem>(
            r#"
            INSERT INTO menu_items (menu_day_id, dish_id, sale_price)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(menu_day_id)
        .bind(dish_id)
        .bind(sale_price)
        .fetch_one(executor)
        .await
        .map_err(|e| map_unique(e, "Item do cardápio"))
    }

    pub async fn update_menu_item<'e, E>(
        &self,
        executor: E,
        item_id: Uuid,
        sale_price: Option<Decimal>,
        is_active: Option<bool>,
    ) -> Result<Option<MenuItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let item = sqlx::query_as::<_, MenuItem>(
            r#"
            UPDATE menu_items SET
                sale_price = COALESCE($2, sale_price),
                is_active = COALESCE($3, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(item_id)
        .bind(sale_price)
        .bind(is_active)
        .fetch_optional(executor)
        .await?;
        Ok(item)
    }

    /// Itens de um cardápio pelos IDs, para precificar um pedido.
    pub async fn menu_items_of_day<'e, E>(
        &self,
        executor: E,
        menu_day_id: Uuid,
        item_ids: &[Uuid],
    ) -> Result<Vec<MenuItem>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let items = sqlx::query_as::<_, MenuItem>(
            "SELECT * FROM menu_items WHERE menu_day_id = $1 AND id = ANY($2)",
        )
        .bind(menu_day_id)
        .bind(item_ids)
        .fetch_all(executor)
        .await?;
        Ok(items)
    }
}
