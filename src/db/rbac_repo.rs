// src/db/rbac_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::rbac::{Permission, Role};

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // 1. Criar o Cargo
    pub async fn create_role<'e, E>(
        &self,
        executor: E,
        name: &str,
        description: Option<&str>,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(description)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AppError::UniqueConstraintViolation("Cargo".into());
                }
            }
            e.into()
        })?;

        Ok(role)
    }

    pub async fn find_role_by_name<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<Option<Role>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, description, created_at, updated_at FROM roles WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(executor)
        .await?;
        Ok(role)
    }

    // 2. Buscar IDs das permissões baseado nos Slugs ("inventory:write" -> UUID)
    pub async fn find_permissions_by_slugs<'e, E>(
        &self,
        executor: E,
        slugs: &[String],
    ) -> Result<Vec<Permission>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let permissions = sqlx::query_as::<_, Permission>(
            r#"
            SELECT id, slug, description, module
            FROM permissions
            WHERE slug = ANY($1)
            ORDER BY module, slug
            "#,
        )
        .bind(slugs)
        .fetch_all(executor)
        .await?;

        Ok(permissions)
    }

    // 3. Vincular Cargo <-> Permissão
    pub async fn assign_permissions<'e, E>(
        &self,
        executor: E,
        role_id: Uuid,
        permission_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // Inserção em massa usando UNNEST
        sqlx::query(
            r#"
            INSERT INTO role_permissions (role_id, permission_id)
            SELECT $1, unnest($2::uuid[])
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(permission_ids)
        .execute(executor)
        .await?;

        Ok(())
    }

    /// Vincula o usuário ao cargo. Repetir a chamada não duplica nada.
    pub async fn assign_role_to_user<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        role_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    // Upsert de uma permissão declarada no código
    pub async fn upsert_permission<'e, E>(
        &self,
        executor: E,
        slug: &str,
        module: &str,
        description: &str,
    ) -> Result<Permission, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let permission = sqlx::query_as::<_, Permission>(
            r#"
            INSERT INTO permissions (slug, module, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO UPDATE
                SET module = EXCLUDED.module, description = EXCLUDED.description
            RETURNING id, slug, description, module
            "#,
        )
        .bind(slug)
        .bind(module)
        .bind(description)
        .fetch_one(executor)
        .await?;
        Ok(permission)
    }

    // 4. Listar todas as permissões disponíveis
    pub async fn list_all_permissions(&self) -> Result<Vec<Permission>, AppError> {
        let permissions = sqlx::query_as::<_, Permission>(
            "SELECT id, slug, description, module FROM permissions ORDER BY module, slug",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(permissions)
    }

    pub async fn role_names_of(&self, user_id: Uuid) -> Result<Vec<String>, AppError> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT r.name
            FROM user_roles ur
            JOIN roles r ON r.id = ur.role_id
            WHERE ur.user_id = $1
            ORDER BY r.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    pub async fn permission_slugs_of_role(&self, role_id: Uuid) -> Result<Vec<String>, AppError> {
        let slugs = sqlx::query_scalar::<_, String>(
            r#"
            SELECT p.slug
            FROM role_permissions rp
            JOIN permissions p ON p.id = rp.permission_id
            WHERE rp.role_id = $1
            ORDER BY p.slug
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(slugs)
    }

    pub async fn user_has_permission(
        &self,
        user_id: Uuid,
        permission_slug: &str,
    ) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_roles ur
                JOIN role_permissions rp ON rp.role_id = ur.role_id
                JOIN permissions p ON p.id = rp.permission_id
                WHERE ur.user_id = $1
                  AND p.slug = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(permission_slug)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    pub async fn user_has_role(&self, user_id: Uuid, role_name: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM user_roles ur
                JOIN roles r ON r.id = ur.role_id
                WHERE ur.user_id = $1 AND r.name = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(role_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }
}
