// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{common::error::AppError, models::auth::User};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail (sem diferenciar maiúsculas)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let maybe_user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE LOWER(email) = LOWER($1)")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        Ok(maybe_user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let maybe_user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(maybe_user)
    }

    // Cria um novo usuário, com tratamento específico para e-mail duplicado
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
        full_name: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, full_name)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(full_name)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return match db_err.constraint() {
                        Some("users_email_key") | None => AppError::EmailAlreadyExists,
                        Some(other) => AppError::UniqueConstraintViolation(other.to_string()),
                    };
                }
            }
            e.into()
        })?;

        Ok(user)
    }
}
