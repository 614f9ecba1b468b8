// src/services/rbac_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{RbacRepository, UserRepository},
    middleware::rbac::registered_permissions,
    models::rbac::{Permission, RoleResponse},
};

pub const ADMIN_ROLE: &str = "admin";

#[derive(Clone)]
pub struct RbacService {
    repo: RbacRepository,
    user_repo: UserRepository,
    pool: PgPool,
}

impl RbacService {
    pub fn new(repo: RbacRepository, user_repo: UserRepository, pool: PgPool) -> Self {
        Self { repo, user_repo, pool }
    }

    /// Grava no banco as permissões declaradas no código e concede cada uma aos cargos padrão.
    /// Roda na inicialização; repetir não duplica nada.
    pub async fn sync_permissions(&self) -> Result<usize, AppError> {
        let entries = registered_permissions();
        let mut tx = self.pool.begin().await?;

        for entry in &entries {
            let permission = self
                .repo
                .upsert_permission(&mut *tx, entry.slug, entry.module, entry.description)
                .await?;

            for role_name in entry.default_roles {
                match self.repo.find_role_by_name(&mut *tx, role_name).await? {
                    Some(role) => {
                        self.repo
                            .assign_permissions(&mut *tx, role.id, &[permission.id])
                            .await?
                    }
                    None => tracing::warn!(
                        role = role_name,
                        permission = entry.slug,
                        "Cargo padrão inexistente, permissão não concedida"
                    ),
                }
            }
        }

        tx.commit().await?;
        Ok(entries.len())
    }

    pub async fn create_role_with_permissions(
        &self,
        name: String,
        description: Option<String>,
        permission_slugs: Vec<String>,
    ) -> Result<RoleResponse, AppError> {
        // 1. Inicia Transação
        let mut tx = self.pool.begin().await?;

        // 2. Cria o Cargo
        let role = self
            .repo
            .create_role(&mut *tx, name.trim(), description.as_deref())
            .await?;

        // 3. Resolve Slugs para IDs; slugs desconhecidos são ignorados
        let permissions = self
            .repo
            .find_permissions_by_slugs(&mut *tx, &permission_slugs)
            .await?;

        let permission_ids: Vec<Uuid> = permissions.iter().map(|p| p.id).collect();
        let valid_slugs: Vec<String> = permissions.into_iter().map(|p| p.slug).collect();

        // 4. Salva o Vínculo
        if !permission_ids.is_empty() {
            self.repo
                .assign_permissions(&mut *tx, role.id, &permission_ids)
                .await?;
        }

        // 5. Commit
        tx.commit().await?;

        tracing::info!(role = %role.name, permissions = valid_slugs.len(), "Cargo criado");
        Ok(RoleResponse {
            role,
            permissions: valid_slugs,
        })
    }

    pub async fn assign_role(&self, user_id: Uuid, role_name: &str) -> Result<RoleResponse, AppError> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let mut tx = self.pool.begin().await?;
        let role = self
            .repo
            .find_role_by_name(&mut *tx, role_name.trim())
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Cargo".into()))?;
        self.repo.assign_role_to_user(&mut *tx, user_id, role.id).await?;
        tx.commit().await?;

        let permissions = self.repo.permission_slugs_of_role(role.id).await?;
        tracing::info!(%user_id, role = %role.name, "Cargo atribuído");
        Ok(RoleResponse { role, permissions })
    }

    /// Promove a admin o usuário de `ADMIN_EMAIL`, se ele já existir. Idempotente.
    pub async fn bootstrap_admin(&self, email: &str) -> Result<bool, AppError> {
        let Some(user) = self.user_repo.find_by_email(email.trim()).await? else {
            tracing::warn!(%email, "ADMIN_EMAIL ainda não cadastrado; será promovido no registro");
            return Ok(false);
        };

        let mut tx = self.pool.begin().await?;
        let role = self
            .repo
            .find_role_by_name(&mut *tx, ADMIN_ROLE)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Cargo '{}' não existe", ADMIN_ROLE))?;
        self.repo.assign_role_to_user(&mut *tx, user.id, role.id).await?;
        tx.commit().await?;

        tracing::info!(user_id = %user.id, "👑 Administrador inicial garantido");
        Ok(true)
    }

    pub async fn list_system_permissions(&self) -> Result<Vec<Permission>, AppError> {
        self.repo.list_all_permissions().await
    }

    pub async fn user_has_permission(&self, user_id: Uuid, slug: &str) -> Result<bool, AppError> {
        self.repo.user_has_permission(user_id, slug).await
    }

    pub async fn user_has_role(&self, user_id: Uuid, role_name: &str) -> Result<bool, AppError> {
        self.repo.user_has_role(user_id, role_name).await
    }
}
