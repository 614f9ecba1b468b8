// src/middleware/rbac.rs

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn slug() -> &'static str;
}

/// Entrada do registro global de permissões. Sincronizada com a tabela `permissions`
/// na inicialização e concedida aos cargos listados em `default_roles`.
#[derive(Debug)]
pub struct PermissionEntry {
    pub slug: &'static str,
    pub module: &'static str,
    pub description: &'static str,
    pub default_roles: &'static [&'static str],
}

inventory::collect!(PermissionEntry);

/// Todas as permissões declaradas no código, ordenadas por módulo e slug.
pub fn registered_permissions() -> Vec<&'static PermissionEntry> {
    let mut entries: Vec<&'static PermissionEntry> =
        inventory::iter::<PermissionEntry>.into_iter().collect();
    entries.sort_by_key(|e| (e.module, e.slug));
    entries
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts
impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Extrai Usuário (colocado pelo auth_guard)
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        // B. Verifica no Banco
        let required_perm = T::slug();
        let has_permission = app_state
            .rbac_service
            .user_has_permission(user.0.id, required_perm)
            .await?;

        if !has_permission {
            tracing::warn!(user_id = %user.0.id, permission = required_perm, "Acesso negado");
            return Err(AppError::PermissionDenied(required_perm.to_string()));
        }

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

macro_rules! permission {
    ($name:ident, $slug:literal, $module:literal, $description:literal, [$($role:literal),* $(,)?]) => {
        pub struct $name;
        impl PermissionDef for $name {
            fn slug() -> &'static str { $slug }
        }
        inventory::submit! {
            PermissionEntry {
                slug: $slug,
                module: $module,
                description: $description,
                default_roles: &[$($role),*],
            }
        }
    };
}

permission!(PermAccountsManage, "accounts:manage", "ACCOUNTS", "Gerenciar cargos e usuários", ["admin"]);

permission!(PermCatalogRead, "catalog:read", "CATALOG", "Visualizar ingredientes, pratos e cardápios", ["admin", "staff"]);
permission!(PermCatalogWrite, "catalog:write", "CATALOG", "Editar ingredientes, pratos e cardápios", ["admin", "staff"]);

permission!(PermInventoryRead, "inventory:read", "INVENTORY", "Visualizar saldos e movimentações", ["admin", "staff"]);
permission!(PermInventoryWrite, "inventory:write", "INVENTORY", "Lançar movimentações de estoque", ["admin", "staff"]);

permission!(PermProcurementRead, "procurement:read", "PROCUREMENT", "Visualizar fornecedores e compras", ["admin", "staff"]);
permission!(PermProcurementWrite, "procurement:write", "PROCUREMENT", "Emitir e receber pedidos de compra", ["admin"]);

permission!(PermOrdersRead, "orders:read", "ORDERS", "Visualizar pedidos e pagamentos", ["admin", "staff"]);
permission!(PermOrdersWrite, "orders:write", "ORDERS", "Registrar pedidos e pagamentos", ["admin", "staff"]);

permission!(PermProductionRead, "production:read", "PRODUCTION", "Visualizar lotes de produção", ["admin", "staff"]);
permission!(PermProductionWrite, "production:write", "PRODUCTION", "Planejar e concluir lotes de produção", ["admin", "staff"]);

permission!(PermFinanceRead, "finance:read", "FINANCE", "Visualizar contas e caixa", ["admin"]);
permission!(PermFinanceWrite, "finance:write", "FINANCE", "Baixar contas a pagar e a receber", ["admin"]);

permission!(PermOcrWrite, "ocr:write", "OCR_AI", "Enviar e revisar rótulos nutricionais", ["admin", "staff"]);

permission!(PermPortalWrite, "portal:write", "PORTAL", "Editar e publicar páginas do portal", ["admin"]);

permission!(PermAuditRead, "audit:read", "AUDIT", "Consultar o log de atividade administrativa", ["admin"]);

permission!(PermPersonalFinance, "personal_finance:use", "PERSONAL_FINANCE", "Usar o controle de finanças pessoais", ["admin", "staff", "customer"]);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_registry_contains_every_permission_once() {
        let entries = registered_permissions();
        let slugs: HashSet<&str> = entries.iter().map(|e| e.slug).collect();
        assert_eq!(slugs.len(), entries.len());
        assert!(slugs.contains(PermFinanceWrite::slug()));
        assert!(slugs.contains(PermPersonalFinance::slug()));
        assert!(slugs.contains(PermAuditRead::slug()));
    }

    #[test]
    fn test_admin_gets_every_permission() {
        for entry in registered_permissions() {
            assert!(
                entry.default_roles.contains(&"admin"),
                "{} não é concedida ao admin",
                entry.slug
            );
        }
    }

    #[test]
    fn test_customer_only_uses_personal_finance() {
        let customer: Vec<&str> = registered_permissions()
            .into_iter()
            .filter(|e| e.default_roles.contains(&"customer"))
            .map(|e| e.slug)
            .collect();
        assert_eq!(customer, vec!["personal_finance:use"]);
    }
}
