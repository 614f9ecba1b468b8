// src/handlers/audit.rs

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{
        i18n::Locale,
        rbac::{PermAuditRead, RequirePermission},
    },
    models::audit::AdminActivityLog,
};

const DEFAULT_LIMIT: i64 = 100;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditListQuery {
    pub limit: Option<i64>,
    pub actor_id: Option<Uuid>,
}

fn effective_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

// GET /api/v1/audit/logs?limit=50&actorId=...
#[utoipa::path(
    get,
    path = "/api/v1/audit/logs",
    tag = "Audit",
    params(
        ("limit" = Option<i64>, Query, description = "Máximo de registros (até 500)"),
        ("actorId" = Option<Uuid>, Query, description = "Filtra por administrador")
    ),
    responses((status = 200, description = "Atividade administrativa, mais recente primeiro", body = Vec<AdminActivityLog>)),
    security(("api_jwt" = []))
)]
pub async fn list_activity(
    State(app_state): State<AppState>,
    locale: Locale,
    _guard: RequirePermission<PermAuditRead>,
    Query(query): Query<AuditListQuery>,
) -> Result<Json<Vec<AdminActivityLog>>, ApiError> {
    let logs = app_state
        .audit_repo
        .list(effective_limit(query.limit), query.actor_id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;
    Ok(Json(logs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(effective_limit(None), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(10_000)), MAX_LIMIT);
        assert_eq!(effective_limit(Some(0)), 1);
        assert_eq!(effective_limit(Some(42)), 42);
    }
}
