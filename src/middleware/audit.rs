// src/middleware/audit.rs

use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::{json, Value};

use crate::{
    common::error::AppError, config::AppState, middleware::auth::AuthenticatedUser,
    models::audit::NewActivityLog,
};

const REDACTED: &str = "***";
const SENSITIVE_MARKERS: [&str; 4] = ["password", "secret", "token", "authorization"];

// Mesmo limite padrão do `DefaultBodyLimit` do axum; acima disso o extrator Json recusaria de qualquer jeito
const FORWARD_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Registra no log de atividade toda requisição autenticada feita por um admin.
/// Precisa rodar depois do `auth_guard`. Falhas ao gravar o log nunca derrubam a requisição,
/// e corpos acima de `AUDIT_MAX_BODY_BYTES` seguem inteiros para o handler (só não são guardados).
pub async fn audit_admin_activity(
    State(app_state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let Some(AuthenticatedUser(user)) = request.extensions().get::<AuthenticatedUser>().cloned()
    else {
        return next.run(request).await;
    };

    let is_admin = match app_state.rbac_service.user_has_role(user.id, "admin").await {
        Ok(is_admin) => is_admin,
        Err(e) => {
            tracing::warn!(user_id = %user.id, "Não foi possível verificar o cargo para auditoria: {}", e);
            false
        }
    };
    if !is_admin {
        return next.run(request).await;
    }

    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let query = request.uri().query().map(str::to_string);
    let is_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/json"));

    let started = Instant::now();

    // O corpo é consumido para guardar o payload e depois devolvido à requisição
    let (parts, body) = request.into_parts();
    let (response, payload) = match axum::body::to_bytes(body, FORWARD_BODY_LIMIT).await {
        Ok(bytes) => {
            let payload = audit_payload(&bytes, is_json, app_state.config.audit_max_body_bytes);
            let request = Request::from_parts(parts, Body::from(bytes));
            (next.run(request).await, payload)
        }
        Err(_) => (AppError::PayloadTooLarge.into_response(), Some(truncated_marker(None))),
    };
    let duration_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);

    let entry = NewActivityLog {
        actor_id: user.id,
        actor_email: user.email.clone(),
        method,
        path,
        query,
        status_code: i32::from(response.status().as_u16()),
        duration_ms,
        payload,
    };

    if let Err(e) = app_state.audit_repo.append(entry).await {
        tracing::error!(user_id = %user.id, "🔥 Falha ao gravar log de auditoria: {}", e);
    }

    response
}

/// O que vai para a coluna `payload`: o JSON redigido, ou só um marcador quando o corpo
/// passa do limite de auditoria.
pub fn audit_payload(bytes: &[u8], is_json: bool, max_bytes: usize) -> Option<Value> {
    if !is_json {
        return None;
    }
    if bytes.len() > max_bytes {
        return Some(truncated_marker(Some(bytes.len())));
    }
    sanitize_payload(bytes)
}

fn truncated_marker(size_bytes: Option<usize>) -> Value {
    json!({ "truncated": true, "sizeBytes": size_bytes })
}

/// Interpreta o corpo como JSON e mascara os campos sensíveis.
/// Corpos vazios ou que não são JSON não são armazenados.
pub fn sanitize_payload(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    let mut value: Value = serde_json::from_slice(bytes).ok()?;
    redact(&mut value);
    Some(value)
}

// Percorre o JSON inteiro; qualquer chave "parecida com senha" tem o valor substituído
fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                let key = key.to_lowercase();
                if SENSITIVE_MARKERS.iter().any(|marker| key.contains(marker)) {
                    *field = Value::String(REDACTED.to_string());
                } else {
                    redact(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_like_fields_are_redacted() {
        let body = json!({
            "email": "chef@cozinha.com",
            "password": "hunter22",
            "newPassword": "outra",
            "profile": { "apiToken": "abc", "name": "Chef" },
            "users": [{ "client_secret": "x", "role": "staff" }]
        });
        let sanitized = sanitize_payload(body.to_string().as_bytes()).unwrap();

        assert_eq!(sanitized["email"], "chef@cozinha.com");
        assert_eq!(sanitized["password"], REDACTED);
        assert_eq!(sanitized["newPassword"], REDACTED);
        assert_eq!(sanitized["profile"]["apiToken"], REDACTED);
        assert_eq!(sanitized["profile"]["name"], "Chef");
        assert_eq!(sanitized["users"][0]["client_secret"], REDACTED);
        assert_eq!(sanitized["users"][0]["role"], "staff");
    }

    #[test]
    fn test_nested_object_under_sensitive_key_is_fully_masked() {
        let body = json!({ "credentials": { "password": "x" }, "secrets": { "a": 1 } });
        let sanitized = sanitize_payload(body.to_string().as_bytes()).unwrap();
        assert_eq!(sanitized["credentials"]["password"], REDACTED);
        assert_eq!(sanitized["secrets"], REDACTED);
    }

    #[test]
    fn test_non_json_and_empty_bodies_are_not_stored() {
        assert!(sanitize_payload(b"").is_none());
        assert!(sanitize_payload(b"name=chef&password=123").is_none());
    }

    #[test]
    fn test_body_over_audit_limit_is_replaced_by_marker() {
        let image = json!({ "imageBase64": "A".repeat(70 * 1024), "contentType": "image/png" });
        let bytes = image.to_string().into_bytes();

        let payload = audit_payload(&bytes, true, 64 * 1024).unwrap();
        assert_eq!(payload["truncated"], true);
        assert_eq!(payload["sizeBytes"], bytes.len());
        assert!(payload.get("imageBase64").is_none());

        let small = audit_payload(br#"{"password":"x","name":"Chef"}"#, true, 64 * 1024).unwrap();
        assert_eq!(small["password"], REDACTED);
        assert!(audit_payload(b"abc", false, 1).is_none());
    }
}
