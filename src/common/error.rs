// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

use crate::{common::i18n::I18nStore, middleware::i18n::Locale};

// O erro de domínio. Toda a aplicação fala AppError; só a borda HTTP conhece ApiError.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Permissão ausente: {0}")]
    PermissionDenied(String),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(String),

    #[error("Transição inválida de {entity}: {from} -> {to}")]
    InvalidStateTransition {
        entity: &'static str,
        from: String,
        to: String,
    },

    #[error("Estoque insuficiente no item {stock_item_id}: disponível {available}, solicitado {requested}")]
    InsufficientStock {
        stock_item_id: Uuid,
        available: Decimal,
        requested: Decimal,
    },

    // A string é a chave de tradução da regra violada
    #[error("Regra de negócio violada: {0}")]
    BusinessRule(&'static str),

    // Conflito com o estado atual do recurso; a string é a chave de tradução
    #[error("Conflito: {0}")]
    Conflict(&'static str),

    #[error("Corpo da requisição grande demais")]
    PayloadTooLarge,

    #[error("OCR não configurado")]
    OcrUnavailable,

    #[error("Falha no OCR: {0}")]
    OcrFailed(String),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro ao gerar CSV: {0}")]
    CsvError(#[from] csv::Error),
}

// O que efetivamente sai na resposta HTTP
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "detail": self.error,
            "code": self.code,
        });
        if let Some(details) = self.details {
            body["errors"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    /// Status HTTP e chave de tradução de cada variante.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "email_already_exists"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found"),
            AppError::PermissionDenied(_) => (StatusCode::FORBIDDEN, "permission_denied"),
            AppError::ResourceNotFound(_) => (StatusCode::NOT_FOUND, "resource_not_found"),
            AppError::UniqueConstraintViolation(_) => (StatusCode::CONFLICT, "already_exists"),
            AppError::InvalidStateTransition { .. } => (StatusCode::CONFLICT, "invalid_transition"),
            AppError::InsufficientStock { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "insufficient_stock")
            }
            AppError::BusinessRule(key) => (StatusCode::UNPROCESSABLE_ENTITY, *key),
            AppError::Conflict(key) => (StatusCode::CONFLICT, *key),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large"),
            AppError::OcrUnavailable => (StatusCode::SERVICE_UNAVAILABLE, "ocr_unavailable"),
            AppError::OcrFailed(_) => (StatusCode::BAD_GATEWAY, "ocr_failed"),
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                (StatusCode::NOT_FOUND, "resource_not_found")
            }
            AppError::DatabaseError(sqlx::Error::Database(db_err)) => {
                if db_err.is_unique_violation() {
                    (StatusCode::CONFLICT, "already_exists")
                } else if db_err.is_foreign_key_violation() {
                    (StatusCode::BAD_REQUEST, "invalid_reference")
                } else if db_err.is_check_violation() {
                    (StatusCode::BAD_REQUEST, "constraint_violated")
                } else {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    /// Converte o erro de domínio numa resposta traduzida para o idioma do cliente.
    pub fn to_api_error(self, locale: &Locale, store: &I18nStore) -> ApiError {
        let lang = locale.0.as_str();
        let (status, code) = self.status_and_code();

        if status.is_server_error() {
            tracing::error!("Erro Interno do Servidor: {}", self);
        } else {
            tracing::debug!(code, "Requisição rejeitada: {}", self);
        }

        let params: Vec<(&str, String)> = match &self {
            AppError::PermissionDenied(slug) => vec![("permission", slug.clone())],
            AppError::ResourceNotFound(resource) => vec![("resource", resource.clone())],
            AppError::UniqueConstraintViolation(resource) => vec![("resource", resource.clone())],
            AppError::InvalidStateTransition { entity, from, to } => vec![
                ("entity", (*entity).to_string()),
                ("from", from.clone()),
                ("to", to.clone()),
            ],
            AppError::InsufficientStock { available, requested, .. } => vec![
                ("available", available.normalize().to_string()),
                ("requested", requested.normalize().to_string()),
            ],
            AppError::OcrFailed(reason) => vec![("reason", reason.clone())],
            AppError::DatabaseError(sqlx::Error::RowNotFound) => {
                vec![("resource", "Registro".to_string())]
            }
            AppError::DatabaseError(sqlx::Error::Database(db_err)) => vec![(
                "resource",
                db_err.constraint().unwrap_or_default().to_string(),
            )],
            _ => Vec::new(),
        };

        let details = match &self {
            AppError::ValidationError(errors) => Some(validation_details(errors, lang, store)),
            AppError::InsufficientStock { stock_item_id, .. } => {
                Some(json!({ "stockItemId": stock_item_id }))
            }
            _ => None,
        };

        ApiError {
            status,
            code,
            error: store.translate(lang, code, &params),
            details,
        }
    }
}

// Devolve { campo: [mensagens] } com as mensagens já traduzidas
fn validation_details(
    errors: &validator::ValidationErrors,
    lang: &str,
    store: &I18nStore,
) -> Value {
    let mut details = serde_json::Map::new();
    for (field, field_errors) in errors.field_errors() {
        let messages: Vec<Value> = field_errors
            .iter()
            .map(|e| {
                let key = e.message.as_deref().unwrap_or(&*e.code);
                Value::String(store.translate(lang, key, &[]))
            })
            .collect();
        details.insert(field.to_string(), Value::Array(messages));
    }
    Value::Object(details)
}

// Para quem não tem o Locale em mãos (middlewares, extratores)
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default(), I18nStore::fallback())
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(status_of(AppError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::EmailAlreadyExists), StatusCode::CONFLICT);
        assert_eq!(
            status_of(AppError::PermissionDenied("finance:write".into())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            status_of(AppError::ResourceNotFound("Pedido".into())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::DatabaseError(sqlx::Error::RowNotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(AppError::BusinessRule("order_without_items")),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(AppError::Conflict("receivable_settled_by_payments")),
            StatusCode::CONFLICT
        );
        assert_eq!(status_of(AppError::OcrUnavailable), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            status_of(AppError::InternalServerError(anyhow::anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_insufficient_stock_message_is_translated() {
        let store = I18nStore::fallback();
        let err = AppError::InsufficientStock {
            stock_item_id: Uuid::nil(),
            available: Decimal::new(25, 1),
            requested: Decimal::new(4, 0),
        };
        let api = err.to_api_error(&Locale("en".into()), store);
        assert_eq!(api.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(api.code, "insufficient_stock");
        assert_eq!(api.error, "Insufficient stock: available 2.5, requested 4.");
        assert!(api.details.is_some());
    }

    #[test]
    fn test_invalid_transition_message() {
        let err = AppError::InvalidStateTransition {
            entity: "Lote",
            from: "CANCELLED".into(),
            to: "DONE".into(),
        };
        let api = err.to_api_error(&Locale("pt".into()), I18nStore::fallback());
        assert_eq!(api.status, StatusCode::CONFLICT);
        assert_eq!(api.error, "Lote não pode passar de CANCELLED para DONE.");
    }

    #[test]
    fn test_validation_details_list_translated_messages() {
        let mut errors = validator::ValidationErrors::new();
        let mut field_error = validator::ValidationError::new("range");
        field_error.message = Some("must_be_positive".into());
        errors.add("quantity", field_error);

        let api = AppError::ValidationError(errors)
            .to_api_error(&Locale("pt".into()), I18nStore::fallback());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["quantity"][0], "O valor deve ser maior que zero.");
    }
}
