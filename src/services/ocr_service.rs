// src/services/ocr_service.rs

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{error::AppError, validation::field_error},
    db::{CatalogRepository, OcrRepository},
    models::ocr::{LabelSource, LabelStatus, NutritionLabel},
    services::nutrition_parser::parse_label,
};

/// Extrai o texto de uma imagem de rótulo.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn extract_text(&self, image: &[u8], content_type: &str) -> Result<String, AppError>;
}

// ---
// Motor HTTP
// ---

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OcrRequest<'a> {
    content_type: &'a str,
    image_base64: String,
}

#[derive(Deserialize)]
struct OcrResponse {
    text: String,
}

/// Envia a imagem para um serviço de OCR externo e lê `{ "text": ... }` de volta.
pub struct HttpOcrEngine {
    client: Client,
    url: String,
}

impl HttpOcrEngine {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("cliente HTTP do OCR: {e}")))?;
        Ok(Self { client, url: url.into() })
    }
}

#[async_trait]
impl OcrEngine for HttpOcrEngine {
    async fn extract_text(&self, image: &[u8], content_type: &str) -> Result<String, AppError> {
        let body = OcrRequest {
            content_type,
            image_base64: STANDARD.encode(image),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Serviço de OCR inacessível");
                AppError::OcrFailed(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(%status, "Serviço de OCR respondeu com erro");
            return Err(AppError::OcrFailed(format!("HTTP {status}")));
        }

        let parsed: OcrResponse = response
            .json()
            .await
            .map_err(|e| AppError::OcrFailed(e.to_string()))?;
        Ok(parsed.text)
    }
}

/// Usado quando OCR_SERVICE_URL não está configurada. Texto colado continua funcionando.
pub struct DisabledOcrEngine;

#[async_trait]
impl OcrEngine for DisabledOcrEngine {
    async fn extract_text(&self, _image: &[u8], _content_type: &str) -> Result<String, AppError> {
        Err(AppError::OcrUnavailable)
    }
}

// ---
// Serviço
// ---

#[derive(Debug, Clone, Default)]
pub struct LabelSubmission {
    pub text: Option<String>,
    pub image_base64: Option<String>,
    pub content_type: Option<String>,
    pub ingredient_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct OcrService {
    repo: OcrRepository,
    catalog_repo: CatalogRepository,
    engine: Arc<dyn OcrEngine>,
    pool: PgPool,
}

impl OcrService {
    pub fn new(
        repo: OcrRepository,
        catalog_repo: CatalogRepository,
        engine: Arc<dyn OcrEngine>,
        pool: PgPool,
    ) -> Self {
        Self { repo, catalog_repo, engine, pool }
    }

    pub async fn submit(&self, submission: LabelSubmission, submitted_by: Uuid) -> Result<NutritionLabel, AppError> {
        let (source, raw_text) = match (submission.text, submission.image_base64) {
            (Some(text), _) if !text.trim().is_empty() => (LabelSource::Text, text),
            (_, Some(image)) if !image.trim().is_empty() => {
                let bytes = STANDARD
                    .decode(image.trim())
                    .map_err(|_| field_error("imageBase64", "invalid_image"))?;
                let content_type = submission.content_type.as_deref().unwrap_or("image/jpeg");
                (LabelSource::Image, self.engine.extract_text(&bytes, content_type).await?)
            }
            _ => return Err(field_error("text", "label_without_content")),
        };

        if let Some(ingredient_id) = submission.ingredient_id {
            self.catalog_repo
                .find_ingredient(&self.pool, ingredient_id)
                .await?
                .ok_or_else(|| AppError::ResourceNotFound("Ingrediente".into()))?;
        }

        let parsed = parse_label(&raw_text);
        let label = self
            .repo
            .create_label(&self.pool, submission.ingredient_id, source, &raw_text, &parsed, submitted_by)
            .await?;

        tracing::info!(label_id = %label.id, confidence = %parsed.confidence, "Rótulo nutricional recebido");
        Ok(label)
    }

    pub async fn list(&self, status: Option<LabelStatus>) -> Result<Vec<NutritionLabel>, AppError> {
        self.repo.list_labels(status).await
    }

    pub async fn get(&self, id: Uuid) -> Result<NutritionLabel, AppError> {
        self.repo
            .find_label(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Rótulo".into()))
    }

    /// Grava no ingrediente os valores por 100 g e marca o rótulo como APPLIED.
    pub async fn apply(&self, id: Uuid, ingredient_id: Option<Uuid>) -> Result<NutritionLabel, AppError> {
        let mut tx = self.pool.begin().await?;
        let label = self
            .repo
            .lock_label(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Rótulo".into()))?;

        if label.status != LabelStatus::PendingReview {
            return Err(AppError::InvalidStateTransition {
                entity: "Rótulo",
                from: label.status.as_str().into(),
                to: LabelStatus::Applied.as_str().into(),
            });
        }

        let target = ingredient_id
            .or(label.ingredient_id)
            .ok_or(AppError::BusinessRule("label_without_ingredient"))?;
        if !label.parsed.has_values() {
            return Err(AppError::BusinessRule("label_without_values"));
        }

        let facts = label
            .parsed
            .per_100g()
            .ok_or_else(|| field_error("parsed", "nutrition_out_of_range"))?;
        self.catalog_repo
            .update_ingredient(&mut *tx, target, None, None, None, &facts)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Ingrediente".into()))?;

        let label = self
            .repo
            .set_status(&mut *tx, id, LabelStatus::Applied, Some(target))
            .await?;
        tx.commit().await?;

        tracing::info!(label_id = %id, ingredient_id = %target, "Valores nutricionais aplicados ao ingrediente");
        Ok(label)
    }

    pub async fn reject(&self, id: Uuid) -> Result<NutritionLabel, AppError> {
        let mut tx = self.pool.begin().await?;
        let label = self
            .repo
            .lock_label(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Rótulo".into()))?;

        match label.status {
            LabelStatus::Rejected => Ok(label),
            LabelStatus::Applied => Err(AppError::InvalidStateTransition {
                entity: "Rótulo",
                from: label.status.as_str().into(),
                to: LabelStatus::Rejected.as_str().into(),
            }),
            LabelStatus::PendingReview => {
                let label = self
                    .repo
                    .set_status(&mut *tx, id, LabelStatus::Rejected, None)
                    .await?;
                tx.commit().await?;
                tracing::info!(label_id = %id, "Rótulo rejeitado");
                Ok(label)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_engine_reports_unavailable() {
        let err = DisabledOcrEngine
            .extract_text(b"\x89PNG", "image/png")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::OcrUnavailable));
    }

    #[test]
    fn test_request_body_uses_camel_case() {
        let body = OcrRequest {
            content_type: "image/png",
            image_base64: STANDARD.encode(b"abc"),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contentType"], "image/png");
        assert_eq!(json["imageBase64"], "YWJj");
    }
}
