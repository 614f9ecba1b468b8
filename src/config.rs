// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

use crate::{
    common::i18n::I18nStore,
    db::{
        AuditRepository, CatalogRepository, FinanceRepository, InventoryRepository, OcrRepository,
        OrdersRepository, PersonalFinanceRepository, PortalRepository, ProcurementRepository,
        ProductionRepository, RbacRepository, UserRepository,
    },
    services::{
        auth::AuthService,
        catalog_service::CatalogService,
        finance_service::FinanceService,
        inventory_service::InventoryService,
        ocr_service::{DisabledOcrEngine, HttpOcrEngine, OcrEngine, OcrService},
        order_service::OrderService,
        personal_finance_service::PersonalFinanceService,
        portal_service::PortalService,
        procurement_service::ProcurementService,
        production_service::ProductionService,
        rbac_service::RbacService,
    },
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} deve ser definida")]
    Missing(&'static str),

    #[error("{name} inválida: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Configuração lida das variáveis de ambiente (o `.env` é carregado pelo main).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub jwt_ttl_hours: i64,
    pub audit_max_body_bytes: usize,
    pub ocr_service_url: Option<String>,
    pub ocr_timeout: Duration,
    pub cors_allowed_origin: Option<String>,
    // Usuário promovido a admin na inicialização e no cadastro
    pub admin_email: Option<String>,
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            return Err(ConfigError::Invalid {
                name: "JWT_SECRET",
                reason: "precisa de pelo menos 32 bytes".into(),
            });
        }

        let jwt_ttl_hours: i64 = parsed_or("JWT_TTL_HOURS", 168)?;
        if jwt_ttl_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "JWT_TTL_HOURS",
                reason: "deve ser maior que zero".into(),
            });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret,
            bind_addr: optional("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            db_max_connections: parsed_or("DB_MAX_CONNECTIONS", 5)?,
            db_acquire_timeout: Duration::from_secs(parsed_or("DB_ACQUIRE_TIMEOUT_SECS", 3)?),
            jwt_ttl_hours,
            audit_max_body_bytes: parsed_or("AUDIT_MAX_BODY_BYTES", 64 * 1024)?,
            ocr_service_url: optional("OCR_SERVICE_URL"),
            ocr_timeout: Duration::from_secs(parsed_or("OCR_TIMEOUT_SECS", 20)?),
            cors_allowed_origin: optional("CORS_ALLOWED_ORIGIN"),
            admin_email: optional("ADMIN_EMAIL"),
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub config: Arc<Config>,
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub rbac_service: RbacService,
    pub catalog_service: CatalogService,
    pub inventory_service: InventoryService,
    pub procurement_service: ProcurementService,
    pub order_service: OrderService,
    pub production_service: ProductionService,
    pub finance_service: FinanceService,
    pub ocr_service: OcrService,
    pub portal_service: PortalService,
    pub personal_finance_service: PersonalFinanceService,
    pub audit_repo: AuditRepository,
}

impl AppState {
    /// Conecta ao banco e monta o gráfico de dependências.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .acquire_timeout(config.db_acquire_timeout)
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");
        Self::with_pool(config, db_pool)
    }

    /// Monta o estado sobre um pool já criado (os testes usam um pool preguiçoso).
    pub fn with_pool(config: Config, db_pool: PgPool) -> anyhow::Result<Self> {
        let i18n_store = Arc::new(I18nStore::load()?);

        let engine: Arc<dyn OcrEngine> = match &config.ocr_service_url {
            Some(url) => {
                tracing::info!(%url, "OCR de imagens habilitado");
                Arc::new(HttpOcrEngine::new(url.clone(), config.ocr_timeout)?)
            }
            None => {
                tracing::warn!("OCR_SERVICE_URL ausente: OCR de imagens desabilitado");
                Arc::new(DisabledOcrEngine)
            }
        };

        // --- Repositórios ---
        let user_repo = UserRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let catalog_repo = CatalogRepository::new(db_pool.clone());
        let inventory_repo = InventoryRepository::new(db_pool.clone());
        let finance_repo = FinanceRepository::new(db_pool.clone());
        let audit_repo = AuditRepository::new(db_pool.clone());

        // --- Serviços ---
        let auth_service = AuthService::new(
            user_repo.clone(),
            rbac_repo.clone(),
            config.jwt_secret.clone(),
            chrono::Duration::hours(config.jwt_ttl_hours),
            config.admin_email.clone(),
            db_pool.clone(),
        );
        let rbac_service = RbacService::new(rbac_repo, user_repo, db_pool.clone());
        let catalog_service = CatalogService::new(catalog_repo.clone(), db_pool.clone());
        let inventory_service =
            InventoryService::new(inventory_repo, catalog_repo.clone(), db_pool.clone());
        let finance_service = FinanceService::new(finance_repo, db_pool.clone());
        let procurement_service = ProcurementService::new(
            ProcurementRepository::new(db_pool.clone()),
            inventory_service.clone(),
            finance_service.clone(),
            db_pool.clone(),
        );
        let order_service = OrderService::new(
            OrdersRepository::new(db_pool.clone()),
            catalog_repo.clone(),
            finance_service.clone(),
            db_pool.clone(),
        );
        let production_service = ProductionService::new(
            ProductionRepository::new(db_pool.clone()),
            inventory_service.clone(),
            db_pool.clone(),
        );
        let ocr_service = OcrService::new(
            OcrRepository::new(db_pool.clone()),
            catalog_repo,
            engine,
            db_pool.clone(),
        );
        let portal_service = PortalService::new(
            PortalRepository::new(db_pool.clone()),
            catalog_service.clone(),
            db_pool.clone(),
        );
        let personal_finance_service =
            PersonalFinanceService::new(PersonalFinanceRepository::new(db_pool.clone()), db_pool.clone());

        Ok(Self {
            db_pool,
            config: Arc::new(config),
            i18n_store,
            auth_service,
            rbac_service,
            catalog_service,
            inventory_service,
            procurement_service,
            order_service,
            production_service,
            finance_service,
            ocr_service,
            portal_service,
            personal_finance_service,
            audit_repo,
        })
    }
}
