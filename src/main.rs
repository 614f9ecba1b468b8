// src/main.rs

use anyhow::Context;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use backoffice::{
    config::{AppState, Config},
    routes::app_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env é opcional: em produção as variáveis vêm do ambiente
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env().context("Configuração inválida")?;
    let bind_addr = config.bind_addr.clone();

    let app_state = AppState::new(config)
        .await
        .context("Falha ao inicializar o estado da aplicação")?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados")?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let synced = app_state.rbac_service.sync_permissions().await?;
    tracing::info!(permissions = synced, "✅ Permissões sincronizadas");

    if let Some(admin_email) = app_state.config.admin_email.clone() {
        app_state
            .rbac_service
            .bootstrap_admin(&admin_email)
            .await
            .context("Falha ao garantir o administrador inicial")?;
    }

    let app = app_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Falha ao escutar em {bind_addr}"))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}
