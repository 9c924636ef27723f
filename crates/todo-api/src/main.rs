//! todo-api バイナリのエントリポイント

use anyhow::Context;
use infrastructure::{DynamoDbClient, DynamoTodoRepository, InMemoryTodoRepository, TodoRepository};
use shared::{init_tracing, Config, JwtSessionResolver, StoreBackend};
use std::sync::Arc;
use todo_api::{app_with_state, cors_layer, AppState};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing().map_err(|e| anyhow::anyhow!(e))?;

    let config = Config::from_env().context("failed to load configuration")?;
    info!(?config, "configuration loaded");

    let repository: Arc<dyn TodoRepository> = match config.store_backend {
        StoreBackend::DynamoDb => {
            let db = DynamoDbClient::new(&config).await;
            Arc::new(DynamoTodoRepository::new(db))
        }
        StoreBackend::Memory => {
            warn!("using in-memory store; todos are lost on restart");
            Arc::new(InMemoryTodoRepository::new())
        }
    };
    let sessions = Arc::new(JwtSessionResolver::new(config.session_secret.as_bytes()));

    let state =
        AppState::new(repository, sessions).with_ownership_check(config.enforce_ownership);
    let mut router = app_with_state(state);
    if let Some(origin) = &config.cors_allowed_origin {
        router = router.layer(cors_layer(origin).context("invalid CORS_ALLOWED_ORIGIN")?);
    }

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "server starting");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
