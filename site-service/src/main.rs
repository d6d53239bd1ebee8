use site_service::{
    build_router,
    config::{Environment, SiteConfig},
    services::{AuthService, Database, EmailProvider, LogEmailService, SessionRegistry, SmtpEmailService},
    AppState,
};
use service_core::observability::logging::init_tracing;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<(), service_core::error::AppError> {
    // Load configuration, fail fast if invalid.
    let config = SiteConfig::from_env()?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.environment == Environment::Dev,
    );

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "starting site service"
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .map_err(|e| {
            service_core::error::AppError::DatabaseError(anyhow::anyhow!(
                "failed to connect to database: {}",
                e
            ))
        })?;

    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        service_core::error::AppError::DatabaseError(anyhow::anyhow!("migration failed: {}", e))
    })?;
    let db = Database::new(pool);
    tracing::info!("database initialized");

    tokio::fs::create_dir_all(&config.upload.dir).await?;

    let email: Arc<dyn EmailProvider> = match &config.smtp {
        Some(smtp) => Arc::new(SmtpEmailService::new(smtp)?),
        None => {
            tracing::warn!("SMTP not configured, login codes will only be logged");
            Arc::new(LogEmailService)
        }
    };

    // Admin sessions live in memory only; a restart logs everyone out.
    let sessions = SessionRegistry::new();
    let auth = AuthService::new(Arc::new(db.clone()), email.clone(), sessions, &config.auth);

    let state = AppState {
        config: config.clone(),
        db,
        email,
        auth,
    };
    let app = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.common.host, config.common.port)
        .parse()
        .map_err(|e: std::net::AddrParseError| {
            service_core::error::AppError::ConfigError(anyhow::anyhow!(e))
        })?;

    tracing::info!(address = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("service shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        },
    }
}
