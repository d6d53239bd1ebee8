//! Shared state builder for router-level tests.
//!
//! The pool is created lazily and never connects, so tests built on this
//! state only cover paths that stay out of the database.

use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use site_service::config::{
    AuthSettings, DatabaseConfig, Environment, SecurityConfig, SiteConfig, UploadConfig,
};
use site_service::services::{AuthService, Database, MockEmailService, SessionRegistry};
use site_service::AppState;

pub fn test_state() -> (AppState, SessionRegistry) {
    let config = SiteConfig {
        common: service_core::config::Config {
            port: 5000,
            host: "127.0.0.1".to_string(),
        },
        environment: Environment::Dev,
        service_name: "site-service".to_string(),
        service_version: "0.0.0".to_string(),
        log_level: "info".to_string(),
        database: DatabaseConfig {
            url: "postgres://postgres@localhost/unused".to_string(),
            max_connections: 1,
        },
        smtp: None,
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        auth: AuthSettings {
            code_ttl_minutes: 10,
            session_ttl_hours: 24,
        },
        upload: UploadConfig {
            dir: std::env::temp_dir().display().to_string(),
        },
    };

    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("lazy pool");
    let db = Database::new(pool);

    let sessions = SessionRegistry::new();
    let auth = AuthService::new(
        Arc::new(db.clone()),
        Arc::new(MockEmailService),
        sessions.clone(),
        &config.auth,
    );

    let state = AppState {
        config,
        db,
        email: Arc::new(MockEmailService),
        auth,
    };
    (state, sessions)
}
