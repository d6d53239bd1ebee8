pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    extract::DefaultBodyLimit,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::config::SiteConfig;
use crate::services::{AuthService, Database, EmailProvider};
use service_core::error::AppError;

#[derive(Clone)]
pub struct AppState {
    pub config: SiteConfig,
    pub db: Database,
    pub email: Arc<dyn EmailProvider>,
    pub auth: AuthService,
}

pub fn build_router(state: AppState) -> Router {
    // Admin surface: every mutation and the quote-request listing sit
    // behind the bearer-token guard.
    let admin_routes = Router::new()
        .route("/api/creations", post(handlers::creations::create_creation))
        .route(
            "/api/creations/:id",
            put(handlers::creations::update_creation)
                .delete(handlers::creations::delete_creation),
        )
        .route(
            "/api/creations/:id/images",
            post(handlers::creations::add_creation_image),
        )
        .route(
            "/api/creations/images/:image_id",
            put(handlers::creations::update_creation_image)
                .delete(handlers::creations::delete_creation_image),
        )
        .route("/api/services", post(handlers::services::create_service))
        .route(
            "/api/services/:id",
            put(handlers::services::update_service).delete(handlers::services::delete_service),
        )
        .route("/api/settings/:key", put(handlers::settings::update_setting))
        .route(
            "/api/social-links/:id",
            put(handlers::social_links::update_social_link),
        )
        .route("/api/contact", get(handlers::contact::list_contact_requests))
        .route("/api/upload", post(handlers::upload::upload_single))
        .route("/api/upload/multiple", post(handlers::upload::upload_multiple))
        .layer(DefaultBodyLimit::max(handlers::upload::UPLOAD_BODY_LIMIT))
        .layer(from_fn_with_state(
            state.clone(),
            middleware::admin_auth_middleware,
        ));

    let public_routes = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/creations", get(handlers::creations::list_creations))
        .route(
            "/api/creations/event-types",
            get(handlers::creations::list_event_types),
        )
        .route("/api/creations/:id", get(handlers::creations::get_creation))
        .route("/api/services", get(handlers::services::list_services))
        .route("/api/settings", get(handlers::settings::get_settings))
        .route(
            "/api/social-links",
            get(handlers::social_links::list_social_links),
        )
        .route("/api/contact", post(handlers::contact::submit_contact_request))
        .route("/api/auth/send-code", post(handlers::auth::send_code))
        .route("/api/auth/verify-code", post(handlers::auth::verify_code))
        .route("/api/auth/verify-token", post(handlers::auth::verify_token))
        .route("/api/auth/logout", post(handlers::auth::logout));

    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .security
                .allowed_origins
                .iter()
                .filter_map(|origin| {
                    origin
                        .parse::<axum::http::HeaderValue>()
                        .map_err(|e| {
                            tracing::error!("invalid CORS origin '{}': {}", origin, e);
                            e
                        })
                        .ok()
                })
                .collect::<Vec<axum::http::HeaderValue>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .nest_service("/uploads", ServeDir::new(&state.config.upload.dir))
        .with_state(state)
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

/// Service health check.
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Result<axum::Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "database health check failed");
        e
    })?;

    Ok(axum::Json(serde_json::json!({
        "status": "ok",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    })))
}
