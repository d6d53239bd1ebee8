//! Offered-services handlers; same resequencing discipline as creations.

use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use serde::Deserialize;

use crate::models::Service;
use crate::services::RankedCollection;
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct CreateServiceRequest {
    pub title: String,
    pub description: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateServiceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
}

/// GET /api/services
pub async fn list_services(State(state): State<AppState>) -> Result<Json<Vec<Service>>, AppError> {
    Ok(Json(state.db.list_services().await?))
}

/// POST /api/services
pub async fn create_service(
    State(state): State<AppState>,
    Json(req): Json<CreateServiceRequest>,
) -> Result<(StatusCode, Json<Service>), AppError> {
    if req.title.trim().is_empty() || req.description.trim().is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "title and description are required"
        )));
    }

    let service = state.db.insert_service(&req.title, &req.description).await?;

    let target = req.sort_order.map(|rank| (service.id, rank));
    state
        .db
        .resequence(RankedCollection::Services, target)
        .await?;

    let service = state
        .db
        .find_service(service.id)
        .await?
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("service vanished after insert")))?;
    Ok((StatusCode::CREATED, Json(service)))
}

/// PUT /api/services/:id
pub async fn update_service(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateServiceRequest>,
) -> Result<Json<Service>, AppError> {
    let updated = state
        .db
        .update_service(id, req.title.as_deref(), req.description.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("service {} not found", id)))?;

    if let Some(rank) = req.sort_order {
        state
            .db
            .resequence(RankedCollection::Services, Some((id, rank)))
            .await?;
    }

    let service = state.db.find_service(id).await?.unwrap_or(updated);
    Ok(Json(service))
}

/// DELETE /api/services/:id
pub async fn delete_service(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.db.delete_service(id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "service {} not found",
            id
        )));
    }
    state.db.resequence(RankedCollection::Services, None).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
