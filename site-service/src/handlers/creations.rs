//! Portfolio creation handlers.
//!
//! Mutations that touch membership or rank go through the resequencer so
//! `sort_order` stays dense 1..N.

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{Creation, CreationImage};
use crate::services::RankedCollection;
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct CreationWithImages {
    #[serde(flatten)]
    pub creation: Creation,
    pub additional_images: Vec<CreationImage>,
}

#[derive(Debug, Deserialize)]
pub struct NewImage {
    pub image_url: String,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCreationRequest {
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub main_image: String,
    pub sort_order: Option<i32>,
    pub additional_images: Option<Vec<NewImage>>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCreationRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_type: Option<String>,
    pub main_image: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateImageRequest {
    pub sort_order: i32,
}

/// GET /api/creations
pub async fn list_creations(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CreationWithImages>>, AppError> {
    let creations = state.db.list_creations(query.limit).await?;

    let ids: Vec<i32> = creations.iter().map(|c| c.id).collect();
    let mut images_by_creation: HashMap<i32, Vec<CreationImage>> = HashMap::new();
    for image in state.db.images_for_creations(&ids).await? {
        images_by_creation
            .entry(image.creation_id)
            .or_default()
            .push(image);
    }

    let result = creations
        .into_iter()
        .map(|creation| {
            let additional_images = images_by_creation.remove(&creation.id).unwrap_or_default();
            CreationWithImages {
                creation,
                additional_images,
            }
        })
        .collect();
    Ok(Json(result))
}

/// GET /api/creations/event-types
pub async fn list_event_types(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.db.list_event_types().await?))
}

/// GET /api/creations/:id
pub async fn get_creation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<CreationWithImages>, AppError> {
    let creation = state
        .db
        .find_creation(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("creation {} not found", id)))?;
    let additional_images = state.db.images_for_creation(id).await?;
    Ok(Json(CreationWithImages {
        creation,
        additional_images,
    }))
}

/// POST /api/creations
pub async fn create_creation(
    State(state): State<AppState>,
    Json(req): Json<CreateCreationRequest>,
) -> Result<(StatusCode, Json<CreationWithImages>), AppError> {
    if req.title.trim().is_empty()
        || req.description.trim().is_empty()
        || req.event_type.trim().is_empty()
        || req.main_image.trim().is_empty()
    {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "title, description, event_type and main_image are required"
        )));
    }

    // Inserted with the sentinel rank, then resequenced into place: creation
    // and re-ranking share one code path.
    let creation = state
        .db
        .insert_creation(&req.title, &req.description, &req.event_type, &req.main_image)
        .await?;

    for image in req.additional_images.unwrap_or_default() {
        state
            .db
            .insert_creation_image(creation.id, &image.image_url, image.sort_order.unwrap_or(0))
            .await?;
    }

    let target = req.sort_order.map(|rank| (creation.id, rank));
    state
        .db
        .resequence(RankedCollection::Creations, target)
        .await?;

    let creation = state
        .db
        .find_creation(creation.id)
        .await?
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("creation vanished after insert")))?;
    let additional_images = state.db.images_for_creation(creation.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreationWithImages {
            creation,
            additional_images,
        }),
    ))
}

/// PUT /api/creations/:id
pub async fn update_creation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateCreationRequest>,
) -> Result<Json<Creation>, AppError> {
    let updated = state
        .db
        .update_creation(
            id,
            req.title.as_deref(),
            req.description.as_deref(),
            req.event_type.as_deref(),
            req.main_image.as_deref(),
        )
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("creation {} not found", id)))?;

    if let Some(rank) = req.sort_order {
        state
            .db
            .resequence(RankedCollection::Creations, Some((id, rank)))
            .await?;
    }

    let creation = state.db.find_creation(id).await?.unwrap_or(updated);
    Ok(Json(creation))
}

/// DELETE /api/creations/:id
pub async fn delete_creation(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.db.delete_creation(id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "creation {} not found",
            id
        )));
    }
    // Close the gap left by the deleted row.
    state.db.resequence(RankedCollection::Creations, None).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}

/// POST /api/creations/:id/images
pub async fn add_creation_image(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<NewImage>,
) -> Result<(StatusCode, Json<CreationImage>), AppError> {
    if req.image_url.trim().is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("image_url is required")));
    }
    state
        .db
        .find_creation(id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("creation {} not found", id)))?;

    let image = state
        .db
        .insert_creation_image(id, &req.image_url, req.sort_order.unwrap_or(0))
        .await?;
    Ok((StatusCode::CREATED, Json(image)))
}

/// PUT /api/creations/images/:image_id
pub async fn update_creation_image(
    State(state): State<AppState>,
    Path(image_id): Path<i32>,
    Json(req): Json<UpdateImageRequest>,
) -> Result<Json<CreationImage>, AppError> {
    let image = state
        .db
        .update_creation_image(image_id, req.sort_order)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("image {} not found", image_id)))?;
    Ok(Json(image))
}

/// DELETE /api/creations/images/:image_id
pub async fn delete_creation_image(
    State(state): State<AppState>,
    Path(image_id): Path<i32>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.db.delete_creation_image(image_id).await? {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "image {} not found",
            image_id
        )));
    }
    Ok(Json(serde_json::json!({ "success": true })))
}
