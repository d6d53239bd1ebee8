//! Image upload: store bytes under the upload directory, return a URL.

use axum::extract::{Json, Multipart, State};
use rand::Rng;
use serde::Serialize;
use std::path::Path;

use crate::AppState;
use service_core::error::AppError;

/// Per-image size cap, as the original enforced.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub const MAX_FILES_PER_REQUEST: usize = 20;

/// Whole-request cap: a full batch of maximum-size images plus multipart
/// framing. The per-image limit is enforced field by field.
pub const UPLOAD_BODY_LIMIT: usize = MAX_FILES_PER_REQUEST * MAX_IMAGE_BYTES + 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct MultiUploadResponse {
    pub urls: Vec<String>,
}

/// POST /api/upload — single image, field name `image`.
pub async fn upload_single(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?
    {
        if field.name() != Some("image") {
            continue;
        }
        let url = store_image_field(&state, field).await?;
        return Ok(Json(UploadResponse { url }));
    }
    Err(AppError::BadRequest(anyhow::anyhow!("no image provided")))
}

/// POST /api/upload/multiple — up to 20 images, field name `images`.
pub async fn upload_multiple(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<MultiUploadResponse>, AppError> {
    let mut urls = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?
    {
        if field.name() != Some("images") {
            continue;
        }
        if urls.len() >= MAX_FILES_PER_REQUEST {
            return Err(AppError::BadRequest(anyhow::anyhow!(
                "at most {} images per request",
                MAX_FILES_PER_REQUEST
            )));
        }
        urls.push(store_image_field(&state, field).await?);
    }

    if urls.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!("no image provided")));
    }
    Ok(Json(MultiUploadResponse { urls }))
}

async fn store_image_field(
    state: &AppState,
    field: axum::extract::multipart::Field<'_>,
) -> Result<String, AppError> {
    let content_type = field.content_type().unwrap_or_default().to_string();
    if !content_type.starts_with("image/") {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "only images are allowed"
        )));
    }

    let extension = field
        .file_name()
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .unwrap_or("jpg")
        .to_ascii_lowercase();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!(e)))?;
    if data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "image exceeds the {} MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    let file_name = format!(
        "{}-{}.{}",
        chrono::Utc::now().timestamp_millis(),
        rand::thread_rng().gen_range(0..1_000_000),
        extension
    );
    let path = Path::new(&state.config.upload.dir).join(&file_name);

    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("failed to store upload: {}", e)))?;

    tracing::info!(file = %file_name, bytes = data.len(), "image stored");
    Ok(format!("/uploads/{}", file_name))
}
