use axum::extract::{Json, Path, State};
use serde::Deserialize;

use crate::models::SocialLink;
use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct UpdateSocialLinkRequest {
    pub url: String,
}

/// GET /api/social-links
pub async fn list_social_links(
    State(state): State<AppState>,
) -> Result<Json<Vec<SocialLink>>, AppError> {
    Ok(Json(state.db.list_social_links().await?))
}

/// PUT /api/social-links/:id
pub async fn update_social_link(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(req): Json<UpdateSocialLinkRequest>,
) -> Result<Json<SocialLink>, AppError> {
    let link = state
        .db
        .update_social_link(id, &req.url)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("social link {} not found", id)))?;
    Ok(Json(link))
}
