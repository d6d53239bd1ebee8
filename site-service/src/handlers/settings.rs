use axum::extract::{Json, Path, State};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize)]
pub struct UpdateSettingRequest {
    pub value: String,
}

/// GET /api/settings — all settings as a flat key/value object.
pub async fn get_settings(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let mut settings = Map::new();
    for row in state.db.list_settings().await? {
        settings.insert(row.key, Value::String(row.value));
    }
    Ok(Json(Value::Object(settings)))
}

/// PUT /api/settings/:key — upsert a single setting.
pub async fn update_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<UpdateSettingRequest>,
) -> Result<Json<Value>, AppError> {
    state.db.upsert_setting(&key, &req.value).await?;
    Ok(Json(serde_json::json!({ "success": true })))
}
