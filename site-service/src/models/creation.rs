//! Portfolio creation and its gallery images.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A portfolio entry shown on the public site. `sort_order` is dense 1..N
/// across the whole collection and is only ever written by the resequencer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Creation {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub event_type: String,
    pub main_image: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

/// Additional gallery image belonging to one creation. Its `sort_order` is
/// scoped to the parent and written as given (no dense invariant).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CreationImage {
    pub id: i32,
    pub creation_id: i32,
    pub image_url: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}
