use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SocialLink {
    pub id: i32,
    pub platform: String,
    pub url: String,
    pub sort_order: i32,
}
