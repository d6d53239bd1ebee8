use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Free-form key/value site setting (owner email, about text, ...).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SiteSetting {
    pub id: i32,
    pub key: String,
    pub value: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Setting key holding the admin/owner email address, the recipient of
/// login codes and quote notifications.
pub const OWNER_EMAIL_KEY: &str = "email";
