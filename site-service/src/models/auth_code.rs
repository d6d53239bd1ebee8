//! One-time login code for the admin panel.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A 6-digit login code. At most one unused, unexpired code is redeemable
/// at any time: issuing a new code marks every previous unused code used.
#[derive(Debug, Clone, FromRow)]
pub struct AuthCode {
    pub id: i32,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}

impl AuthCode {
    /// Still redeemable: not expired and not used.
    pub fn is_valid(&self) -> bool {
        !self.used && self.expires_at > Utc::now()
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}
