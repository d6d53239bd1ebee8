//! PostgreSQL database service for the studio site.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use service_core::error::AppError;
use sqlx::postgres::PgPool;
use std::collections::HashMap;

use crate::models::{ContactRequest, Creation, CreationImage, Service, SiteSetting, SocialLink};
use crate::services::auth::AuthCodeStore;
use crate::services::ordering::{self, RankSlot};

/// The two collections kept under the dense 1..N ordering invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankedCollection {
    Creations,
    Services,
}

impl RankedCollection {
    fn table(&self) -> &'static str {
        match self {
            RankedCollection::Creations => "creations",
            RankedCollection::Services => "services",
        }
    }
}

/// PostgreSQL database wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Health check: ping the database.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("database health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!("database health check failed: {}", e))
            })?;
        Ok(())
    }

    // ==================== Resequencing ====================

    /// Rewrite a collection's `sort_order` to dense 1..N, optionally moving
    /// `(id, rank)` to a requested position first.
    ///
    /// Runs in one transaction; the `FOR UPDATE` read serializes concurrent
    /// resequencing of the same collection on the row locks, and any failure
    /// rolls the whole reassignment back.
    pub async fn resequence(
        &self,
        collection: RankedCollection,
        target: Option<(i32, i32)>,
    ) -> Result<(), AppError> {
        let table = collection.table();
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("failed to begin transaction: {}", e))
        })?;

        let rows: Vec<(i32, i32)> = sqlx::query_as(&format!(
            "SELECT id, sort_order FROM {table} ORDER BY sort_order, id FOR UPDATE"
        ))
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;

        let slots: Vec<RankSlot> = rows
            .iter()
            .map(|&(id, sort_order)| RankSlot { id, sort_order })
            .collect();
        let current: HashMap<i32, i32> = rows.into_iter().collect();

        let assignments = match target {
            Some((target_id, target_rank)) => {
                ordering::plan_with_target(slots, target_id, target_rank)
                    .map_err(|e| AppError::NotFound(anyhow::anyhow!(e)))?
            }
            None => ordering::plan(slots),
        };

        for assignment in assignments {
            if current.get(&assignment.id) == Some(&assignment.rank) {
                continue;
            }
            sqlx::query(&format!("UPDATE {table} SET sort_order = $1 WHERE id = $2"))
                .bind(assignment.rank)
                .bind(assignment.id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("failed to commit resequencing: {}", e))
        })?;
        Ok(())
    }

    // ==================== Creation Operations ====================

    pub async fn list_creations(&self, limit: Option<i64>) -> Result<Vec<Creation>, AppError> {
        let query = "SELECT * FROM creations ORDER BY sort_order ASC, created_at DESC";
        let creations = match limit {
            Some(limit) => {
                sqlx::query_as::<_, Creation>(&format!("{query} LIMIT $1"))
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await
            }
            None => sqlx::query_as::<_, Creation>(query).fetch_all(&self.pool).await,
        };
        creations.map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn list_event_types(&self) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar("SELECT DISTINCT event_type FROM creations ORDER BY event_type ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn find_creation(&self, id: i32) -> Result<Option<Creation>, AppError> {
        sqlx::query_as::<_, Creation>("SELECT * FROM creations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Insert a creation with the sentinel rank; the caller resequences
    /// immediately afterwards to place it.
    pub async fn insert_creation(
        &self,
        title: &str,
        description: &str,
        event_type: &str,
        main_image: &str,
    ) -> Result<Creation, AppError> {
        sqlx::query_as::<_, Creation>(
            r#"
            INSERT INTO creations (title, description, event_type, main_image, sort_order)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(event_type)
        .bind(main_image)
        .bind(ordering::SENTINEL_RANK)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Patch domain fields, keeping current values where the caller sent
    /// nothing. `sort_order` is not touched here; rank changes go through
    /// `resequence`.
    pub async fn update_creation(
        &self,
        id: i32,
        title: Option<&str>,
        description: Option<&str>,
        event_type: Option<&str>,
        main_image: Option<&str>,
    ) -> Result<Option<Creation>, AppError> {
        sqlx::query_as::<_, Creation>(
            r#"
            UPDATE creations SET
                title = COALESCE($1, title),
                description = COALESCE($2, description),
                event_type = COALESCE($3, event_type),
                main_image = COALESCE($4, main_image)
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(event_type)
        .bind(main_image)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn delete_creation(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM creations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== Creation Image Operations ====================

    pub async fn images_for_creation(&self, creation_id: i32) -> Result<Vec<CreationImage>, AppError> {
        sqlx::query_as::<_, CreationImage>(
            "SELECT * FROM creation_images WHERE creation_id = $1 ORDER BY sort_order",
        )
        .bind(creation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    /// Batched image fetch for the list endpoint.
    pub async fn images_for_creations(
        &self,
        creation_ids: &[i32],
    ) -> Result<Vec<CreationImage>, AppError> {
        if creation_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, CreationImage>(
            "SELECT * FROM creation_images WHERE creation_id = ANY($1) ORDER BY sort_order",
        )
        .bind(creation_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn insert_creation_image(
        &self,
        creation_id: i32,
        image_url: &str,
        sort_order: i32,
    ) -> Result<CreationImage, AppError> {
        sqlx::query_as::<_, CreationImage>(
            r#"
            INSERT INTO creation_images (creation_id, image_url, sort_order)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(creation_id)
        .bind(image_url)
        .bind(sort_order)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn update_creation_image(
        &self,
        image_id: i32,
        sort_order: i32,
    ) -> Result<Option<CreationImage>, AppError> {
        sqlx::query_as::<_, CreationImage>(
            "UPDATE creation_images SET sort_order = $1 WHERE id = $2 RETURNING *",
        )
        .bind(sort_order)
        .bind(image_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn delete_creation_image(&self, image_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM creation_images WHERE id = $1")
            .bind(image_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== Service Operations ====================

    pub async fn list_services(&self) -> Result<Vec<Service>, AppError> {
        sqlx::query_as::<_, Service>("SELECT * FROM services ORDER BY sort_order ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn find_service(&self, id: i32) -> Result<Option<Service>, AppError> {
        sqlx::query_as::<_, Service>("SELECT * FROM services WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn insert_service(
        &self,
        title: &str,
        description: &str,
    ) -> Result<Service, AppError> {
        sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (title, description, sort_order)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(ordering::SENTINEL_RANK)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn update_service(
        &self,
        id: i32,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Option<Service>, AppError> {
        sqlx::query_as::<_, Service>(
            r#"
            UPDATE services SET
                title = COALESCE($1, title),
                description = COALESCE($2, description)
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(title)
        .bind(description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn delete_service(&self, id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(result.rows_affected() > 0)
    }

    // ==================== Settings Operations ====================

    pub async fn list_settings(&self) -> Result<Vec<SiteSetting>, AppError> {
        sqlx::query_as::<_, SiteSetting>("SELECT * FROM site_settings ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn get_setting(&self, key: &str) -> Result<Option<String>, AppError> {
        sqlx::query_scalar("SELECT value FROM site_settings WHERE key = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO site_settings (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    // ==================== Social Link Operations ====================

    pub async fn list_social_links(&self) -> Result<Vec<SocialLink>, AppError> {
        sqlx::query_as::<_, SocialLink>("SELECT * FROM social_links ORDER BY sort_order ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn update_social_link(
        &self,
        id: i32,
        url: &str,
    ) -> Result<Option<SocialLink>, AppError> {
        sqlx::query_as::<_, SocialLink>(
            "UPDATE social_links SET url = $1 WHERE id = $2 RETURNING *",
        )
        .bind(url)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    // ==================== Contact Request Operations ====================

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_contact_request(
        &self,
        first_name: &str,
        last_name: Option<&str>,
        email: &str,
        phone: Option<&str>,
        event_type: Option<&str>,
        event_date: Option<NaiveDate>,
        guests: Option<i32>,
        message: Option<&str>,
    ) -> Result<ContactRequest, AppError> {
        sqlx::query_as::<_, ContactRequest>(
            r#"
            INSERT INTO contact_requests
                (first_name, last_name, email, phone, event_type, event_date, guests, message)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .bind(phone)
        .bind(event_type)
        .bind(event_date)
        .bind(guests)
        .bind(message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

    pub async fn list_contact_requests(&self) -> Result<Vec<ContactRequest>, AppError> {
        sqlx::query_as::<_, ContactRequest>(
            "SELECT * FROM contact_requests ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))
    }

}

#[async_trait]
impl AuthCodeStore for Database {
    async fn owner_email(&self) -> Result<Option<String>, AppError> {
        self.get_setting(crate::models::setting::OWNER_EMAIL_KEY).await
    }

    async fn invalidate_unused(&self) -> Result<(), AppError> {
        sqlx::query("UPDATE auth_codes SET used = TRUE WHERE used = FALSE")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    async fn store_code(&self, code: &str, expires_at: DateTime<Utc>) -> Result<(), AppError> {
        sqlx::query("INSERT INTO auth_codes (code, expires_at) VALUES ($1, $2)")
            .bind(code)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(())
    }

    /// Marking used and selecting happen in one statement, so a code can be
    /// redeemed at most once even under concurrent verify requests.
    async fn redeem(&self, code: &str) -> Result<bool, AppError> {
        let redeemed: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE auth_codes SET used = TRUE
            WHERE id = (
                SELECT id FROM auth_codes
                WHERE code = $1 AND used = FALSE AND expires_at > NOW()
                ORDER BY created_at DESC
                LIMIT 1
            )
            RETURNING id
            "#,
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!(e)))?;
        Ok(redeemed.is_some())
    }
}
