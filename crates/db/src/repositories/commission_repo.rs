//! Repository for the `commissions` table.

use arttrack_core::status::CommissionStatus;
use arttrack_core::types::CalendarDate;
use sqlx::PgPool;

use crate::models::commission::{CommissionRow, CreateCommission};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, artist_id, user_id, client_name, contact, title, description, \
                        commission_type, price, status, date_added, last_updated, \
                        thumbnail_url, notes, created_at";

/// Listings are newest `date_added` first; ties go to the later insert.
const ORDER: &str = "ORDER BY date_added DESC, created_at DESC";

pub struct CommissionRepo;

impl CommissionRepo {
    /// Insert a commission under a fresh UUIDv7 id.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCommission,
    ) -> Result<CommissionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO commissions
                (id, artist_id, user_id, client_name, contact, title, description,
                 commission_type, price, status, date_added, last_updated, thumbnail_url, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CommissionRow>(&query)
            .bind(uuid::Uuid::now_v7().to_string())
            .bind(&input.artist_id)
            .bind(input.user_id)
            .bind(&input.client_name)
            .bind(&input.contact)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.commission_type)
            .bind(input.price)
            .bind(input.status.as_str())
            .bind(input.date_added)
            .bind(input.last_updated)
            .bind(&input.thumbnail_url)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<CommissionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM commissions WHERE id = $1");
        sqlx::query_as::<_, CommissionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM commissions")
            .fetch_one(pool)
            .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<CommissionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM commissions {ORDER}");
        sqlx::query_as::<_, CommissionRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Commissions owned by the artist with display name `artist_id`.
    pub async fn list_by_artist(
        pool: &PgPool,
        artist_id: &str,
    ) -> Result<Vec<CommissionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM commissions WHERE artist_id = $1 {ORDER}");
        sqlx::query_as::<_, CommissionRow>(&query)
            .bind(artist_id)
            .fetch_all(pool)
            .await
    }

    /// Set the status and stamp `last_updated`, never earlier than
    /// `date_added`. Returns `true` if the row exists.
    pub async fn update_status(
        pool: &PgPool,
        id: &str,
        status: CommissionStatus,
        today: CalendarDate,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE commissions
             SET status = $2, last_updated = GREATEST($3, date_added)
             WHERE id = $1",
        )
        .bind(id)
        .bind(status.as_str())
        .bind(today)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Hard-delete a commission. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM commissions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
