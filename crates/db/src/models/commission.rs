//! Commission row model and insert DTO.

use arttrack_core::commission::{Commission, NewCommission};
use arttrack_core::error::CoreError;
use arttrack_core::status::CommissionStatus;
use arttrack_core::types::{CalendarDate, DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `commissions` table.
///
/// `status` holds the stored value (`"queue"`, `"line_art"`, ...); convert
/// with [`CommissionRow::into_commission`].
#[derive(Debug, Clone, FromRow)]
pub struct CommissionRow {
    pub id: String,
    pub artist_id: String,
    pub user_id: Option<DbId>,
    pub client_name: String,
    pub contact: Option<String>,
    pub title: String,
    pub description: String,
    pub commission_type: String,
    pub price: f64,
    pub status: String,
    pub date_added: CalendarDate,
    pub last_updated: CalendarDate,
    pub thumbnail_url: Option<String>,
    pub notes: Option<String>,
    pub created_at: Timestamp,
}

impl CommissionRow {
    pub fn into_commission(self) -> Result<Commission, CoreError> {
        let status = CommissionStatus::from_str_value(&self.status).map_err(CoreError::Internal)?;
        Ok(Commission {
            id: self.id,
            artist_id: self.artist_id,
            user_id: self.user_id.map(|id| id.to_string()),
            client_name: self.client_name,
            contact: self.contact,
            title: self.title,
            description: self.description,
            commission_type: self.commission_type,
            price: self.price,
            status,
            date_added: self.date_added,
            last_updated: self.last_updated,
            thumbnail_url: self.thumbnail_url,
            notes: self.notes,
        })
    }
}

/// DTO for inserting a commission. Ownership comes from the authenticated
/// account, never from the request body.
#[derive(Debug, Clone)]
pub struct CreateCommission {
    pub artist_id: String,
    pub user_id: DbId,
    pub client_name: String,
    pub contact: Option<String>,
    pub title: String,
    pub description: String,
    pub commission_type: String,
    pub price: f64,
    pub status: CommissionStatus,
    pub date_added: CalendarDate,
    pub last_updated: CalendarDate,
    pub thumbnail_url: Option<String>,
    pub notes: Option<String>,
}

impl CreateCommission {
    /// Take the descriptive fields from `data` and stamp the owner.
    pub fn owned_by(data: NewCommission, user_id: DbId, artist_id: String) -> Self {
        Self {
            artist_id,
            user_id,
            client_name: data.client_name,
            contact: data.contact,
            title: data.title,
            description: data.description,
            commission_type: data.commission_type,
            price: data.price,
            status: data.status,
            date_added: data.date_added,
            last_updated: data.last_updated,
            thumbnail_url: data.thumbnail_url,
            notes: data.notes,
        }
    }
}
