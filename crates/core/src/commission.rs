//! Commission record model, creation defaults and validation.

use serde::{Deserialize, Serialize};

use crate::commission_types::CommissionTypeRegistry;
use crate::error::CoreError;
use crate::identity::Identity;
use crate::status::CommissionStatus;
use crate::types::CalendarDate;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Placeholder client name used when the creation form leaves it blank.
pub const DEFAULT_CLIENT_NAME: &str = "匿名委託人";

/// Placeholder title used when the creation form leaves it blank.
pub const DEFAULT_TITLE: &str = "未命名委託";

/// Owner assigned to stored records that predate artist ownership.
pub const UNKNOWN_ARTIST: &str = "Unknown";

/// Maximum length of short text fields (names, titles, contact, type).
pub const MAX_SHORT_TEXT_LENGTH: usize = 200;

/// Maximum length of the description and notes fields.
pub const MAX_LONG_TEXT_LENGTH: usize = 5_000;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A client commission as held in memory and exchanged with collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commission {
    pub id: String,
    /// Display name of the owning artist.
    pub artist_id: String,
    /// Stable account key of the owning artist, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub commission_type: String,
    #[serde(default)]
    pub price: f64,
    pub status: CommissionStatus,
    pub date_added: CalendarDate,
    pub last_updated: CalendarDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Commission {
    /// Whether the artist with display name `artist` owns this record.
    pub fn is_owned_by(&self, artist: &str) -> bool {
        self.artist_id == artist
    }

    /// Move to `status`, refreshing `last_updated`.
    ///
    /// `last_updated` never drops below `date_added`, even if the caller's
    /// clock is behind the record's creation date.
    pub fn apply_status(&mut self, status: CommissionStatus, today: CalendarDate) {
        self.status = status;
        self.last_updated = today.max(self.date_added);
    }
}

/// A commission that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommission {
    pub artist_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub client_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub commission_type: String,
    #[serde(default)]
    pub price: f64,
    pub status: CommissionStatus,
    pub date_added: CalendarDate,
    pub last_updated: CalendarDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl NewCommission {
    /// Attach the id assigned by a persistence collaborator.
    pub fn with_id(self, id: String) -> Commission {
        Commission {
            id,
            artist_id: self.artist_id,
            user_id: self.user_id,
            client_name: self.client_name,
            contact: self.contact,
            title: self.title,
            description: self.description,
            commission_type: self.commission_type,
            price: self.price,
            status: self.status,
            date_added: self.date_added,
            last_updated: self.last_updated,
            thumbnail_url: self.thumbnail_url,
            notes: self.notes,
        }
    }
}

// ---------------------------------------------------------------------------
// Creation form
// ---------------------------------------------------------------------------

/// Raw values from the creation form, exactly as typed.
///
/// Ownership, dates and status are never taken from here; see
/// [`CommissionDraft::into_new_commission`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommissionDraft {
    pub client_name: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub commission_type: String,
    /// Price as typed; blank or unparsable input becomes 0.
    pub price: String,
    pub contact: String,
    pub notes: String,
    pub thumbnail_url: String,
}

impl CommissionDraft {
    /// A blank form with the registry's default type preselected.
    pub fn new(types: &CommissionTypeRegistry) -> Self {
        Self {
            commission_type: types.default_label().to_string(),
            ..Self::default()
        }
    }

    /// Apply placeholder defaults and stamp ownership and dates.
    ///
    /// The new record always starts at [`CommissionStatus::INITIAL`] with
    /// `date_added == last_updated == today`.
    pub fn into_new_commission(
        self,
        owner: &Identity,
        types: &CommissionTypeRegistry,
        today: CalendarDate,
    ) -> Result<NewCommission, CoreError> {
        let commission_type = self.commission_type.trim().to_string();
        if !types.contains(&commission_type) {
            return Err(CoreError::Validation(format!(
                "Unknown commission type '{commission_type}'"
            )));
        }

        let new = NewCommission {
            artist_id: owner.display_name.clone(),
            user_id: Some(owner.user_id.clone()),
            client_name: text_or(&self.client_name, DEFAULT_CLIENT_NAME),
            contact: optional_text(&self.contact),
            title: text_or(&self.title, DEFAULT_TITLE),
            description: self.description.trim().to_string(),
            commission_type,
            price: parse_price(&self.price)?,
            status: CommissionStatus::INITIAL,
            date_added: today,
            last_updated: today,
            thumbnail_url: optional_text(&self.thumbnail_url),
            notes: optional_text(&self.notes),
        };
        validate_new_commission(&new)?;
        Ok(new)
    }
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

/// Parse a typed price. Blank, unparsable and non-finite input is 0.
pub fn parse_price(raw: &str) -> Result<f64, CoreError> {
    let price = match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    };
    validate_price(price)?;
    Ok(price)
}

/// Prices are finite and non-negative.
pub fn validate_price(price: f64) -> Result<(), CoreError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CoreError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

/// Validate a record about to be persisted.
pub fn validate_new_commission(new: &NewCommission) -> Result<(), CoreError> {
    if new.artist_id.trim().is_empty() {
        return Err(CoreError::Validation("Artist name cannot be empty".to_string()));
    }
    validate_short_text("client name", &new.client_name)?;
    validate_short_text("title", &new.title)?;
    validate_short_text("type", &new.commission_type)?;
    if let Some(contact) = &new.contact {
        validate_short_text("contact", contact)?;
    }
    if new.description.chars().count() > MAX_LONG_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description exceeds maximum length of {MAX_LONG_TEXT_LENGTH} characters"
        )));
    }
    if let Some(notes) = &new.notes {
        if notes.chars().count() > MAX_LONG_TEXT_LENGTH {
            return Err(CoreError::Validation(format!(
                "Notes exceed maximum length of {MAX_LONG_TEXT_LENGTH} characters"
            )));
        }
    }
    validate_price(new.price)?;
    if new.last_updated < new.date_added {
        return Err(CoreError::Validation(
            "lastUpdated cannot be earlier than dateAdded".to_string(),
        ));
    }
    Ok(())
}

fn validate_short_text(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("The {field} cannot be empty")));
    }
    if value.chars().count() > MAX_SHORT_TEXT_LENGTH {
        return Err(CoreError::Validation(format!(
            "The {field} exceeds maximum length of {MAX_SHORT_TEXT_LENGTH} characters"
        )));
    }
    Ok(())
}

fn text_or(value: &str, placeholder: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        placeholder.to_string()
    } else {
        trimmed.to_string()
    }
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
