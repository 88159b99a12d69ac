//! Handlers for the `/commissions` resource.
//!
//! Listing is public unless `PUBLIC_READ` is off. Every mutation requires a
//! signed-in artist, and status changes and deletes are limited to the
//! record's owner.

use arttrack_core::commission::{validate_new_commission, Commission, NewCommission};
use arttrack_core::error::CoreError;
use arttrack_core::status::CommissionStatus;
use arttrack_core::types::today;
use arttrack_db::models::commission::{CommissionRow, CreateCommission};
use arttrack_db::repositories::CommissionRepo;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, MaybeAuthUser};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /commissions`.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Restrict to one artist's display name.
    pub artist_id: Option<String>,
}

/// Request body for `PATCH /commissions/{id}/status`.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: CommissionStatus,
}

/// GET /api/v1/commissions
pub async fn list(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<DataResponse<Vec<Commission>>>> {
    if viewer.is_none() && !state.config.public_read {
        return Err(AppError::Core(CoreError::Forbidden(
            "Sign in to view commissions".into(),
        )));
    }

    let rows = match params.artist_id.as_deref().map(str::trim) {
        Some(artist) if !artist.is_empty() => {
            CommissionRepo::list_by_artist(&state.pool, artist).await?
        }
        _ => CommissionRepo::list_all(&state.pool).await?,
    };

    let data = rows
        .into_iter()
        .map(CommissionRow::into_commission)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/commissions
///
/// The owner is always the authenticated artist, every record starts queued
/// and both dates are the server's today, whatever the body says.
pub async fn create(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Json(mut input): Json<NewCommission>,
) -> AppResult<(StatusCode, Json<DataResponse<Commission>>)> {
    input.artist_id = auth_user.display_name.clone();
    input.status = CommissionStatus::INITIAL;
    input.date_added = today();
    input.last_updated = input.date_added;
    validate_new_commission(&input)?;

    let row = CommissionRepo::create(
        &state.pool,
        &CreateCommission::owned_by(input, auth_user.user_id, auth_user.display_name),
    )
    .await?;

    tracing::info!(commission_id = %row.id, user_id = auth_user.user_id, "Commission created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: row.into_commission()?,
        }),
    ))
}

/// PATCH /api/v1/commissions/{id}/status
pub async fn set_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    Json(input): Json<StatusUpdate>,
) -> AppResult<StatusCode> {
    ensure_owner(&state, &auth_user, &id).await?;
    CommissionRepo::update_status(&state.pool, &id, input.status, today()).await?;
    tracing::info!(commission_id = %id, status = %input.status, "Commission status changed");
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/commissions/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    ensure_owner(&state, &auth_user, &id).await?;
    CommissionRepo::delete(&state.pool, &id).await?;
    tracing::info!(commission_id = %id, "Commission deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// 404 if the record is missing, 403 if it belongs to someone else.
///
/// Records created before accounts existed carry no `user_id`; those match
/// on the display name instead.
async fn ensure_owner(state: &AppState, auth_user: &AuthUser, id: &str) -> AppResult<()> {
    let row = CommissionRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Commission",
            id: id.to_string(),
        })?;

    let owned = match row.user_id {
        Some(owner) => owner == auth_user.user_id,
        None => row.artist_id == auth_user.display_name,
    };
    if !owned {
        tracing::warn!(commission_id = %id, user_id = auth_user.user_id, "Rejected foreign mutation");
        return Err(AppError::Core(CoreError::Forbidden(
            "This commission belongs to another artist".into(),
        )));
    }
    Ok(())
}
