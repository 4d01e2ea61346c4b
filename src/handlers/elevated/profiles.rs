// handlers/elevated/profiles.rs - PUT /api/admin/profiles/:id/role
//
// The only way to change a role after signup.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Profile;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentActor};
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct RoleChange {
    pub role: Role,
}

pub async fn role_put(
    State(state): State<AppState>,
    current: CurrentActor,
    Path(profile_id): Path<Uuid>,
    Json(change): Json<RoleChange>,
) -> ApiResult<Profile> {
    let admin = current.require_role(Role::Admin)?;

    // Keeps at least the acting administrator in place
    if admin.profile_id == profile_id {
        return Err(ApiError::conflict("Administrators cannot change their own role"));
    }

    let profile = state.store.set_role(profile_id, change.role).await?;
    tracing::info!("Profile {} role set to {} by {}", profile.id, profile.role, admin.profile_id);
    Ok(ApiResponse::success(profile))
}
