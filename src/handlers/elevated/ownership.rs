// handlers/elevated/ownership.rs - DELETE /api/admin/ownership/:profile_id/:business_id

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentActor};
use crate::types::Role;

/// Revoke a verified ownership link. Takes effect on the owner's next request.
pub async fn ownership_revoke(
    State(state): State<AppState>,
    current: CurrentActor,
    Path((profile_id, business_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let admin = current.require_role(Role::Admin)?;

    if !state.store.revoke_link(profile_id, business_id).await? {
        return Err(ApiError::not_found("Ownership link not found"));
    }

    tracing::info!(
        "Ownership of business {} by profile {} revoked by {}",
        business_id, profile_id, admin.profile_id
    );
    Ok(ApiResponse::no_content())
}
