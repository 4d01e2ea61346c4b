// handlers/protected/owner.rs - Owner dashboard and listing management
//
// Mutations check the ownership registry here, and the Postgres store checks
// it again at row level inside the same transaction as the write.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::Value;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Business, BusinessUpdate};
use crate::error::ApiError;
use crate::handlers::protected::me::is_http_url;
use crate::middleware::{ApiResponse, ApiResult, CurrentActor};
use crate::services::ownership::{owner_dashboard, require_owner, OwnerDashboard};
use crate::types::Role;

const NAME_MAX: usize = 120;

/// GET /api/owner/businesses
pub async fn dashboard_get(State(state): State<AppState>, current: CurrentActor) -> ApiResult<OwnerDashboard> {
    let actor = current.require_role(Role::BusinessOwner)?;
    let dashboard = owner_dashboard(state.store.as_ref(), actor.profile_id).await?;
    Ok(ApiResponse::success(dashboard))
}

/// PATCH /api/owner/businesses/:id
pub async fn business_patch(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(business_id): Path<Uuid>,
    Json(body): Json<Value>,
) -> ApiResult<Business> {
    let update: BusinessUpdate =
        serde_json::from_value(body).map_err(|e| ApiError::bad_request(format!("Invalid business update: {}", e)))?;
    validate_business_update(&update)?;

    require_owner(state.store.as_ref(), actor.profile_id, business_id).await?;
    let business = state.store.update_business_as(actor.profile_id, business_id, update).await?;
    tracing::info!("Business {} updated by owner {}", business_id, actor.profile_id);
    Ok(ApiResponse::success(business))
}

/// DELETE /api/owner/businesses/:id
pub async fn business_delete(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(business_id): Path<Uuid>,
) -> ApiResult<()> {
    require_owner(state.store.as_ref(), actor.profile_id, business_id).await?;
    state.store.delete_business_as(actor.profile_id, business_id).await?;
    tracing::info!("Business {} deleted by owner {}", business_id, actor.profile_id);
    Ok(ApiResponse::no_content())
}

fn validate_business_update(update: &BusinessUpdate) -> Result<(), ApiError> {
    if update.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }
    if let Some(name) = &update.name {
        let length = name.trim().chars().count();
        if length == 0 || length > NAME_MAX {
            return Err(ApiError::invalid_field("name", format!("must be 1 to {} characters", NAME_MAX)));
        }
    }
    if let Some(website) = &update.website {
        if !is_http_url(website) {
            return Err(ApiError::invalid_field("website", "must be an http(s) URL"));
        }
    }
    Ok(())
}
