// handlers/elevated/claims.rs - Claim review queue

use axum::extract::{Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::{Claim, ClaimStatus};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentActor};
use crate::services::claims::{review_claim, ClaimAction};
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct ClaimListQuery {
    pub status: Option<String>,
}

/// GET /api/admin/claims?status=pending|approved|rejected
pub async fn claims_list(
    State(state): State<AppState>,
    current: CurrentActor,
    Query(query): Query<ClaimListQuery>,
) -> ApiResult<Vec<Claim>> {
    current.require_role(Role::Admin)?;

    let status = query
        .status
        .as_deref()
        .map(str::parse::<ClaimStatus>)
        .transpose()
        .map_err(|e| ApiError::invalid_field("status", e))?;

    let claims = state.store.list_claims(status).await?;
    Ok(ApiResponse::success(claims))
}

/// POST /api/admin/claims/:id/approve
pub async fn claim_approve(
    State(state): State<AppState>,
    current: CurrentActor,
    Path(claim_id): Path<Uuid>,
) -> ApiResult<Claim> {
    review(state, current, claim_id, ClaimAction::Approve).await
}

/// POST /api/admin/claims/:id/reject
pub async fn claim_reject(
    State(state): State<AppState>,
    current: CurrentActor,
    Path(claim_id): Path<Uuid>,
) -> ApiResult<Claim> {
    review(state, current, claim_id, ClaimAction::Reject).await
}

async fn review(state: AppState, current: CurrentActor, claim_id: Uuid, action: ClaimAction) -> ApiResult<Claim> {
    let reviewer = current.require_role(Role::Admin)?;
    let claim = review_claim(state.store.as_ref(), reviewer, claim_id, action).await?;
    Ok(ApiResponse::success(claim))
}
