// handlers/protected/claims.rs - POST/GET /api/claims handlers

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::Claim;
use crate::middleware::{ApiResponse, ApiResult, CurrentActor};
use crate::services::claims::submit_claim;
use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct ClaimRequest {
    pub business_id: Uuid,
    pub note: Option<String>,
}

/// POST /api/claims - Ask to be verified as owner of a listing
pub async fn claims_post(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(request): Json<ClaimRequest>,
) -> ApiResult<Claim> {
    let note = request.note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    let claim = submit_claim(state.store.as_ref(), &actor, request.business_id, note).await?;
    Ok(ApiResponse::created(claim))
}

/// GET /api/claims - The caller's own claims
pub async fn claims_get(State(state): State<AppState>, current: CurrentActor) -> ApiResult<Vec<Claim>> {
    let actor = current.require_role(Role::BusinessOwner)?;
    let claims = state.store.claims_for_profile(actor.profile_id).await?;
    Ok(ApiResponse::success(claims))
}
