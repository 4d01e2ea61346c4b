// handlers/protected/onboarding.rs - GET /api/onboarding, POST /api/onboarding/:step

use axum::extract::{Path, State};
use serde::Serialize;

use crate::access::AuthenticatedActor;
use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentActor};
use crate::services::onboarding::advance;
use crate::types::{OnboardingProgress, OnboardingStep, Role};

#[derive(Debug, Serialize)]
pub struct OnboardingState {
    pub progress: OnboardingProgress,
    pub next_step: Option<OnboardingStep>,
    pub complete: bool,
    /// Page the account should be on now
    pub landing: &'static str,
}

impl From<&AuthenticatedActor> for OnboardingState {
    fn from(actor: &AuthenticatedActor) -> Self {
        Self {
            progress: actor.onboarding,
            next_step: actor.onboarding.next_step(),
            complete: actor.onboarding.is_complete(),
            landing: actor.landing(),
        }
    }
}

pub async fn onboarding_get(CurrentActor(actor): CurrentActor) -> ApiResult<OnboardingState> {
    Ok(ApiResponse::success(OnboardingState::from(&actor)))
}

/// Mark `step` complete. Steps complete strictly in order; finishing
/// `complete` finishes onboarding.
pub async fn step_post(
    State(state): State<AppState>,
    current: CurrentActor,
    Path(step): Path<String>,
) -> ApiResult<OnboardingState> {
    let actor = current.require_role(Role::User)?;
    let step = OnboardingStep::from_slug(&step)
        .ok_or_else(|| ApiError::not_found(format!("Unknown onboarding step '{}'", step)))?;

    let changed = advance(&actor.onboarding, step).map_err(|e| ApiError::conflict(e.to_string()))?;
    if !changed {
        return Ok(ApiResponse::success(OnboardingState::from(actor)));
    }

    let profile = state.store.complete_onboarding_step(actor.profile_id, step).await?;
    let updated = AuthenticatedActor::from(&profile);
    tracing::info!("Profile {} completed onboarding step {}", profile.id, step);
    Ok(ApiResponse::success(OnboardingState::from(&updated)))
}
